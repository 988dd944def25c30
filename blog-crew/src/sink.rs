//! Live log panel: a write sink that keeps the run's log and re-renders
//! its tail into a display region after every chunk.
//!
//! The sink owns the whole log for one run. Only the last `window`
//! characters are ever pushed to the region; older text drops off the
//! front of the panel but stays in the buffer.

use std::io;
use std::sync::Arc;

use tokio::sync::watch;

use crate::sanitize::sanitize;

/// Characters of log tail shown in the panel by default.
pub const DEFAULT_WINDOW: usize = 8000;

/// A display area whose content is replaced wholesale on every render.
pub trait DisplayRegion: Send + Sync {
    /// Replace the region's content with `html`.
    fn render(&self, html: &str);

    /// Show an empty log panel.
    fn clear(&self) {
        self.render(&render_panel(""));
    }
}

/// Display region backed by a watch channel. Every subscriber sees the
/// latest panel; intermediate renders may be skipped by slow readers.
#[derive(Debug)]
pub struct LiveRegion {
    tx: watch::Sender<String>,
}

impl LiveRegion {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(render_panel(""));
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }

    /// Panel HTML as last rendered.
    pub fn current(&self) -> String {
        self.tx.borrow().clone()
    }
}

impl Default for LiveRegion {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayRegion for LiveRegion {
    fn render(&self, html: &str) {
        self.tx.send_replace(html.to_string());
    }
}

/// Sink for one run's progress output.
pub struct StreamingLogSink {
    region: Arc<dyn DisplayRegion>,
    buffer: String,
    window: usize,
}

impl StreamingLogSink {
    pub fn new(region: Arc<dyn DisplayRegion>, window: usize) -> Self {
        Self {
            region,
            buffer: String::new(),
            window,
        }
    }

    /// Accept one raw chunk of output.
    ///
    /// The chunk is sanitized; if anything is left it is appended as a line
    /// and the panel is re-rendered before this returns. The whole chunk
    /// always counts as accepted, so the return value is its length in
    /// characters.
    pub fn write_chunk(&mut self, chunk: &str) -> usize {
        let clean = sanitize(chunk);
        if !clean.is_empty() {
            self.buffer.push_str(&clean);
            self.buffer.push('\n');
            self.region.render(&render_panel(self.visible()));
        }
        chunk.chars().count()
    }

    /// Everything written so far.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    /// The tail of the buffer currently shown in the panel.
    pub fn visible(&self) -> &str {
        tail_chars(&self.buffer, self.window)
    }

    pub fn into_buffer(self) -> String {
        self.buffer
    }
}

impl std::fmt::Debug for StreamingLogSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingLogSink")
            .field("buffer_len", &self.buffer.len())
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

impl io::Write for StreamingLogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_chunk(&String::from_utf8_lossy(buf));
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Wrap log text in the scrollable, monospace panel markup.
pub fn render_panel(text: &str) -> String {
    format!("<div class='scrollable-log'>{}</div>", html_escape(text))
}

/// The last `n` characters of `s`.
fn tail_chars(s: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    match s.char_indices().rev().nth(n - 1) {
        Some((start, _)) => &s[start..],
        None => s,
    }
}

pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
