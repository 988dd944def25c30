//! The two views of a finished post: rendered preview and raw markdown.

use pulldown_cmark::{Event, Options, Parser, html};

use crate::sink::html_escape;

/// Render markdown to HTML. Raw HTML in the source is shown as text, never
/// passed through to the page.
pub fn render_preview(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let events = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

/// Markdown source as an escaped code block.
pub fn raw_view(markdown: &str) -> String {
    format!(
        "<pre><code class=\"language-markdown\">{}</code></pre>",
        html_escape(markdown)
    )
}
