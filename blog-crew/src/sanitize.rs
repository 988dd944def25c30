//! Log text cleanup for display in the browser.
//!
//! Agent progress output is written for a terminal: it carries ANSI colour
//! and cursor codes and tends to pad sections with long runs of blank lines.
//! [`sanitize`] turns one raw chunk into display-safe text.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// An OSC string (`ESC ]` up to `BEL` or `ESC \`, within one line), or
/// `ESC`, a 7-bit C1 introducer, parameter bytes, intermediate bytes, final
/// byte. An OSC with no terminator falls through to the second form, which
/// only takes its first few bytes.
static ESCAPE_SEQUENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1B\][^\x07\x1B\r\n]*(?:\x07|\x1B\\)|\x1B[@-_][0-?]*[ -/]*[@-~]")
        .expect("escape sequence pattern is valid")
});

/// Three or more consecutive line breaks.
static BLANK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\r?\n){3,}").expect("blank run pattern is valid"));

/// Strip terminal escape sequences, collapse blank-line runs to one empty
/// line and trim surrounding whitespace.
///
/// Returns an empty string when nothing displayable is left. Truncated or
/// malformed escapes (a trailing `ESC`, `ESC[31` without a final byte) are
/// left as they are; this never fails.
pub fn sanitize(chunk: &str) -> String {
    let mut text = Cow::Borrowed(chunk);

    // Removing one sequence can splice an ESC onto the bytes of the next
    // one, so strip until nothing matches.
    while ESCAPE_SEQUENCE.is_match(&text) {
        text = Cow::Owned(ESCAPE_SEQUENCE.replace_all(&text, "").into_owned());
    }

    BLANK_RUN.replace_all(&text, "\n\n").trim().to_string()
}
