//! Text and URL helpers shared by the parser functions and the head emitter
//! which do not correspond to anything in the standard library.

use crate::config::{Config, DEFAULT_SERVER};
use regex::Regex;
use std::{borrow::Cow, sync::LazyLock};

/// The protocol used to expand protocol-relative URLs when the server URL
/// does not have one.
const FALLBACK_PROTOCOL: &str = "http:";

/// Converts a protocol-relative or server-relative URL into an absolute URL
/// using the configured server, or the default server if none is configured.
/// Other URLs are returned as-is.
pub fn expand_url<'a>(config: &Config, url: &'a str) -> Cow<'a, str> {
    let server = match config.server.trim_end_matches('/') {
        "" => DEFAULT_SERVER,
        server => server,
    };
    let protocol = server
        .find("//")
        .map(|index| &server[..index])
        .filter(|protocol| !protocol.is_empty())
        .unwrap_or(FALLBACK_PROTOCOL);

    if url.starts_with("//") {
        Cow::Owned(format!("{protocol}{url}"))
    } else if url.starts_with('/') {
        if server.starts_with("//") {
            Cow::Owned(format!("{protocol}{server}{url}"))
        } else {
            Cow::Owned(format!("{server}{url}"))
        }
    } else {
        Cow::Borrowed(url)
    }
}

/// Formats a message, using `cb` to replace any `$N` placeholders in the
/// message. If `cb` returns `None`, no replacement occurs.
pub fn format_raw_message<'a, F>(message: &str, mut cb: F) -> Cow<'_, str>
where
    F: FnMut(&str) -> Option<Cow<'a, str>>,
{
    static RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$(\d+)").unwrap());

    let mut out = String::new();
    let mut flushed = 0;
    for capture in RE.captures_iter(message) {
        let (_, [key]) = capture.extract();
        if let Some(value) = cb(key) {
            let range = capture.get_match().range();
            out += &message[flushed..range.start];
            out += &value;
            flushed = range.end;
        }
    }

    if flushed == 0 {
        Cow::Borrowed(message)
    } else {
        out += &message[flushed..];
        Cow::Owned(out)
    }
}

/// Removes HTML tags and comments from the text, like PHP `strip_tags`.
///
/// A `<` followed by whitespace, or at the end of the text, is kept as text.
/// A `>` inside a quoted attribute value does not end a tag. An unterminated
/// tag or comment removes everything after it.
pub fn strip_tags(text: &str) -> Cow<'_, str> {
    let bytes = text.as_bytes();
    let mut out = String::new();
    let mut flushed = 0;
    let mut cursor = 0;

    while let Some(offset) = memchr::memchr(b'<', &bytes[cursor..]) {
        let start = cursor + offset;
        match bytes.get(start + 1) {
            None => break,
            Some(c) if c.is_ascii_whitespace() => {
                cursor = start + 1;
                continue;
            }
            Some(_) => {}
        }

        out += &text[flushed..start];
        let end = if text[start..].starts_with("<!--") {
            memchr::memmem::find(&bytes[start + 4..], b"-->").map(|len| start + 4 + len + 3)
        } else {
            tag_end(&bytes[start + 1..]).map(|len| start + 1 + len + 1)
        };

        match end {
            Some(end) => {
                flushed = end;
                cursor = end;
            }
            None => {
                return Cow::Owned(out);
            }
        }
    }

    if flushed == 0 {
        Cow::Borrowed(text)
    } else {
        out += &text[flushed..];
        Cow::Owned(out)
    }
}

/// Returns the offset of the `>` which closes the tag whose body is `bytes`,
/// skipping over quoted attribute values.
fn tag_end(bytes: &[u8]) -> Option<usize> {
    let mut quote = None;
    for (index, &c) in bytes.iter().enumerate() {
        match (quote, c) {
            (None, b'"' | b'\'') => quote = Some(c),
            (Some(q), c) if q == c => quote = None,
            (None, b'>') => return Some(index),
            _ => {}
        }
    }
    None
}

/// Returns true if `value` would be truthy as a PHP string, which means it is
/// neither empty nor `"0"`.
#[inline]
pub fn is_truthy(value: &str) -> bool {
    !matches!(value, "" | "0")
}

/// Percent-encodes a URL part.
#[inline]
pub fn url_encode(input: &str) -> percent_encoding::PercentEncode<'_> {
    percent_encoding::utf8_percent_encode(input, &ALPHABET)
}

/// The alphabet of characters to percent-encode when encoding URLs.
const ALPHABET: percent_encoding::AsciiSet = percent_encoding::CONTROLS
    .add(b'%')
    .add(b'#')
    .add(b'\'')
    .add(b'"')
    .add(b'&')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b']')
    .add(b' ');
