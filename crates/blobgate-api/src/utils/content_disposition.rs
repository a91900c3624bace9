//! `Content-Disposition` values for named downloads.
//!
//! Printable ASCII names (tabs included) go out verbatim in a quoted
//! `filename` parameter. Anything else is carried in `filename*` as RFC 2047
//! encoded words (`=?UTF-8?Q?...?=` or `=?UTF-8?B?...?=`, whichever is
//! shorter), so the header value never carries bytes a header cannot hold.

use base64::Engine;

/// Longest encoded word allowed by RFC 2047.
const MAX_ENCODED_WORD_LEN: usize = 75;
const Q_PREFIX: &str = "=?UTF-8?Q?";
const B_PREFIX: &str = "=?UTF-8?B?";
const SUFFIX: &str = "?=";
const MAX_PAYLOAD_LEN: usize = MAX_ENCODED_WORD_LEN - Q_PREFIX.len() - SUFFIX.len();
/// Raw bytes per B word: 45 bytes encode to 60 base64 characters.
const MAX_B_BYTES: usize = MAX_PAYLOAD_LEN / 4 * 3;

/// Build the header value for an attachment called `name`.
pub fn attachment_disposition(name: &str) -> String {
    if is_verbatim_ascii(name) {
        format!("attachment; filename=\"{}\"", quote_escape(name))
    } else {
        format!("attachment; filename*=\"{}\"", encode_words(name))
    }
}

/// Bytes a header value can carry as-is: HTAB and printable ASCII.
fn is_verbatim_ascii(name: &str) -> bool {
    name.bytes().all(|b| b == b'\t' || (b' '..=b'~').contains(&b))
}

fn quote_escape(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for c in name.chars() {
        if c == '"' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Encode `text` as space-separated encoded words, choosing the shorter of Q and B.
pub fn encode_words(text: &str) -> String {
    let q = q_words(text);
    let b = b_words(text);
    if joined_len(&q) <= joined_len(&b) {
        q.join(" ")
    } else {
        b.join(" ")
    }
}

fn joined_len(words: &[String]) -> usize {
    words.iter().map(String::len).sum::<usize>() + words.len().saturating_sub(1)
}

/// Characters that must be escaped in Q payloads carried inside a quoted parameter.
fn q_needs_escape(b: u8) -> bool {
    !(b'!'..=b'~').contains(&b) || matches!(b, b'=' | b'?' | b'_' | b'"' | b'\\')
}

fn q_encode_char(c: char, out: &mut String) {
    let mut buf = [0u8; 4];
    for &b in c.encode_utf8(&mut buf).as_bytes() {
        if b == b' ' {
            out.push('_');
        } else if q_needs_escape(b) {
            out.push_str(&format!("={:02X}", b));
        } else {
            out.push(b as char);
        }
    }
}

fn q_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut payload = String::new();
    for c in text.chars() {
        let mut encoded = String::new();
        q_encode_char(c, &mut encoded);
        if payload.len() + encoded.len() > MAX_PAYLOAD_LEN {
            words.push(format!("{}{}{}", Q_PREFIX, payload, SUFFIX));
            payload.clear();
        }
        payload.push_str(&encoded);
    }
    words.push(format!("{}{}{}", Q_PREFIX, payload, SUFFIX));
    words
}

fn b_words(text: &str) -> Vec<String> {
    let engine = &base64::engine::general_purpose::STANDARD;
    let mut words = Vec::new();
    let mut chunk: Vec<u8> = Vec::with_capacity(MAX_B_BYTES);
    let mut buf = [0u8; 4];
    for c in text.chars() {
        let bytes = c.encode_utf8(&mut buf).as_bytes();
        if chunk.len() + bytes.len() > MAX_B_BYTES {
            words.push(format!("{}{}{}", B_PREFIX, engine.encode(&chunk), SUFFIX));
            chunk.clear();
        }
        chunk.extend_from_slice(bytes);
    }
    words.push(format!("{}{}{}", B_PREFIX, engine.encode(&chunk), SUFFIX));
    words
}
