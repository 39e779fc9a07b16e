//! Response body augmentation.
//!
//! # Responsibilities
//! - Classify a backend response by its declared content type
//! - Embed the serving backend's identity in HTML, JSON and text bodies
//! - Leave every other body byte-for-byte untouched
//!
//! # Design Decisions
//! - Pure function over bytes: no shared state, never fails
//! - Unparseable JSON degrades to the plain-text trailer
//! - `Cow::Borrowed` signals "unchanged" so the caller keeps Content-Length

use serde_json::{Map, Value};
use std::borrow::Cow;

const BODY_CLOSE_TAG: &[u8] = b"</body>";
const SERVER_KEY: &str = "_server";
const DATA_KEY: &str = "data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Markup,
    Structured,
    Plain,
    Opaque,
}

fn classify(content_type: &str) -> BodyKind {
    let main_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if main_type.contains("html") {
        BodyKind::Markup
    } else if main_type.contains("json") {
        BodyKind::Structured
    } else if main_type.contains("text") {
        BodyKind::Plain
    } else {
        BodyKind::Opaque
    }
}

/// Embed the backend identity into `body` according to `content_type`.
pub fn augment<'a>(body: &'a [u8], content_type: &str, backend_port: u16) -> Cow<'a, [u8]> {
    match classify(content_type) {
        BodyKind::Markup => Cow::Owned(inject_html(body, backend_port)),
        BodyKind::Structured => Cow::Owned(
            inject_json(body, backend_port).unwrap_or_else(|e| {
                tracing::trace!(error = %e, "Body is not valid JSON, appending text trailer");
                inject_text(body, backend_port)
            }),
        ),
        BodyKind::Plain => Cow::Owned(inject_text(body, backend_port)),
        BodyKind::Opaque => Cow::Borrowed(body),
    }
}

fn inject_html(body: &[u8], port: u16) -> Vec<u8> {
    let comment = format!("<!-- Served by backend server on port {} -->", port);
    let mut out = Vec::with_capacity(body.len() + comment.len() + 1);

    match find_ignore_ascii_case(body, BODY_CLOSE_TAG) {
        Some(pos) => {
            out.extend_from_slice(&body[..pos]);
            out.extend_from_slice(comment.as_bytes());
            out.push(b'\n');
            out.extend_from_slice(&body[pos..]);
        }
        None => {
            out.extend_from_slice(body);
            out.push(b'\n');
            out.extend_from_slice(comment.as_bytes());
        }
    }
    out
}

fn inject_json(body: &[u8], port: u16) -> Result<Vec<u8>, serde_json::Error> {
    let root: Value = serde_json::from_slice(body)?;
    let server = Value::String(format!("backend-{}", port));

    let augmented = match root {
        Value::Object(mut map) => {
            map.insert(SERVER_KEY.to_string(), server);
            Value::Object(map)
        }
        other => {
            let mut map = Map::new();
            map.insert(DATA_KEY.to_string(), other);
            map.insert(SERVER_KEY.to_string(), server);
            Value::Object(map)
        }
    };
    serde_json::to_vec(&augmented)
}

fn inject_text(body: &[u8], port: u16) -> Vec<u8> {
    let trailer = format!("\n[Served by backend server on port {}]", port);
    let mut out = Vec::with_capacity(body.len() + trailer.len());
    out.extend_from_slice(body);
    out.extend_from_slice(trailer.as_bytes());
    out
}

fn find_ignore_ascii_case(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}
