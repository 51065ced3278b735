use std::sync::LazyLock;

use axum::http::{HeaderMap, header::CONTENT_TYPE};
use model::{ContactSubmission, Source};
use regex::Regex;
use serde_json::Value;

pub const DEFAULT_UPLOAD_NAME: &str = "upload.mp4";

static PATH_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[/\\]").expect("separator pattern"));
static UNSAFE_CHARACTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("filename pattern"));

/// Reduces an untrusted upload name to something safe to display and log.
///
/// Both `/` and `\` count as separators and are flattened rather than dropped,
/// so `../../etc/passwd` becomes `etc_passwd`. Non-ASCII characters are removed,
/// not transliterated. May return an empty string.
pub fn sanitize_filename(input: &str) -> String {
    let flattened = PATH_SEPARATORS.replace_all(input, " ");
    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");

    UNSAFE_CHARACTERS
        .replace_all(&joined, "")
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// Name recorded for an uploaded part, [`DEFAULT_UPLOAD_NAME`] when the client sent none.
pub fn upload_filename(original: &str) -> String {
    if original.is_empty() {
        sanitize_filename(DEFAULT_UPLOAD_NAME)
    } else {
        sanitize_filename(original)
    }
}

pub fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| {
            value
                .trim_start()
                .to_ascii_lowercase()
                .starts_with("multipart/form-data")
        })
}

/// JSON truthiness: `false`, `0`, `""`, `[]`, `{}` and `null` are all off.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// Best effort integer from a JSON value, `0` when nothing sensible is there.
pub fn coerce_tick(value: &Value) -> i64 {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|n| n.trunc() as i64))
            .unwrap_or_default(),
        Value::String(text) => text.trim().parse().unwrap_or_default(),
        Value::Bool(flag) => i64::from(*flag),
        _ => 0,
    }
}

/// `{"live": true, "tick": n}` selects a live scene, anything else is no source.
pub fn live_source(body: &Value) -> Source {
    let Some(fields) = body.as_object() else {
        return Source::None;
    };

    if fields.get("live").is_some_and(is_truthy) {
        let tick = fields.get("tick").map(coerce_tick).unwrap_or_default();

        Source::Live { tick }
    } else {
        Source::None
    }
}

/// Strings as sent, other truthy values as their JSON text, falsy values empty.
fn field_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(value) if is_truthy(value) => value.to_string(),
        _ => String::new(),
    }
}

pub fn contact_submission(body: &Value) -> ContactSubmission {
    ContactSubmission::new(
        field_text(body.get("name")),
        field_text(body.get("email")),
        field_text(body.get("message")),
    )
}
