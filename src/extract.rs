//! Text extraction for chat input and server replies.
//!
//! Everything here is pure: no I/O, no session state.  The dispatcher uses these
//! helpers to decide which payload representation a draft becomes and to turn a
//! reply body into displayable text.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use time::Date;
use time::macros::format_description;

/// Two letters followed by six digits, e.g. `GH123456`.
static PREFIXED_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[a-z]{2}\d{6}\b").expect("prefixed id pattern compiles")
});

/// A standalone six digit number.
static NUMERIC_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{6}\b").expect("numeric id pattern compiles"));

/// Text after `name`/`naam`, up to the next `id`/`janam`/`dob` keyword or the end.
/// Also applied to the text before the identifier, so the identifier ends a name too.
static NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:naam|name)\s+([a-z\s]{3,50}?)(?:\s+(?:id|janam|dob)\b|\s*$)")
        .expect("name pattern compiles")
});

/// A leading `kyc` keyword.
static LEADING_KYC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^kyc\b\s*").expect("kyc pattern compiles"));

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("iso date pattern compiles"));

/// Keys that mark a pasted JSON object as an identity document.
pub const DOCUMENT_KEYS: &[&str] = &["document_number", "national_id", "name", "document_type"];

/// Identity fields found in free text accompanying an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KycFields {
    /// Uppercased national identifier.
    pub national_id: Option<String>,
    /// Full name.
    pub full_name: Option<String>,
}

/// Extracts a national identifier and a full name from free text.
///
/// Returns `None` when neither field is found.
///
/// ```
/// # use safichat::extract::extract_kyc_fields;
/// let fields = extract_kyc_fields("kyc name John Doe id GH123456").unwrap();
/// assert_eq!(fields.national_id.as_deref(), Some("GH123456"));
/// assert_eq!(fields.full_name.as_deref(), Some("John Doe"));
/// ```
pub fn extract_kyc_fields(text: &str) -> Option<KycFields> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let id_match = PREFIXED_ID
        .find(text)
        .or_else(|| NUMERIC_ID.find(text));
    let national_id = id_match.map(|m| m.as_str().to_uppercase());

    let before_id = id_match.map(|m| text[..m.start()].trim());
    let keyword_name = NAME
        .captures(text)
        .or_else(|| before_id.and_then(|before| NAME.captures(before)))
        .and_then(|c| c.get(1))
        .map(|name| name.as_str().trim().to_string());
    let full_name = match keyword_name {
        Some(name) => Some(name),
        None => before_id.and_then(|before| {
            let before = LEADING_KYC.replace(before, "");
            let before = before.trim();
            (!before.is_empty()).then(|| before.to_string())
        }),
    }
    .filter(|name| !name.is_empty());

    if national_id.is_none() && full_name.is_none() {
        None
    } else {
        Some(KycFields {
            national_id,
            full_name,
        })
    }
}

/// Normalizes a date of birth to ISO `yyyy-mm-dd`.
///
/// ISO input is kept as typed.  `dd-mm-yyyy` is rewritten when it names a real
/// calendar date.  Anything else is returned trimmed and unchanged.
///
/// An impossible `dd-mm-yyyy` date is not reordered: `31-02-1990` is sent as
/// `31-02-1990`, not as `1990-02-31`, and the server rejects it as typed.
///
/// ```
/// # use safichat::extract::normalize_dob;
/// assert_eq!(normalize_dob("25-12-1990"), "1990-12-25");
/// assert_eq!(normalize_dob("31-02-1990"), "31-02-1990");
/// ```
pub fn normalize_dob(input: &str) -> String {
    let input = input.trim();
    if ISO_DATE.is_match(input) {
        return input.to_string();
    }
    let dmy = format_description!("[day]-[month]-[year]");
    let iso = format_description!("[year]-[month]-[day]");
    match Date::parse(input, dmy) {
        Ok(date) if input.len() == 10 => date.format(iso).unwrap_or_else(|_| input.to_string()),
        _ => input.to_string(),
    }
}

/// Returns the object if `raw` is a single JSON object carrying a document key.
pub fn parse_pasted_document(raw: &str) -> Option<Map<String, Value>> {
    let raw = raw.trim();
    if !(raw.starts_with('{') && raw.ends_with('}')) {
        return None;
    }
    let object: Map<String, Value> = serde_json::from_str(raw).ok()?;
    DOCUMENT_KEYS
        .iter()
        .any(|key| object.get(*key).is_some_and(is_truthy))
        .then_some(object)
}

/// Turns a chat reply body into display text.
///
/// Prefers the `response` member, then `message`, then the whole JSON value.
/// Bodies that are not JSON are shown as they are.
pub fn reply_text(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => json_reply_text(&value),
        Err(_) => body.to_string(),
    }
}

fn json_reply_text(value: &Value) -> String {
    for key in ["response", "message"] {
        match value.get(key) {
            Some(Value::String(s)) if !s.is_empty() => return s.clone(),
            Some(v) if is_truthy(v) && !v.is_string() => return v.to_string(),
            _ => {}
        }
    }
    value.to_string()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_keyword_and_prefixed_id() {
        let fields = extract_kyc_fields("kyc name John Doe id GH123456").unwrap();
        assert_eq!(fields.national_id.as_deref(), Some("GH123456"));
        assert_eq!(fields.full_name.as_deref(), Some("John Doe"));
    }

    #[test]
    fn lowercase_id_is_uppercased_and_prefix_becomes_name() {
        let fields = extract_kyc_fields("my id is gh654321").unwrap();
        assert_eq!(fields.national_id.as_deref(), Some("GH654321"));
        assert_eq!(fields.full_name.as_deref(), Some("my id is"));
    }

    #[test]
    fn numeric_id_and_name_before_it() {
        let fields = extract_kyc_fields("kyc Ama Mensah 123456").unwrap();
        assert_eq!(fields.national_id.as_deref(), Some("123456"));
        assert_eq!(fields.full_name.as_deref(), Some("Ama Mensah"));
    }

    #[test]
    fn naam_keyword_before_dob() {
        let fields = extract_kyc_fields("naam Ravi Kumar dob 01-01-1990").unwrap();
        assert_eq!(fields.full_name.as_deref(), Some("Ravi Kumar"));
        assert_eq!(fields.national_id, None);
    }

    #[test]
    fn name_keyword_ends_at_identifier() {
        let fields = extract_kyc_fields("kyc name John Doe GH123456").unwrap();
        assert_eq!(fields.national_id.as_deref(), Some("GH123456"));
        assert_eq!(fields.full_name.as_deref(), Some("John Doe"));

        let fields = extract_kyc_fields("naam Ama Mensah 123456 thanks").unwrap();
        assert_eq!(fields.national_id.as_deref(), Some("123456"));
        assert_eq!(fields.full_name.as_deref(), Some("Ama Mensah"));
    }

    #[test]
    fn name_at_end_of_text() {
        let fields = extract_kyc_fields("my name Kofi Annan").unwrap();
        assert_eq!(fields.full_name.as_deref(), Some("Kofi Annan"));
    }

    #[test]
    fn embedded_digits_are_not_an_id() {
        assert_eq!(extract_kyc_fields("order 12345678 please"), None);
    }

    #[test]
    fn only_kyc_before_id_yields_no_name() {
        let fields = extract_kyc_fields("kyc GH123456").unwrap();
        assert_eq!(fields.national_id.as_deref(), Some("GH123456"));
        assert_eq!(fields.full_name, None);
    }

    #[test]
    fn nothing_to_extract() {
        assert_eq!(extract_kyc_fields(""), None);
        assert_eq!(extract_kyc_fields("here is my passport"), None);
    }

    #[test]
    fn dob_normalization() {
        assert_eq!(normalize_dob("25-12-1990"), "1990-12-25");
        assert_eq!(normalize_dob("1990-12-25"), "1990-12-25");
        assert_eq!(normalize_dob(" 1990-12-25 "), "1990-12-25");
        assert_eq!(normalize_dob("25/12/1990"), "25/12/1990");
        assert_eq!(normalize_dob("31-02-1990"), "31-02-1990");
    }

    #[test]
    fn pasted_document_detection() {
        let doc = parse_pasted_document(r#"{"document_number": "GH1", "x": 1}"#).unwrap();
        assert_eq!(doc["x"], Value::from(1));
        assert!(parse_pasted_document(r#"{"hello": "world"}"#).is_none());
        assert!(parse_pasted_document(r#"{"name": ""}"#).is_none());
        assert!(parse_pasted_document(r#"{"name": "#).is_none());
        assert!(parse_pasted_document(r#"[{"name": "x"}]"#).is_none());
        assert!(parse_pasted_document("name Ama").is_none());
    }

    #[test]
    fn reply_text_preference() {
        assert_eq!(reply_text(r#"{"response": "hi", "message": "no"}"#), "hi");
        assert_eq!(reply_text(r#"{"message": "queued"}"#), "queued");
        assert_eq!(reply_text(r#"{"response": ""}"#), r#"{"response":""}"#);
        assert_eq!(reply_text(r#"{"status": 1}"#), r#"{"status":1}"#);
        assert_eq!(reply_text("<html>Bad Gateway</html>"), "<html>Bad Gateway</html>");
    }
}
