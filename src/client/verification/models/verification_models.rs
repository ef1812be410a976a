use serde::Deserialize;

/// What the verification endpoint said, reduced to the parts the pipeline reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResponse {
    pub status: u16,
    pub detail: Option<String>,
}

impl VerificationResponse {
    pub fn new(status: u16, detail: Option<String>) -> Self {
        VerificationResponse { status, detail }
    }

    /// Pull a human-readable detail from a response body: JSON `detail`,
    /// then JSON `message`, then the raw text.
    pub fn from_body(status: u16, body: &str) -> Self {
        let detail = match serde_json::from_str::<DetailBody>(body) {
            Ok(parsed) => parsed.detail.or(parsed.message).and_then(detail_text),
            Err(_) => None,
        }
        .or_else(|| {
            let text = body.trim();
            (!text.is_empty() && !text.starts_with('{')).then(|| text.to_string())
        });
        VerificationResponse { status, detail }
    }
}

#[derive(Debug, Deserialize)]
struct DetailBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<serde_json::Value>,
}

fn detail_text(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
        serde_json::Value::Null | serde_json::Value::String(_) => None,
        other => Some(other.to_string()),
    }
}
