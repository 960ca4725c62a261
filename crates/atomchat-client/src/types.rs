//! Wire types for the atomchat backend surface.

use serde::{Deserialize, Serialize};

/// Where the shell should send the user next.
///
/// Navigation is returned as plain data so the session layer never mutates
/// a navigation environment itself; the host decides what "going to the
/// login entry point" means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Login,
}

#[derive(Debug, Serialize)]
pub struct CredentialsRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// Record returned by the `/me` session probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct AskRequest<'a> {
    pub question: &'a str,
}

/// Answer shape shared by `/ask` and `/analyze-media`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub symbol: String,
    pub name: String,
    pub atomic_number: u32,
    pub atomic_weight: f64,
    #[serde(default)]
    pub group: Option<u32>,
    pub period: u32,
    pub state: String,
    pub electron_configuration: String,
    #[serde(default)]
    pub density: Option<f64>,
}

/// Fallback shown when a lookup misses and the backend gave no detail text.
pub const ELEMENT_NOT_FOUND_HINT: &str =
    "Element not found. Try a symbol (like Fe) or name (like Iron).";

/// Outcome of a direct element lookup.
///
/// A miss is an expected result, not a failure: `/elements/{id}` answering
/// 404 becomes [`ElementLookup::NotFound`] instead of an error.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementLookup {
    Found(ElementRecord),
    NotFound { message: String },
}

impl ElementLookup {
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_record_tolerates_missing_group_and_density() {
        let record: ElementRecord = serde_json::from_value(serde_json::json!({
            "symbol": "H",
            "name": "Hydrogen",
            "atomic_number": 1,
            "atomic_weight": 1.008,
            "group": null,
            "period": 1,
            "state": "gas",
            "electron_configuration": "1s1"
        }))
        .expect("element record");
        assert_eq!(record.symbol, "H");
        assert_eq!(record.group, None);
        assert_eq!(record.density, None);
    }

    #[test]
    fn answer_decodes_without_optional_fields() {
        let answer: Answer =
            serde_json::from_str(r#"{"answer":"Carbon is a nonmetal."}"#).expect("answer");
        assert_eq!(answer.answer, "Carbon is a nonmetal.");
        assert_eq!(answer.element_context, None);
        assert_eq!(answer.image_url, None);
    }

    #[test]
    fn answer_keeps_backend_context_when_present() {
        let answer: Answer = serde_json::from_value(serde_json::json!({
            "answer": "Iron is a transition metal.",
            "element_context": "Element Data for Iron (Fe)",
            "image_url": "https://example.com/table.png"
        }))
        .expect("answer");
        assert!(answer.element_context.is_some());
        assert!(answer.image_url.is_some());
    }
}
