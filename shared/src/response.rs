//! API Response types
//!
//! The backend reports failures as `{"detail": ...}`. `detail` is usually a
//! string; request validation failures carry a list of `{loc, msg, type}`
//! objects instead.

use serde::{Deserialize, Serialize};

/// Error body returned with non-success statuses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ApiErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(serde_json::Value::String(detail.into())),
        }
    }

    /// Human-readable message, if the body carries one
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            serde_json::Value::Array(entries) => {
                let msgs: Vec<&str> = entries
                    .iter()
                    .filter_map(|e| e.get("msg").and_then(|m| m.as_str()))
                    .collect();
                (!msgs.is_empty()).then(|| msgs.join("; "))
            }
            _ => None,
        }
    }
}
