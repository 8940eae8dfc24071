//! Request and response envelope types.

use crate::variant::ProblemVariant;
use serde::{Deserialize, Serialize};

/// One candidate object. `weight` and `value` are always present; exactly one
/// of the optional fields may be populated, depending on the variant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Item {
    pub weight: u64,
    pub value: u64,
    /// Two-dimensional cost only; replaces the `weight,value` token order
    /// with `weight,volume,value`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
    /// Bounded-count only: copies available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    /// Mixed only: 0 = take once, 1 = unbounded, 2 = bounded.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<u8>,
    /// Grouped only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<u64>,
    /// Dependency families only: 1-based index of the main item, 0 for roots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProblemParams {
    pub capacity: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity2: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<u64>,
    /// Order is significant: `group`/`parent` reference positions here.
    pub items: Vec<Item>,
}

/// Envelope received from the UI-facing layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveRequest {
    pub algorithm: ProblemVariant,
    pub params: ProblemParams,
}

/// Envelope returned to the UI-facing layer. Exactly one of `data`/`error`
/// is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SolveResponse {
    pub fn success(data: serde_json::Value) -> Self {
        SolveResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: String) -> Self {
        SolveResponse {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

impl Item {
    pub fn new(weight: u64, value: u64) -> Self {
        Item {
            weight,
            value,
            ..Item::default()
        }
    }
}
