use serde::{Deserialize, Serialize};

// Subset of the ConceptNet 5 `/query` response that the lookup reads.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiQueryResponse {
    #[serde(default)]
    pub edges: Vec<ApiEdge>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEdge {
    pub start: ApiNode,
    pub end: ApiNode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiNode {
    #[serde(rename = "@id")]
    pub id: String,                // "/c/ja/走る/v"
    #[serde(default)]
    pub label: String,             // "走る"
    #[serde(default)]
    pub language: Option<String>,  // "ja"
    #[serde(default)]
    pub term: Option<String>,      // "/c/ja/走る" (sense-less)
}

impl ApiNode {
    pub fn term_uri(&self) -> &str {
        self.term.as_deref().unwrap_or(&self.id)
    }
}

