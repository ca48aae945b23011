mod params;
mod registry;
pub mod vault;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use params::{optional_str, optional_usize, require_str};
pub use registry::ToolRegistry;
pub use vault::{register_vault_tools, vault_tools, Vault, VaultLimits};

/// Named tool arguments, as decoded from a plan.
pub type ToolParams = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("path escapes the vault: {0}")]
    OutsideVault(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("{0}")]
    Failed(String),
}

/// Name, purpose and JSON-schema parameters of a tool, as shown to the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

/// One declared parameter, flattened out of a definition's schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamInfo {
    pub name: String,
    pub kind: String,
    pub description: Option<String>,
    pub required: bool,
}

impl ToolDefinition {
    /// Declared parameters, required ones first, each group sorted by name.
    pub fn parameters(&self) -> Vec<ParamInfo> {
        let required: Vec<&str> = self
            .input_schema
            .get("required")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default();

        let mut params: Vec<ParamInfo> = self
            .input_schema
            .get("properties")
            .and_then(|v| v.as_object())
            .map(|props| {
                props
                    .iter()
                    .map(|(name, schema)| ParamInfo {
                        name: name.clone(),
                        kind: schema
                            .get("type")
                            .and_then(|v| v.as_str())
                            .unwrap_or("any")
                            .to_string(),
                        description: schema
                            .get("description")
                            .and_then(|v| v.as_str())
                            .map(String::from),
                        required: required.contains(&name.as_str()),
                    })
                    .collect()
            })
            .unwrap_or_default();

        params.sort_by(|a, b| b.required.cmp(&a.required).then_with(|| a.name.cmp(&b.name)));
        params
    }
}

/// A named capability the executor can call with resolved parameters.
#[async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    async fn invoke(&self, params: &ToolParams) -> Result<String, ToolError>;
}
