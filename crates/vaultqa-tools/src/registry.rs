use std::collections::HashMap;
use std::sync::Arc;

use crate::{Tool, ToolDefinition};

/// Tools available to a plan, looked up by name.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its definition's name, replacing any previous
    /// tool of the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.definition().name;
        self.tools.insert(name, tool);
    }

    pub fn with_tools(mut self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        for tool in tools {
            self.register(tool);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// All definitions, sorted by tool name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self.tools.values().map(|t| t.definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ToolError, ToolParams};
    use async_trait::async_trait;
    use serde_json::json;

    struct Echo(&'static str);

    #[async_trait]
    impl Tool for Echo {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: self.0.into(),
                description: format!("echo as {}", self.0),
                input_schema: json!({"type": "object"}),
            }
        }

        async fn invoke(&self, _params: &ToolParams) -> Result<String, ToolError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn register_and_lookup() {
        let registry = ToolRegistry::new()
            .with_tools([Arc::new(Echo("b")) as Arc<dyn Tool>, Arc::new(Echo("a"))]);
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("a"));
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.names(), vec!["a", "b"]);
        let defs = registry.definitions();
        assert_eq!(defs[0].name, "a");
        assert_eq!(defs[1].name, "b");
    }

    #[test]
    fn duplicate_name_replaces() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Echo("a")));
        registry.register(Arc::new(Echo("a")));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn invoke_through_registry() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Echo("ping")));
        let tool = registry.get("ping").unwrap();
        assert_eq!(tool.invoke(&ToolParams::new()).await.unwrap(), "ping");
    }

    #[test]
    fn empty_registry() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.definitions().is_empty());
    }
}
