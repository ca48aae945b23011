//! Read-only tools over a markdown vault on local disk.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::params::{optional_str, optional_usize, require_str};
use crate::{Tool, ToolDefinition, ToolError, ToolParams, ToolRegistry};

const SNIPPET_CHARS: usize = 100;

/// Output caps applied by the vault tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultLimits {
    pub max_folder_items: usize,
    pub max_search_results: usize,
    pub max_grep_results: usize,
    /// Default line budget for `read_note` when the caller gives none.
    pub max_file_lines: usize,
}

impl Default for VaultLimits {
    fn default() -> Self {
        Self {
            max_folder_items: 30,
            max_search_results: 15,
            max_grep_results: 10,
            max_file_lines: 80,
        }
    }
}

/// A vault root plus the limits its tools apply.
#[derive(Debug, Clone)]
pub struct Vault {
    root: PathBuf,
    limits: VaultLimits,
}

impl Vault {
    pub fn new(root: impl Into<PathBuf>, limits: VaultLimits) -> Self {
        Self {
            root: root.into(),
            limits,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn limits(&self) -> VaultLimits {
        self.limits
    }

    /// Map a vault-relative path onto disk. Leading slashes are ignored;
    /// `..` and drive prefixes are refused.
    fn resolve(&self, relative: &str) -> Result<PathBuf, ToolError> {
        let trimmed = relative.trim().trim_start_matches(['/', '\\']);
        let rel = Path::new(trimmed);
        for component in rel.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(ToolError::OutsideVault(relative.to_string()));
                }
            }
        }
        Ok(self.root.join(rel))
    }

    fn relative_display(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Every `.md` file under `dir`, skipping hidden entries, in file-name order.
    fn markdown_files(&self, dir: &Path) -> Vec<PathBuf> {
        WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && is_markdown(e.path()))
            .map(|e| e.into_path())
            .collect()
    }

    pub fn list_folder(&self, folder: &str) -> Result<String, ToolError> {
        let target = self.resolve(folder)?;
        if !target.is_dir() {
            return Err(ToolError::NotFound(format!("folder '{folder}'")));
        }

        let mut folders = Vec::new();
        let mut files = Vec::new();
        let entries = std::fs::read_dir(&target).map_err(|e| ToolError::Io(e.to_string()))?;
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_hidden(entry.file_name().as_os_str()) {
                continue;
            }
            let path = entry.path();
            if path.is_dir() {
                folders.push(format!("{name}/"));
            } else if is_markdown(&path) {
                files.push(name);
            }
        }
        folders.sort();
        files.sort();
        debug!(folders = folders.len(), files = files.len(), "list_folder");

        let items: Vec<String> = folders
            .into_iter()
            .chain(files)
            .take(self.limits.max_folder_items)
            .collect();
        if items.is_empty() {
            return Ok("Empty folder".to_string());
        }
        Ok(items.join("\n"))
    }

    pub fn search_notes(&self, keyword: &str) -> Result<String, ToolError> {
        let needle = keyword.to_lowercase();
        let mut matches: Vec<String> = self
            .markdown_files(&self.root)
            .iter()
            .map(|p| self.relative_display(p))
            .filter(|rel| rel.to_lowercase().contains(&needle))
            .collect();
        if matches.is_empty() {
            return Ok(format!("No notes found with '{keyword}'"));
        }
        matches.sort();
        debug!(matches = matches.len(), "search_notes");
        matches.truncate(self.limits.max_search_results);
        Ok(matches.join("\n"))
    }

    pub fn read_note(&self, file_path: &str, max_lines: Option<usize>) -> Result<String, ToolError> {
        let path = self.resolve(file_path)?;
        if !path.is_file() {
            return Err(ToolError::NotFound(format!("file '{file_path}'")));
        }
        let text = std::fs::read_to_string(&path).map_err(|e| ToolError::Io(e.to_string()))?;
        let max_lines = max_lines.unwrap_or(self.limits.max_file_lines);

        let lines: Vec<&str> = text.split('\n').collect();
        let mut content = lines
            .iter()
            .take(max_lines)
            .copied()
            .collect::<Vec<_>>()
            .join("\n");
        if lines.len() > max_lines {
            content.push_str(&format!("\n\n[{} more lines...]", lines.len() - max_lines));
        }
        debug!(lines = lines.len(), shown = lines.len().min(max_lines), "read_note");
        Ok(content)
    }

    pub fn grep_content(&self, search_term: &str, folder: &str) -> Result<String, ToolError> {
        let target = self.resolve(folder)?;
        if !target.is_dir() {
            return Err(ToolError::NotFound(format!("folder '{folder}'")));
        }
        let needle = search_term.to_lowercase();

        let mut results = Vec::new();
        for path in self.markdown_files(&target) {
            // Unreadable or non-UTF-8 notes are skipped.
            let Ok(content) = std::fs::read_to_string(&path) else {
                continue;
            };
            let Some(line) = content
                .split('\n')
                .find(|line| line.to_lowercase().contains(&needle))
            else {
                continue;
            };
            let snippet: String = line.chars().take(SNIPPET_CHARS).collect();
            results.push(format!("{}: ...{snippet}...", self.relative_display(&path)));
            if results.len() == self.limits.max_grep_results {
                break;
            }
        }

        if results.is_empty() {
            return Ok(format!("No content found matching '{search_term}'"));
        }
        debug!(files = results.len(), "grep_content");
        Ok(results.join("\n"))
    }
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "md")
}

/// Run a blocking vault operation off the async runtime.
async fn blocking<F>(f: F) -> Result<String, ToolError>
where
    F: FnOnce() -> Result<String, ToolError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ToolError::Failed(format!("vault task panicked: {e}")))?
}

pub struct ListFolder(Arc<Vault>);

#[async_trait]
impl Tool for ListFolder {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "list_folder".into(),
            description: "List sub-folders and notes of a vault folder".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "folder": {
                        "type": "string",
                        "description": "Vault-relative folder, empty for the vault root"
                    }
                }
            }),
        }
    }

    async fn invoke(&self, params: &ToolParams) -> Result<String, ToolError> {
        // Plans sometimes name the argument `path`.
        let folder = optional_str(params, "folder")
            .or_else(|| optional_str(params, "path"))
            .unwrap_or("")
            .to_string();
        info!(folder = %folder, "[TOOL] list_folder");
        let vault = self.0.clone();
        blocking(move || vault.list_folder(&folder)).await
    }
}

pub struct SearchNotes(Arc<Vault>);

#[async_trait]
impl Tool for SearchNotes {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "search_notes".into(),
            description: "Find notes whose file name or path contains a keyword".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "keyword": {
                        "type": "string",
                        "description": "Case-insensitive keyword matched against note paths"
                    }
                },
                "required": ["keyword"]
            }),
        }
    }

    async fn invoke(&self, params: &ToolParams) -> Result<String, ToolError> {
        let keyword = require_str(params, "keyword")?.to_string();
        info!(keyword = %keyword, "[TOOL] search_notes");
        let vault = self.0.clone();
        blocking(move || vault.search_notes(&keyword)).await
    }
}

pub struct ReadNote(Arc<Vault>);

#[async_trait]
impl Tool for ReadNote {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "read_note".into(),
            description: "Read the first lines of a markdown note".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "file_path": {
                        "type": "string",
                        "description": "Vault-relative path of the note"
                    },
                    "max_lines": {
                        "type": "integer",
                        "description": "Number of lines to return"
                    }
                },
                "required": ["file_path"]
            }),
        }
    }

    async fn invoke(&self, params: &ToolParams) -> Result<String, ToolError> {
        let file_path = require_str(params, "file_path")?.to_string();
        let max_lines = optional_usize(params, "max_lines")?;
        info!(file_path = %file_path, ?max_lines, "[TOOL] read_note");
        let vault = self.0.clone();
        blocking(move || vault.read_note(&file_path, max_lines)).await
    }
}

pub struct GrepContent(Arc<Vault>);

#[async_trait]
impl Tool for GrepContent {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "grep_content".into(),
            description: "Search the text of notes, one matching line per note".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "search_term": {
                        "type": "string",
                        "description": "Case-insensitive text to look for"
                    },
                    "folder": {
                        "type": "string",
                        "description": "Restrict the search to this folder"
                    }
                },
                "required": ["search_term"]
            }),
        }
    }

    async fn invoke(&self, params: &ToolParams) -> Result<String, ToolError> {
        let search_term = require_str(params, "search_term")?.to_string();
        let folder = optional_str(params, "folder").unwrap_or("").to_string();
        info!(search_term = %search_term, folder = %folder, "[TOOL] grep_content");
        let vault = self.0.clone();
        blocking(move || vault.grep_content(&search_term, &folder)).await
    }
}

/// The four vault tools bound to `vault`.
pub fn vault_tools(vault: Arc<Vault>) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(ListFolder(vault.clone())),
        Arc::new(SearchNotes(vault.clone())),
        Arc::new(ReadNote(vault.clone())),
        Arc::new(GrepContent(vault)),
    ]
}

pub fn register_vault_tools(registry: &mut ToolRegistry, vault: Arc<Vault>) {
    for tool in vault_tools(vault) {
        registry.register(tool);
    }
}
