use crate::error::Result;
use crate::generate::GeneratedDesign;
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const DESIGN_DOC_FILE: &str = "DESIGN.md";
pub const DESIGN_JSON_FILE: &str = "design.json";

/// Atomically write `data` to `path` using a tempfile in the same directory.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Bundle key holding the idea a saved design was generated from.
pub const IDEA_KEY: &str = "idea";
const PROJECT_NAME_KEY: &str = "project_name";

/// Write the design document and the full tool result, plus the source idea,
/// into `dir`. Returns the two paths written.
pub fn write_design_bundle(dir: &Path, design: &GeneratedDesign, idea: &str) -> Result<(PathBuf, PathBuf)> {
    let doc = dir.join(DESIGN_DOC_FILE);
    let json = dir.join(DESIGN_JSON_FILE);

    let mut markdown = design.design_markdown.clone();
    if !markdown.ends_with('\n') {
        markdown.push('\n');
    }
    atomic_write(&doc, markdown.as_bytes())?;

    let mut bundle = serde_json::to_value(design)?;
    if let Some(obj) = bundle.as_object_mut() {
        obj.insert(IDEA_KEY.to_string(), Value::String(idea.trim().to_string()));
    }
    let mut data = serde_json::to_vec_pretty(&bundle)?;
    data.push(b'\n');
    atomic_write(&json, &data)?;

    Ok((doc, json))
}

/// Read a JSON document from disk without interpreting it.
pub fn read_json(path: &Path) -> Result<Value> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// A saved bundle taken apart: the bare design the validator expects, plus
/// whatever provenance was stored beside it.
#[derive(Debug, Clone)]
pub struct SavedBundle {
    pub project_name: Option<String>,
    pub idea: Option<String>,
    pub design: Value,
}

/// Strip bundle-only keys from a saved document. Plain design files pass
/// through with no provenance.
pub fn split_bundle(mut value: Value) -> SavedBundle {
    let mut take = |key: &str| {
        value
            .as_object_mut()
            .and_then(|obj| obj.remove(key))
            .and_then(|v| v.as_str().map(str::to_string))
            .filter(|s| !s.trim().is_empty())
    };
    let project_name = take(PROJECT_NAME_KEY);
    let idea = take(IDEA_KEY);
    SavedBundle {
        project_name,
        idea,
        design: value,
    }
}
