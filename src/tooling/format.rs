//! Format crawl results as text tables or JSON.

use crate::error::ApiError;
use crate::types::{FileEntry, Folder};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use serde_json::json;

/// Output format selected with `--format`
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

fn join_tags(tags: &[String]) -> String {
    tags.join(", ")
}

/// Folder containing a file, `/` for files at the top level.
pub fn parent_of(file_path: &str) -> &str {
    match file_path.rsplit_once('/') {
        Some(("", _)) | None => "/",
        Some((parent, _)) => parent,
    }
}

/// Format folders as `ID | Path [| Tags]`.
pub fn format_folders_text(folders: &[Folder], with_tags: bool) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    let mut header = vec!["ID", "Path"];
    if with_tags {
        header.push("Tags");
    }
    table.set_header(header);

    for folder in folders {
        let mut row = vec![folder.id.to_string(), folder.path.clone()];
        if with_tags {
            row.push(join_tags(&folder.tags));
        }
        table.add_row(row);
    }
    table.to_string()
}

/// Format files as `ID | Folder | Filename [| Tags]`.
pub fn format_files_text(files: &[FileEntry], with_tags: bool) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    let mut header = vec!["ID", "Folder", "Filename"];
    if with_tags {
        header.push("Tags");
    }
    table.set_header(header);

    for file in files {
        let mut row = vec![
            file.id.to_string(),
            parent_of(&file.file_path).to_string(),
            file.file_name.clone(),
        ];
        if with_tags {
            row.push(join_tags(&file.tags));
        }
        table.add_row(row);
    }
    table.to_string()
}

pub fn format_folders_json(folders: &[Folder]) -> Result<String, ApiError> {
    let value = json!({
        "status": "complete",
        "folders": folders,
        "count": folders.len(),
    });
    to_pretty(&value)
}

pub fn format_files_json(files: &[FileEntry]) -> Result<String, ApiError> {
    let value = json!({
        "status": "complete",
        "files": files,
        "count": files.len(),
    });
    to_pretty(&value)
}

/// JSON body for a run that stopped before the frontier emptied.
pub fn format_interrupted_json(reason: &str, expanded: usize, remaining: usize) -> Result<String, ApiError> {
    let value = json!({
        "status": "interrupted",
        "reason": reason,
        "expanded": expanded,
        "remaining": remaining,
    });
    to_pretty(&value)
}

fn to_pretty(value: &serde_json::Value) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::InvalidArgument(format!("Failed to encode output: {}", e)))
}
