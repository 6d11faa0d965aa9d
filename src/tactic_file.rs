use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{Result, TacticError};
use crate::normalizer::normalize;
use crate::types::Tactic;

/// Pretty-printed document text with two-space indentation.
pub fn export_tactic_json(tactic: &Tactic) -> Result<String> {
    serde_json::to_string_pretty(tactic).map_err(|error| TacticError::InvalidFile(error.to_string()))
}

/// `"Sideout 1  (Rot 1)"` becomes `"Sideout_1_(Rot_1).json"`.
pub fn export_file_name(tactic: &Tactic) -> String {
    let mut stem = String::with_capacity(tactic.name.len());
    let mut in_whitespace = false;
    for ch in tactic.name.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                stem.push('_');
            }
            in_whitespace = true;
        } else {
            stem.push(ch);
            in_whitespace = false;
        }
    }
    format!("{stem}.json")
}

pub fn import_tactic_json(text: &str) -> Result<Tactic> {
    let raw: Value =
        serde_json::from_str(text).map_err(|error| TacticError::InvalidFile(error.to_string()))?;
    normalize(&raw)
}

pub fn load_tactic_file(path: &Path) -> Result<Tactic> {
    let text = fs::read_to_string(path).map_err(|error| io_error(path, error))?;
    import_tactic_json(&text)
}

pub fn save_tactic_file(path: &Path, tactic: &Tactic) -> Result<()> {
    let text = export_tactic_json(tactic)?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|error| io_error(parent, error))?;
    }
    fs::write(path, text).map_err(|error| io_error(path, error))
}

fn io_error(path: &Path, error: std::io::Error) -> TacticError {
    TacticError::Io(format!("{}: {error}", path.display()))
}
