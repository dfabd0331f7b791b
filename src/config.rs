//! JSON parameter files for the command-line tool.
use crate::params::AnalyzerParams;
use std::fs;
use std::path::Path;

/// Read analyzer parameters; keys missing from the file keep their defaults.
pub fn load_params(path: &Path) -> Result<AnalyzerParams, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    let params: AnalyzerParams = serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))?;
    params
        .validate()
        .map_err(|e| format!("Invalid config {}: {e}", path.display()))?;
    Ok(params)
}
