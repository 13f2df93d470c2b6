// JSON persistence for fetched hierarchies and flattened paths

use crate::error::{CoreError, Result};
use crate::paths::LeafPath;
use pagecal_notion::FetchOutcome;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| CoreError::write(parent, e))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|e| CoreError::write(path, e))
}

pub fn save_hierarchy<P: AsRef<Path>>(path: P, outcome: &FetchOutcome) -> Result<()> {
    let path = path.as_ref();
    write_json(path, outcome)?;
    info!("Page hierarchy saved to {}", path.display());
    Ok(())
}

/// Load a hierarchy saved by [`save_hierarchy`]. A bare page tree (no
/// `failures` wrapper) is accepted too.
pub fn load_hierarchy<P: AsRef<Path>>(path: P) -> Result<FetchOutcome> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| CoreError::read(path, e))?;

    let value: serde_json::Value = serde_json::from_str(&content).map_err(|source| CoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let outcome = if value.get("root").is_some() {
        serde_json::from_value(value)
    } else {
        serde_json::from_value(value).map(FetchOutcome::complete)
    };

    outcome.map_err(|source| CoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn save_paths<P: AsRef<Path>>(path: P, paths: &[LeafPath]) -> Result<()> {
    let path = path.as_ref();
    write_json(path, paths)?;
    info!("{} leaf paths saved to {}", paths.len(), path.display());
    Ok(())
}
