//! Shutdown dump of the block cache.

use chrono::Utc;
use ledger_types::Block;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Write `blocks` as a JSON array to `<dir>/<endpoint>/<timestamp>.json`.
///
/// Characters in `endpoint` that are awkward in file names are replaced.
pub fn write_snapshot(dir: &Path, endpoint: &str, blocks: &[Arc<Block>]) -> std::io::Result<PathBuf> {
    let endpoint: String = endpoint
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    let out_dir = dir.join(endpoint);
    std::fs::create_dir_all(&out_dir)?;

    let path = out_dir.join(format!("{}.json", Utc::now().format("%Y%m%dT%H%M%S%.3fZ")));
    let blocks: Vec<&Block> = blocks.iter().map(|b| b.as_ref()).collect();
    let json = serde_json::to_vec_pretty(&blocks)?;
    std::fs::write(&path, json)?;
    Ok(path)
}
