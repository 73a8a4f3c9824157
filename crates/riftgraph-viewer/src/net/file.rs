use anyhow::{Context, Result};
use crossbeam_channel::Sender;
use riftgraph_core::AnalysisResult;
use std::path::Path;

use crate::net::Incoming;

pub fn read_result(path: &Path) -> Result<AnalysisResult> {
    let raw = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("parse {}", path.display()))
}

/// One-shot load for `--result <path>`; the outcome goes through the same
/// channel as feed frames.
pub fn load_into(path: &Path, tx: &Sender<Incoming>) {
    let source = path.display().to_string();
    let inc = match read_result(path) {
        Ok(result) => Incoming::result(source, Box::new(result)),
        Err(e) => {
            tracing::warn!(path = %source, error = %format!("{e:#}"), "could not load result file");
            Incoming::error(source, format!("{e:#}"))
        }
    };
    let _ = tx.send(inc);
}
