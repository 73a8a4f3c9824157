use anyhow::{Context, Result};
use riftgraph_core::{AnalysisResult, Msg};
use std::path::Path;

pub fn load_result(path: &Path) -> Result<AnalysisResult> {
    let raw = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("parse {}", path.display()))
}

/// The frame a viewer should see for the file as it is right now. A file
/// that cannot be read or parsed becomes an `Error` frame.
pub fn current_frame(path: &Path) -> Msg {
    match load_result(path) {
        Ok(result) => {
            tracing::info!(
                path = %path.display(),
                nodes = result.graph.nodes.len(),
                links = result.graph.links.len(),
                "analysis result loaded"
            );
            Msg::Result {
                result: Box::new(result),
            }
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %format!("{err:#}"), "analysis result unavailable");
            Msg::Error {
                detail: format!("{err:#}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn valid_file_becomes_result_frame() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{"_graph": {{"nodes": [{{"id": "A"}}], "links": []}}}}"#
        )
        .expect("write");

        match current_frame(file.path()) {
            Msg::Result { result } => assert_eq!(result.graph.nodes.len(), 1),
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn broken_file_becomes_error_frame() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "{{ not json").expect("write");

        match current_frame(file.path()) {
            Msg::Error { detail } => assert!(detail.contains("parse")),
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn missing_file_becomes_error_frame() {
        let dir = tempfile::tempdir().expect("temp dir");
        let frame = current_frame(&dir.path().join("absent.json"));
        assert!(matches!(frame, Msg::Error { .. }));
    }
}
