use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PackError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid {what} JSON: {source}")]
    Json {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("no manifest.json in {}", .0.display())]
    MissingManifest(PathBuf),
}

impl PackError {
    pub(crate) fn json(what: &'static str) -> impl FnOnce(serde_json::Error) -> PackError {
        move |source| PackError::Json { what, source }
    }
}
