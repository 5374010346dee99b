//! Error model. See spec §7.
//!
//! `InputFormatError` and `StreamDesyncError` abort the whole run, matching
//! `original_source/scripts/csidp.py`'s `main_`, which has no per-sentence
//! recovery. `InvariantError` is always fatal.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed input at sentence {sentence_index:?}{}: {detail}", token_index.map(|t| format!(", token {t}")).unwrap_or_default())]
    InputFormatError {
        detail: String,
        sentence_index: Option<usize>,
        token_index: Option<usize>,
    },

    #[error("stream {stream:?} desynced from sentence {sentence_index}: ran out of instances")]
    StreamDesyncError { stream: StreamKind, sentence_index: usize },

    #[error("invariant violated for dependent {dependent}, head {head}: {detail}")]
    InvariantError {
        detail: String,
        dependent: usize,
        head: usize,
    },

    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Dep,
    Dir,
    Mod,
}

impl std::fmt::Display for StreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StreamKind::Dep => "dep",
            StreamKind::Dir => "dir",
            StreamKind::Mod => "mod",
        };
        write!(f, "{name}")
    }
}
