use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PhyloError {
    #[error("malformed distance matrix: {msg}")]
    Shape { msg: String },

    #[error("degenerate distance matrix: {msg}")]
    DegenerateMatrix { msg: String },

    #[error("cannot reroot tree: {msg}")]
    DegenerateTree { msg: String },

    #[error("label '{label}' not found in tree")]
    LabelNotFound { label: String },

    #[error("newick parse error at byte {offset}: {message}")]
    Parse { offset: usize, message: String },

    #[error("unknown {kind} '{value}' (valid: {valid})")]
    UnknownOption {
        kind: &'static str,
        value: String,
        valid: &'static str,
    },

    #[error("newick io error: {0}")]
    Io(#[from] io::Error),
}

impl PhyloError {
    pub(crate) fn shape(msg: impl Into<String>) -> Self {
        Self::Shape { msg: msg.into() }
    }

    pub(crate) fn parse(offset: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            offset,
            message: message.into(),
        }
    }
}

pub type PhyloResult<T> = Result<T, PhyloError>;
