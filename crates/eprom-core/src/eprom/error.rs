use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EpromError {
    #[error("Unsupported chip identifier: {0}")]
    UnsupportedChip(u8),

    #[error("Storage error on '{file}': {source}")]
    Storage {
        file: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] io::Error),
}

impl EpromError {
    pub fn storage(file: &'static str, source: io::Error) -> Self {
        EpromError::Storage { file, source }
    }
}
