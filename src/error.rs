use std::path::PathBuf;

use thiserror::Error;

use crate::record::RecordId;

/// Errors emitted by the layout store and the room file codec.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// An update targeted a record id that was never added (or was removed).
    #[error("no placed record with id {id}")]
    NotFound {
        /// The id the caller asked for.
        id: RecordId,
    },
    /// Save or load was called before the room was named.
    #[error("room has no name yet; call set_room_name first")]
    UnnamedRoom,
    /// Wrap IO errors when reading or writing room files.
    #[error("room file IO failed: {0}")]
    Io(#[from] std::io::Error),
    /// A room file failed validation or decoding.
    #[error("room file {path} is corrupt: {detail}")]
    Corrupt {
        /// The offending file.
        path: PathBuf,
        /// What failed (magic, version, CRC, or payload decoding).
        detail: String,
    },
}
