//! Error and warning types for `BzMsh`

use std::path::PathBuf;

use thiserror::Error;

/// The error type for `BzMsh` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The reader ran out of bytes in the middle of a structure.
    #[error("truncated data at offset {offset}: needed {needed} bytes, {available} available")]
    TruncatedData {
        /// Absolute offset where the read started.
        offset: usize,
        /// Number of bytes the read required.
        needed: usize,
        /// Number of bytes left in the current chunk.
        available: usize,
    },

    // ==================== MSH Format Errors ====================
    /// The file does not start with the MSH magic.
    #[error("invalid MSH magic: expected \"MSH \", found {0:?}")]
    InvalidMshMagic([u8; 4]),

    /// The MSH container version is not supported.
    #[error("unsupported MSH version: {version}")]
    UnsupportedMshVersion {
        /// The version number found in the file.
        version: u32,
    },

    /// A chunk appeared before a chunk that must precede it.
    #[error("chunk {tag} out of order inside {container}")]
    ChunkOutOfOrder {
        /// The container chunk tag.
        container: String,
        /// The offending chunk tag.
        tag: String,
    },

    /// A chunk that may appear only once was repeated.
    #[error("duplicate chunk {tag} inside {container}")]
    DuplicateChunk {
        /// The container chunk tag.
        container: String,
        /// The repeated chunk tag.
        tag: String,
    },

    /// A chunk required by the container (or by its header flags) is missing.
    #[error("missing chunk {tag} inside {container}")]
    MissingChunk {
        /// The container chunk tag.
        container: String,
        /// The missing chunk tag.
        tag: String,
    },

    /// A vertex group's index count is not a whole number of triangles.
    #[error("vertex group {group} has index count {count}, not a multiple of 3")]
    IndexCountNotTriangles {
        /// Vertex group position inside its mesh.
        group: usize,
        /// The stored index count.
        count: u32,
    },

    /// The vertex groups do not add up to the buffers they describe.
    #[error("vertex groups describe {expected} {what} but the buffer holds {actual}")]
    GroupCountMismatch {
        /// "vertices" or "indices".
        what: &'static str,
        /// Sum over the vertex groups.
        expected: usize,
        /// Actual buffer length.
        actual: usize,
    },

    /// A per-vertex attribute array does not match the vertex count.
    #[error("{what} count {actual} does not match vertex count {expected}")]
    AttributeCountMismatch {
        /// Attribute name.
        what: &'static str,
        /// Vertex count.
        expected: usize,
        /// Attribute count.
        actual: usize,
    },

    /// A resolved triangle index points past the vertex buffer.
    #[error("index {index} out of range for {vertex_count} vertices in {mesh}")]
    IndexOutOfRange {
        /// Mesh (or block) name.
        mesh: String,
        /// The resolved index.
        index: u32,
        /// Number of vertices available.
        vertex_count: usize,
    },

    /// A record references a material, texture or descriptor that does not exist.
    #[error("invalid {what} reference {index} ({available} available)")]
    InvalidReference {
        /// Kind of referenced record.
        what: &'static str,
        /// The stored reference.
        index: i64,
        /// Number of records that exist.
        available: usize,
    },

    /// A Block could not be constructed; siblings are unaffected.
    #[error("block {index} ({name}): {source}")]
    Block {
        /// Position of the block chunk in the file.
        index: usize,
        /// Block name, if the header was readable.
        name: String,
        /// The underlying failure.
        #[source]
        source: Box<Error>,
    },

    // ==================== DXTBZ2 Texture Errors ====================
    /// The DXTBZ2 header or its first mip is unusable.
    #[error("invalid DXTBZ2 texture: {message}")]
    InvalidDxtbz2 {
        /// Description of what is invalid.
        message: String,
    },

    /// A conversion was cancelled between mip levels.
    #[error("operation cancelled")]
    Cancelled,

    // ==================== Scene Errors ====================
    /// A referenced texture or material file could not be found.
    #[error("resource not found: {name}")]
    ResourceNotFound {
        /// The resource base name that was searched for.
        name: String,
    },

    /// The scene collaborator rejected an operation.
    #[error("scene sink error: {0}")]
    Sink(String),

    // ==================== File System Errors ====================
    /// Invalid file path.
    #[error("invalid path: {0}")]
    InvalidPath(PathBuf),

    /// Directory traversal error.
    #[error("directory walk error: {0}")]
    WalkDirError(String),
}

impl Error {
    /// Wrap an error as the failure of one Block.
    pub fn in_block(self, index: usize, name: impl Into<String>) -> Self {
        Error::Block {
            index,
            name: name.into(),
            source: Box::new(self),
        }
    }

    /// Whether this error belongs to the malformed-data family
    /// (bad tag order, bad lengths, bad counts or references).
    pub fn is_format_error(&self) -> bool {
        match self {
            Error::InvalidMshMagic(_)
            | Error::UnsupportedMshVersion { .. }
            | Error::ChunkOutOfOrder { .. }
            | Error::DuplicateChunk { .. }
            | Error::MissingChunk { .. }
            | Error::IndexCountNotTriangles { .. }
            | Error::GroupCountMismatch { .. }
            | Error::AttributeCountMismatch { .. }
            | Error::IndexOutOfRange { .. }
            | Error::InvalidReference { .. }
            | Error::InvalidDxtbz2 { .. } => true,
            Error::Block { source, .. } => source.is_format_error(),
            _ => false,
        }
    }

    /// Whether this error (or the block failure it wraps) is a truncation.
    pub fn is_truncation(&self) -> bool {
        match self {
            Error::TruncatedData { .. } => true,
            Error::Block { source, .. } => source.is_truncation(),
            _ => false,
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::WalkDirError(err.to_string())
    }
}

/// A specialized Result type for `BzMsh` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Recoverable conditions reported alongside a successful result.
#[derive(Error, Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub enum Warning {
    /// An animation track could not be attached to any node or bone.
    #[error("animation '{list}' track {track}: target {target} has no matching node")]
    UnresolvedReference {
        /// Animation list name.
        list: String,
        /// Track position in the list.
        track: usize,
        /// The target index stored in the track.
        target: u32,
    },

    /// A texture or material file was not found; the asset is used without it.
    #[error("resource not found: {name}")]
    ResourceNotFound {
        /// The missing resource.
        name: String,
    },

    /// A DXTBZ2 texture ended before its declared mip count.
    #[error("partial conversion: wrote {written} of {declared} mip levels")]
    PartialConversion {
        /// Mip count stored in the header.
        declared: u32,
        /// Mip levels actually written.
        written: u32,
    },

    /// The alpha heuristic had no usable signal (base height of zero).
    #[error("pixel format ambiguous (base height {base_height}); treated as opaque")]
    AmbiguousPixelFormat {
        /// Base height stored in the header.
        base_height: i32,
    },
}
