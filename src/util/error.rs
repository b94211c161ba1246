//! Error types for the VCD library.

use thiserror::Error;

/// Main error type for VCD operations.
///
/// Write operations check every precondition before touching the document,
/// so any of these errors leaves the document exactly as it was.
#[derive(Error, Debug)]
pub enum Error {
    /// A frame interval or frame value could not be interpreted
    #[error("Invalid frame interval format: {0}")]
    InvalidRangeFormat(String),

    /// A uid is neither a non-negative integer nor a canonical UUID
    #[error("Invalid uid: {0:?}")]
    InvalidIdentifier(String),

    /// Element referenced by uid does not exist
    #[error("Unknown {element_type} with uid {uid}")]
    UnknownEntity { element_type: String, uid: String },

    /// Relation referenced by uid does not exist
    #[error("Unknown relation: {0}")]
    UnknownRelation(String),

    /// Coordinate system has not been declared
    #[error("Unknown coordinate system: {0}")]
    UnknownCoordinateSystem(String),

    /// Ontology uid has not been declared
    #[error("Unknown ontology: {0}")]
    UnknownOntology(String),

    /// Stream has not been declared
    #[error("Unknown stream: {0}")]
    UnknownStream(String),

    /// Ontology with the same name already registered
    #[error("Ontology already exists: {0}")]
    DuplicateOntology(String),

    /// Frame is not present in the document
    #[error("Unknown frame: {0}")]
    UnknownFrame(i64),

    /// Document does not conform to the schema
    #[error("Schema validation failed with {} message(s)", .0.len())]
    SchemaValidationFailed(Vec<String>),

    /// Document JSON does not have the expected shape
    #[error("Invalid document structure: {0}")]
    InvalidStructure(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid structure error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }

    /// Create an invalid frame interval error.
    pub fn range(msg: impl Into<String>) -> Self {
        Self::InvalidRangeFormat(msg.into())
    }

    /// Validation messages carried by this error, if any.
    pub fn messages(&self) -> &[String] {
        match self {
            Self::SchemaValidationFailed(msgs) => msgs,
            _ => &[],
        }
    }
}

/// Result type alias for VCD operations.
pub type Result<T> = std::result::Result<T, Error>;
