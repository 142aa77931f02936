//! Error types for parsing, serialization and annotation access

use crate::codec::DocumentFormat;

/// Annotation document could not be turned into a graph
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("document is empty or shorter than {minimum} characters")]
    TooShort { minimum: usize },

    #[error("document does not look like JSON-LD, Turtle or RDF/XML")]
    UnrecognizedFormat,

    #[error("invalid JSON: {0}")]
    Json(String),

    #[error("{format} syntax error: {message}")]
    Syntax { format: DocumentFormat, message: String },

    #[error("invalid base IRI {base}: {message}")]
    InvalidBase { base: String, message: String },

    #[error("{format} document contains unsupported term: {term}")]
    UnsupportedTerm { format: DocumentFormat, term: String },

    #[error("document produced no statements")]
    EmptyGraph,
}

impl ParseError {
    pub(crate) fn syntax<E: std::fmt::Display>(format: DocumentFormat, error: E) -> Self {
        ParseError::Syntax {
            format,
            message: error.to_string(),
        }
    }
}

/// Graph could not be written out
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("serialization failed: {0}")]
pub struct SerializeError(pub String);

/// Required annotation statement missing, or no graph to read from
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnnotationError {
    #[error("annotation has no data to build a graph from")]
    NoGraph,

    #[error("annotation data could not be parsed: {0}")]
    Parse(#[from] ParseError),

    #[error("no rdf:type statement denotes an oa:Annotation")]
    MissingType,

    #[error("annotation declares no oa:hasTarget")]
    MissingTarget,

    #[error(transparent)]
    Serialize(#[from] SerializeError),
}
