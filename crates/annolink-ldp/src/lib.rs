//! LDP統合モジュール
//!
//! Web Annotation を Linked Data Platform (LDP) サーバー上の
//! コンテナツリーとして保存・読み込みします:
//! - ルートリソース (`oa:Annotation`, `oa:motivatedBy`)
//! - ボディコンテナ `{root}/b` と各ボディリソース
//! - ターゲットコンテナ `{root}/t` と各ターゲットリソース

pub mod call;
pub mod config;
pub mod creator;
pub mod destroyer;
pub mod ldp_annotation;
pub mod loader;
pub mod memory;
pub mod transport;

pub use call::{CallContext, CancelHandle};
pub use config::LdpConfig;
pub use creator::{CreateProgress, CreateStep, LdpCreator, PartialCreateError};
pub use destroyer::LdpDestroyer;
pub use ldp_annotation::LdpAnnotation;
pub use loader::LdpLoader;
pub use memory::MemoryLdp;
pub use transport::{HttpTransport, LdpTransport, TransportError};

use annolink_core::{AnnotationError, ParseError, SerializeError};

/// LDP operation result type
pub type LdpResult<T> = Result<T, LdpError>;

/// LDP error types
#[derive(thiserror::Error, Debug)]
pub enum LdpError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Serialize(#[from] SerializeError),

    #[error("Invalid annotation: {0}")]
    Annotation(#[from] AnnotationError),

    #[error("Annotation {root} has no target resources")]
    MissingTarget { root: String },

    #[error("Cannot store {role} {term} as an LDP resource")]
    UnsupportedTerm { role: &'static str, term: String },

    #[error("Resource {uri} is not under the LDP base {base}")]
    ForeignResource { uri: String, base: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl LdpError {
    /// The server answered 404 for the requested resource
    pub fn is_not_found(&self) -> bool {
        matches!(self, LdpError::Transport(e) if e.status() == Some(404))
    }
}

/// Last path segment of a resource URL, the identifier callers hand around
pub fn resource_id(url: &str) -> &str {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(url)
}
