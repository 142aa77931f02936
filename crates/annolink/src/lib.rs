//! # Annolink - Web Annotations over Linked Data Platform
//!
//! Annolink stores and retrieves W3C Open Annotation documents on an LDP
//! server. An annotation is split into a root resource plus body and target
//! containers on create, and reassembled into a single graph on load.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use annolink::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = MemoryLdp::new("http://localhost:8080/rest/anno");
//!     let cx = CallContext::new();
//!
//!     let annotation = Annotation::parse(
//!         r#"<> a <http://www.w3.org/ns/oa#Annotation> ;
//!               <http://www.w3.org/ns/oa#hasTarget> <http://example.org/page> ."#,
//!         None,
//!     )?;
//!
//!     let id = LdpCreator::new(&server, &annotation).create(&cx).await?;
//!     let loaded = LdpLoader::new(&server).load(&id, &cx).await?;
//!
//!     println!("{} targets {:?}", id, loaded.has_target());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`annolink-core`**: RDF terms, indexed graph, codecs and the `Annotation` model
//! - **`annolink-ldp`**: LDP transport, create/load/delete mapping, in-memory server
//! - **`annolink-cli`**: Command-line interface
//!
//! ## Feature Flags
//!
//! - `full` (default): All crates included
//! - `core`: Only the annotation and graph model
//! - `ldp`: LDP storage
//! - `cli`: Command-line tools

#[cfg(feature = "annolink-core")]
pub use annolink_core as core;

#[cfg(feature = "annolink-ldp")]
pub use annolink_ldp as ldp;

#[cfg(feature = "annolink-cli")]
pub use annolink_cli as cli;

// Convenience re-exports for common types (feature-gated)
#[cfg(feature = "annolink-core")]
pub use annolink_core::{model, vocab, Annotation, AnnotationError, DocumentFormat, Graph, ParseError};

#[cfg(feature = "annolink-ldp")]
pub use annolink_ldp::{
    CallContext, HttpTransport, LdpConfig, LdpCreator, LdpDestroyer, LdpError, LdpLoader, LdpTransport, MemoryLdp,
    PartialCreateError,
};

// Commonly used external dependencies
pub use anyhow;
pub use serde;
pub use serde_json;
pub use tokio;

/// Prelude module for convenient imports
///
/// ```rust
/// use annolink::prelude::*;
/// ```
pub mod prelude {
    #[cfg(feature = "annolink-core")]
    pub use crate::model::*;
    #[cfg(feature = "annolink-core")]
    pub use crate::{Annotation, AnnotationError, DocumentFormat, Graph, ParseError};

    #[cfg(feature = "annolink-ldp")]
    pub use crate::{
        CallContext, HttpTransport, LdpConfig, LdpCreator, LdpDestroyer, LdpError, LdpLoader, LdpTransport,
        MemoryLdp, PartialCreateError,
    };

    // Common external types
    pub use anyhow::Result;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::Value;
    pub use tokio;
}

/// Current version of Annolink
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Health check function
///
/// Returns which parts of the stack this build includes.
pub fn health_check() -> serde_json::Value {
    serde_json::json!({
        "status": "healthy",
        "version": VERSION,
        "modules": {
            "core": cfg!(feature = "annolink-core"),
            "ldp": cfg!(feature = "annolink-ldp"),
            "cli": cfg!(feature = "annolink-cli")
        }
    })
}
