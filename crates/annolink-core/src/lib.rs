//! # Annolink Core
//!
//! Web Annotation (Open Annotation) のRDFグラフモデル
//! JSON-LD / Turtle / RDF/XML の注釈文書をグラフに変換し、
//! type・motivation・target・body を問い合わせる

pub mod annotation;
pub mod codec;
pub mod context;
pub mod error;
pub mod graph;
pub mod model;
pub mod vocab;

pub use annotation::*;
pub use codec::{DocumentFormat, DOCUMENT_BASE};
pub use error::*;
pub use graph::*;
pub use model::*;
