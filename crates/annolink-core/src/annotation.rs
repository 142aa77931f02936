//! Open Annotation model over a parsed graph
//!
//! An [`Annotation`] holds the raw serialized document and derives its graph
//! on first access. All accessors are graph queries; nothing else is cached.

use crate::codec::{self, DocumentFormat, DOCUMENT_BASE};
use crate::error::{AnnotationError, ParseError};
use crate::graph::Graph;
use crate::model::Term;
use crate::vocab::{cnt, oa, rdf};
use std::collections::BTreeSet;
use std::sync::OnceLock;
use tracing::debug;

/// Documents shorter than this are rejected before parsing
pub const MIN_DATA_LEN: usize = 30;

/// A Web Annotation: optional identifier plus a lazily parsed graph
#[derive(Debug, Clone, Default)]
pub struct Annotation {
    id: Option<String>,
    data: Option<String>,
    format: Option<DocumentFormat>,
    graph: OnceLock<Result<Graph, ParseError>>,
}

impl Annotation {
    /// Annotation backed by a serialized document; the format is sniffed
    pub fn new<S: Into<String>>(data: S) -> Self {
        Annotation {
            data: Some(data.into()),
            ..Default::default()
        }
    }

    /// Annotation backed by a document in a known format
    pub fn with_format<S: Into<String>>(data: S, format: DocumentFormat) -> Self {
        Annotation {
            data: Some(data.into()),
            format: Some(format),
            ..Default::default()
        }
    }

    /// Identifier-only stub, as produced by listings
    pub fn with_id<S: Into<String>>(id: S) -> Self {
        Annotation {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    /// Annotation around an already built graph
    pub fn from_graph(id: Option<String>, graph: Graph) -> Self {
        let annotation = Annotation {
            id,
            ..Default::default()
        };
        let _ = annotation.graph.set(Ok(graph));
        annotation
    }

    /// Parse eagerly, surfacing the parse failure
    pub fn parse<S: Into<String>>(data: S, format: Option<DocumentFormat>) -> Result<Self, ParseError> {
        let annotation = match format {
            Some(format) => Annotation::with_format(data, format),
            None => Annotation::new(data),
        };
        match annotation.parsed() {
            Some(Err(e)) => Err(e.clone()),
            _ => Ok(annotation),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    /// Format of the backing document, declared or sniffed
    pub fn format(&self) -> Option<DocumentFormat> {
        self.format
            .or_else(|| self.data.as_deref().and_then(DocumentFormat::sniff))
    }

    fn parsed(&self) -> Option<&Result<Graph, ParseError>> {
        let data = self.data.as_deref();
        match self.graph.get() {
            Some(result) => Some(result),
            None => data.map(|data| self.graph.get_or_init(|| parse_data(data, self.format))),
        }
    }

    /// The annotation graph, or why there is none
    pub fn try_graph(&self) -> Result<&Graph, AnnotationError> {
        match self.parsed() {
            Some(Ok(graph)) => Ok(graph),
            Some(Err(e)) => Err(AnnotationError::Parse(e.clone())),
            None => Err(AnnotationError::NoGraph),
        }
    }

    /// The annotation graph; `None` when the data is missing or invalid
    pub fn graph(&self) -> Option<&Graph> {
        self.try_graph().ok()
    }

    pub fn is_valid(&self) -> bool {
        self.graph().is_some()
    }

    /// IRI of the `oa:Annotation` class the annotation is typed with
    pub fn annotation_type(&self) -> Result<&str, AnnotationError> {
        let graph = self.try_graph()?;
        let rdf_type = Term::iri(rdf::TYPE);
        let class = Term::iri(oa::ANNOTATION);
        graph
            .find_triples(None, Some(&rdf_type), Some(&class))
            .into_iter()
            .find_map(|triple| triple.object.as_iri())
            .ok_or(AnnotationError::MissingType)
    }

    /// The annotation's own IRI, if the document declared one
    pub fn url(&self) -> Option<&str> {
        self.root().and_then(Term::as_iri)
    }

    /// Subject typed `oa:Annotation`. A subject that only resolved against the
    /// placeholder document base counts as undeclared.
    fn root(&self) -> Option<&Term> {
        let graph = self.graph()?;
        graph
            .subjects(rdf::TYPE, &Term::iri(oa::ANNOTATION))
            .into_iter()
            .find(|subject| match subject {
                Term::Iri(iri) => !iri.starts_with(DOCUMENT_BASE),
                _ => false,
            })
    }

    /// All `oa:motivatedBy` values
    pub fn motivated_by(&self) -> BTreeSet<String> {
        self.objects(oa::MOTIVATED_BY)
            .into_iter()
            .map(Term::value_string)
            .collect()
    }

    /// All `oa:hasTarget` values in string form
    pub fn has_target(&self) -> BTreeSet<String> {
        self.target_terms().into_iter().map(Term::value_string).collect()
    }

    /// The raw `oa:hasTarget` objects
    pub fn target_terms(&self) -> Vec<&Term> {
        self.objects(oa::HAS_TARGET)
    }

    /// Text of every `oa:hasBody` that is an inline `cnt:ContentAsText` node.
    ///
    /// Bodies of other kinds are not represented here.
    pub fn has_body(&self) -> BTreeSet<String> {
        let Some(graph) = self.graph() else {
            return BTreeSet::new();
        };

        let mut bodies = BTreeSet::new();
        for body in graph.objects(None, oa::HAS_BODY) {
            if !body.is_blank_node() || !graph.has_type(body, cnt::CONTENT_AS_TEXT) {
                debug!("Skipping non-text body {}", body);
                continue;
            }
            let closure = graph.subject_closure(body);
            for chars in closure.objects(Some(body), cnt::CHARS) {
                if let Some(literal) = chars.as_literal() {
                    bodies.insert(literal.lexical.clone());
                }
            }
        }
        bodies
    }

    /// Union of the subgraphs hanging off every `oa:hasBody` object
    pub fn bodies_graph(&self) -> Graph {
        self.descendants_of(oa::HAS_BODY)
    }

    /// Union of the subgraphs hanging off every `oa:hasTarget` object
    pub fn targets_graph(&self) -> Graph {
        self.descendants_of(oa::HAS_TARGET)
    }

    /// Serialize the graph as Turtle
    pub fn to_turtle(&self) -> Result<String, AnnotationError> {
        let graph = self.try_graph()?;
        Ok(codec::graph_to_turtle(graph)?)
    }

    fn objects(&self, predicate: &str) -> Vec<&Term> {
        self.graph()
            .map(|graph| graph.objects(None, predicate))
            .unwrap_or_default()
    }

    fn descendants_of(&self, predicate: &str) -> Graph {
        let mut result = Graph::new();
        if let Some(graph) = self.graph() {
            for object in graph.objects(None, predicate) {
                result.union(&graph.subject_closure(object));
            }
        }
        result
    }
}

fn parse_data(data: &str, format: Option<DocumentFormat>) -> Result<Graph, ParseError> {
    let trimmed = data.trim();
    if trimmed.chars().count() < MIN_DATA_LEN {
        return Err(ParseError::TooShort {
            minimum: MIN_DATA_LEN,
        });
    }

    let format = format
        .or_else(|| DocumentFormat::sniff(trimmed))
        .ok_or(ParseError::UnrecognizedFormat)?;
    let graph = codec::parse_document(trimmed, format, Some(DOCUMENT_BASE))?;
    if graph.is_empty() {
        return Err(ParseError::EmptyGraph);
    }
    Ok(graph)
}

impl From<Graph> for Annotation {
    fn from(graph: Graph) -> Self {
        Annotation::from_graph(None, graph)
    }
}
