//! Format codecs: JSON-LD, Turtle and RDF/XML in, Turtle out
//!
//! Parsing goes through sophia's parsers and converts every statement into
//! the crate's own [`Term`] model. Writing goes through sophia's Turtle
//! serializer so literals are always escaped by the writer.

use crate::context::inline_oa_context;
use crate::error::{ParseError, SerializeError};
use crate::graph::Graph;
use crate::model::{Literal, Term, Triple};
use crate::vocab::xsd;
use serde::{Deserialize, Serialize};
use sophia::api::parser::TripleParser;
use sophia::api::quad::Quad as _;
use sophia::api::serializer::{Stringifier, TripleSerializer};
use sophia::api::source::{QuadSource, TripleSource};
use sophia::api::term::{BnodeId, IriRef, LanguageTag, SimpleTerm, Term as SophiaTerm, TermKind};
use sophia::api::triple::Triple as _;
use sophia::iri::Iri;
use sophia::jsonld::JsonLdParser;
use sophia::turtle::parser::turtle::TurtleParser;
use sophia::turtle::serializer::turtle::TurtleSerializer;
use sophia::xml::parser::RdfXmlParser;
use std::fmt;
use tracing::debug;

/// Base IRI used to resolve relative references (`<>`) in client documents
pub const DOCUMENT_BASE: &str = "urn:annolink:document";

/// Serialization formats accepted for annotation documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentFormat {
    JsonLd,
    Turtle,
    RdfXml,
}

impl DocumentFormat {
    /// Guess the format from the shape of the payload.
    ///
    /// `{ ... }` is JSON-LD, anything ending in `.` is Turtle and `< ... >` is
    /// RDF/XML, checked in that order on the trimmed text.
    pub fn sniff(data: &str) -> Option<Self> {
        let data = data.trim();
        if data.starts_with('{') && data.ends_with('}') {
            Some(DocumentFormat::JsonLd)
        } else if data.ends_with('.') {
            Some(DocumentFormat::Turtle)
        } else if data.starts_with('<') && data.ends_with('>') {
            Some(DocumentFormat::RdfXml)
        } else {
            None
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            DocumentFormat::JsonLd => "application/ld+json",
            DocumentFormat::Turtle => "text/turtle",
            DocumentFormat::RdfXml => "application/rdf+xml",
        }
    }

    /// Map a `Content-Type` value (parameters ignored) to a format
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let essence = media_type.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "application/ld+json" | "application/json" => Some(DocumentFormat::JsonLd),
            "text/turtle" | "application/x-turtle" => Some(DocumentFormat::Turtle),
            "application/rdf+xml" | "application/xml" | "text/xml" => Some(DocumentFormat::RdfXml),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentFormat::JsonLd => "JSON-LD",
            DocumentFormat::Turtle => "Turtle",
            DocumentFormat::RdfXml => "RDF/XML",
        };
        f.write_str(name)
    }
}

/// Parse `data` in the given format into a graph
pub fn parse_document(
    data: &str,
    format: DocumentFormat,
    base: Option<&str>,
) -> Result<Graph, ParseError> {
    match format {
        DocumentFormat::JsonLd => parse_json_ld(data),
        DocumentFormat::Turtle => parse_turtle(data, base),
        DocumentFormat::RdfXml => parse_rdf_xml(data, base),
    }
}

/// Parse Turtle, resolving relative IRIs against `base`
pub fn parse_turtle(data: &str, base: Option<&str>) -> Result<Graph, ParseError> {
    let parser = TurtleParser {
        base: base_iri(base)?,
    };
    let mut source = parser.parse_str(data);

    let format = DocumentFormat::Turtle;
    let mut graph = Graph::new();
    let mut unsupported = None;
    source
        .for_each_triple(|t| match convert_triple(t.s(), t.p(), t.o()) {
            Ok(triple) => {
                graph.insert(triple);
            }
            Err(term) => {
                unsupported.get_or_insert(term);
            }
        })
        .map_err(|e| ParseError::syntax(format, e))?;

    finish(graph, format, unsupported)
}

/// Parse RDF/XML, resolving relative IRIs against `base`
pub fn parse_rdf_xml(data: &str, base: Option<&str>) -> Result<Graph, ParseError> {
    let parser = RdfXmlParser {
        base: base_iri(base)?,
    };
    let mut source = parser.parse_str(data);

    let format = DocumentFormat::RdfXml;
    let mut graph = Graph::new();
    let mut unsupported = None;
    source
        .for_each_triple(|t| match convert_triple(t.s(), t.p(), t.o()) {
            Ok(triple) => {
                graph.insert(triple);
            }
            Err(term) => {
                unsupported.get_or_insert(term);
            }
        })
        .map_err(|e| ParseError::syntax(format, e))?;

    finish(graph, format, unsupported)
}

/// Parse JSON-LD. Named graphs are flattened into the result.
///
/// Expansion runs on a local executor so this is safe to call from inside
/// an async runtime; the embedded context means no loader I/O is awaited.
pub fn parse_json_ld(data: &str) -> Result<Graph, ParseError> {
    let mut document: serde_json::Value =
        serde_json::from_str(data).map_err(|e| ParseError::Json(e.to_string()))?;
    if inline_oa_context(&mut document) {
        debug!("Replaced OA context URL with embedded context");
    }
    let text = document.to_string();

    let parser = JsonLdParser::new();
    let mut source = futures::executor::block_on(parser.async_parse_str(&text));

    let format = DocumentFormat::JsonLd;
    let mut graph = Graph::new();
    let mut unsupported = None;
    source
        .for_each_quad(|q| match convert_triple(q.s(), q.p(), q.o()) {
            Ok(triple) => {
                graph.insert(triple);
            }
            Err(term) => {
                unsupported.get_or_insert(term);
            }
        })
        .map_err(|e| ParseError::syntax(format, e))?;

    finish(graph, format, unsupported)
}

fn finish(graph: Graph, format: DocumentFormat, unsupported: Option<String>) -> Result<Graph, ParseError> {
    match unsupported {
        Some(term) => Err(ParseError::UnsupportedTerm { format, term }),
        None => {
            debug!("Parsed {} statements from {} document", graph.len(), format);
            Ok(graph)
        }
    }
}

fn base_iri(base: Option<&str>) -> Result<Option<Iri<String>>, ParseError> {
    base.map(|base| {
        Iri::new(base.to_string()).map_err(|e| ParseError::InvalidBase {
            base: base.to_string(),
            message: e.to_string(),
        })
    })
    .transpose()
}

fn convert_triple<S, P, O>(subject: S, predicate: P, object: O) -> Result<Triple, String>
where
    S: SophiaTerm,
    P: SophiaTerm,
    O: SophiaTerm,
{
    Ok(Triple::new(
        convert_term(subject)?,
        convert_term(predicate)?,
        convert_term(object)?,
    ))
}

/// Convert a sophia term; quoted triples and variables are reported back
/// as their kind name.
fn convert_term<T: SophiaTerm>(term: T) -> Result<Term, String> {
    let kind = term.kind();
    let converted = match kind {
        TermKind::Iri => term.iri().map(|iri| Term::Iri(iri.as_str().to_string())),
        TermKind::BlankNode => term.bnode_id().map(|id| Term::BlankNode(id.as_str().to_string())),
        TermKind::Literal => term.lexical_form().map(|lexical| {
            let lexical = (*lexical).to_owned();
            match term.language_tag() {
                Some(tag) => Term::Literal(Literal::lang(lexical, tag.as_str())),
                None => {
                    let datatype = term
                        .datatype()
                        .map(|datatype| datatype.as_str().to_string())
                        .unwrap_or_else(|| xsd::STRING.to_string());
                    Term::Literal(Literal::typed(lexical, datatype))
                }
            }
        }),
        _ => None,
    };
    converted.ok_or_else(|| format!("{:?}", kind))
}

fn to_sophia(term: &Term) -> SimpleTerm<'_> {
    match term {
        Term::Iri(iri) => SimpleTerm::Iri(IriRef::new_unchecked(iri.as_str().into())),
        Term::BlankNode(id) => SimpleTerm::BlankNode(BnodeId::new_unchecked(id.as_str().into())),
        Term::Literal(Literal {
            lexical,
            language: Some(language),
            ..
        }) => SimpleTerm::LiteralLanguage(
            lexical.as_str().into(),
            LanguageTag::new_unchecked(language.as_str().into()),
        ),
        Term::Literal(Literal {
            lexical, datatype, ..
        }) => SimpleTerm::LiteralDatatype(
            lexical.as_str().into(),
            IriRef::new_unchecked(datatype.as_str().into()),
        ),
    }
}

/// Write triples as Turtle. Output is sorted so equal sets serialize
/// identically.
pub fn to_turtle<'a, I>(triples: I) -> Result<String, SerializeError>
where
    I: IntoIterator<Item = &'a Triple>,
{
    let mut sorted: Vec<&Triple> = triples.into_iter().collect();
    sorted.sort();

    let terms: Vec<[SimpleTerm<'_>; 3]> = sorted
        .iter()
        .map(|triple| {
            [
                to_sophia(&triple.subject),
                to_sophia(&triple.predicate),
                to_sophia(&triple.object),
            ]
        })
        .collect();

    let mut serializer = TurtleSerializer::new_stringifier();
    serializer
        .serialize_graph(&terms)
        .map_err(|e| SerializeError(e.to_string()))?;
    Ok(serializer.as_str().to_string())
}

/// Write a whole graph as Turtle
pub fn graph_to_turtle(graph: &Graph) -> Result<String, SerializeError> {
    to_turtle(graph.iter())
}
