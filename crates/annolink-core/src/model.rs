//! RDF term and triple models

use crate::vocab::{rdf, xsd};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Literal value with its datatype and optional language tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal {
    pub lexical: String,
    pub datatype: String,
    pub language: Option<String>,
}

impl Literal {
    /// Plain `xsd:string` literal
    pub fn string<S: Into<String>>(lexical: S) -> Self {
        Self::typed(lexical, xsd::STRING)
    }

    pub fn typed<S: Into<String>, D: Into<String>>(lexical: S, datatype: D) -> Self {
        Literal {
            lexical: lexical.into(),
            datatype: datatype.into(),
            language: None,
        }
    }

    /// Language-tagged literal (`rdf:langString`)
    pub fn lang<S: Into<String>, L: Into<String>>(lexical: S, language: L) -> Self {
        Literal {
            lexical: lexical.into(),
            datatype: rdf::LANG_STRING.to_string(),
            language: Some(language.into()),
        }
    }
}

/// RDF term: the node kinds a statement can carry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Term {
    Iri(String),
    /// Blank node label, scoped to the graph it was parsed into
    BlankNode(String),
    Literal(Literal),
}

impl Term {
    pub fn iri<S: Into<String>>(iri: S) -> Self {
        Term::Iri(iri.into())
    }

    pub fn blank<S: Into<String>>(id: S) -> Self {
        Term::BlankNode(id.into())
    }

    /// `xsd:string` literal term
    pub fn literal<S: Into<String>>(lexical: S) -> Self {
        Term::Literal(Literal::string(lexical))
    }

    /// The IRI when this term is one
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    pub fn as_blank_node(&self) -> Option<&str> {
        match self {
            Term::BlankNode(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    pub fn is_iri(&self) -> bool {
        matches!(self, Term::Iri(_))
    }

    pub fn is_blank_node(&self) -> bool {
        matches!(self, Term::BlankNode(_))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal(_))
    }

    /// IRIs and blank nodes can appear in subject position
    pub fn is_resource(&self) -> bool {
        !self.is_literal()
    }

    /// String form of the term value: the IRI, `_:label`, or the lexical form
    pub fn value_string(&self) -> String {
        match self {
            Term::Iri(iri) => iri.clone(),
            Term::BlankNode(id) => format!("_:{}", id),
            Term::Literal(literal) => literal.lexical.clone(),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::BlankNode(id) => write!(f, "_:{}", id),
            Term::Literal(literal) => {
                f.write_str("\"")?;
                write_escaped(f, &literal.lexical)?;
                f.write_str("\"")?;
                match &literal.language {
                    Some(language) => write!(f, "@{}", language),
                    None if literal.datatype == xsd::STRING => Ok(()),
                    None => write!(f, "^^<{}>", literal.datatype),
                }
            }
        }
    }
}

/// N-Triples string escaping: ECHAR for the usual controls, UCHAR for the rest
fn write_escaped(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    for c in value.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            '\u{8}' => f.write_str("\\b")?,
            '\u{c}' => f.write_str("\\f")?,
            c if c.is_control() => write!(f, "\\u{:04X}", c as u32)?,
            c => write!(f, "{}", c)?,
        }
    }
    Ok(())
}

impl From<Literal> for Term {
    fn from(literal: Literal) -> Self {
        Term::Literal(literal)
    }
}

/// RDF Triple representation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Triple {
            subject,
            predicate,
            object,
        }
    }

    /// Shorthand for a triple whose predicate is an IRI string
    pub fn with_predicate<P: Into<String>>(subject: Term, predicate: P, object: Term) -> Self {
        Triple::new(subject, Term::Iri(predicate.into()), object)
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}
