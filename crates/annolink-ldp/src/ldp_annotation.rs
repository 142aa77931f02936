//! Annotation as stored on the LDP server, and its mapping back to OA

use crate::{LdpError, LdpResult};
use annolink_core::codec;
use annolink_core::model::{Term, Triple};
use annolink_core::vocab::{cnt, dctypes, oa, rdf, repository};
use annolink_core::{Annotation, Graph};
use tracing::debug;

/// Merged graph of a root resource and its body and target resources
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LdpAnnotation {
    graph: Graph,
}

impl LdpAnnotation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }

    /// Parse a Turtle payload fetched from `base` and merge it in
    pub fn load_data_into_graph(&mut self, turtle: &str, base: &str) -> LdpResult<()> {
        let parsed = codec::parse_turtle(turtle, Some(base))?;
        debug!("Merging {} statements from {}", parsed.len(), base);
        self.graph.merge(parsed);
        Ok(())
    }

    /// The resource typed `oa:Annotation`
    pub fn root_uri(&self) -> Option<&str> {
        self.graph
            .subjects(rdf::TYPE, &Term::iri(oa::ANNOTATION))
            .into_iter()
            .find_map(Term::as_iri)
    }

    /// Body resources hung off the root by the body container
    pub fn body_uris(&self) -> Vec<&str> {
        self.root_objects(oa::HAS_BODY)
    }

    pub fn target_uris(&self) -> Vec<&str> {
        self.root_objects(oa::HAS_TARGET)
    }

    fn root_objects(&self, predicate: &str) -> Vec<&str> {
        let Some(root) = self.root_uri() else {
            return Vec::new();
        };
        self.graph
            .objects(Some(&Term::iri(root)), predicate)
            .into_iter()
            .filter_map(Term::as_iri)
            .collect()
    }

    /// Rebuild the plain Open Annotation graph.
    ///
    /// Text body resources become blank nodes with their types and
    /// `cnt:chars`. A target resource is replaced by the resource its
    /// `external_reference` statement points at; a target stored as its own
    /// description (a specific resource) becomes a blank node carrying that
    /// description again. Root and body classes outside the annotation
    /// vocabularies are dropped, and server-managed statements never appear.
    pub fn to_oa(&self, id: Option<String>, external_reference: &str) -> LdpResult<Annotation> {
        let root_uri = self
            .root_uri()
            .ok_or(LdpError::Annotation(annolink_core::AnnotationError::MissingType))?;
        let root = Term::iri(root_uri);
        let mut graph = Graph::new();

        for class in self.graph.objects(Some(&root), rdf::TYPE) {
            if is_annotation_class(class) {
                graph.insert(Triple::with_predicate(root.clone(), rdf::TYPE, class.clone()));
            }
        }
        for motivation in self.graph.objects(Some(&root), oa::MOTIVATED_BY) {
            graph.insert(Triple::with_predicate(root.clone(), oa::MOTIVATED_BY, motivation.clone()));
        }

        for (index, body_uri) in self.body_uris().into_iter().enumerate() {
            let body = Term::iri(body_uri);
            if !self.graph.has_type(&body, cnt::CONTENT_AS_TEXT) {
                graph.insert(Triple::with_predicate(root.clone(), oa::HAS_BODY, body));
                continue;
            }

            let node = Term::blank(format!("body{}", index));
            graph.insert(Triple::with_predicate(root.clone(), oa::HAS_BODY, node.clone()));
            for class in self.graph.objects(Some(&body), rdf::TYPE) {
                if is_annotation_class(class) {
                    graph.insert(Triple::with_predicate(node.clone(), rdf::TYPE, class.clone()));
                }
            }
            for chars in self.graph.objects(Some(&body), cnt::CHARS) {
                graph.insert(Triple::with_predicate(node.clone(), cnt::CHARS, chars.clone()));
            }
        }

        let described: Graph = self
            .graph
            .iter()
            .filter(|triple| !is_server_managed(triple))
            .cloned()
            .collect();
        for (index, target_uri) in self.target_uris().into_iter().enumerate() {
            let target = Term::iri(target_uri);
            let references = self.graph.objects(Some(&target), external_reference);
            if !references.is_empty() {
                for reference in references {
                    graph.insert(Triple::with_predicate(root.clone(), oa::HAS_TARGET, reference.clone()));
                }
                continue;
            }

            let description = described.subject_closure(&target);
            if description.is_empty() {
                graph.insert(Triple::with_predicate(root.clone(), oa::HAS_TARGET, target));
                continue;
            }

            let node = Term::blank(format!("target{}", index));
            graph.insert(Triple::with_predicate(root.clone(), oa::HAS_TARGET, node.clone()));
            let relabel = |term: &Term| if *term == target { node.clone() } else { term.clone() };
            for triple in description.iter() {
                graph.insert(Triple::new(
                    relabel(&triple.subject),
                    triple.predicate.clone(),
                    relabel(&triple.object),
                ));
            }
        }

        Ok(Annotation::from_graph(id, graph))
    }
}

fn in_namespaces(term: &Term, namespaces: &[&str]) -> bool {
    term.as_iri()
        .map(|iri| namespaces.iter().any(|ns| iri.starts_with(ns)))
        .unwrap_or(false)
}

fn is_annotation_class(term: &Term) -> bool {
    in_namespaces(term, &[oa::NS, cnt::NS, dctypes::NS])
}

/// LDP or repository bookkeeping rather than annotation content
fn is_server_managed(triple: &Triple) -> bool {
    if in_namespaces(&triple.predicate, repository::NAMESPACES) {
        return true;
    }
    triple.predicate == Term::iri(rdf::TYPE) && in_namespaces(&triple.object, repository::NAMESPACES)
}
