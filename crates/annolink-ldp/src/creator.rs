//! Decompose an annotation into an LDP container tree
//!
//! Resources are created strictly in order: root, body container, bodies,
//! target container, targets. Creation is not atomic; a failure reports how
//! far it got through [`PartialCreateError`], and [`LdpCreator::resume`]
//! continues from that point.
//!
//! An IRI target is stored as a text resource pointing at it through the
//! external reference predicate. A blank node target (a specific resource)
//! is stored as its own description, with the node itself becoming the new
//! resource.

use crate::call::CallContext;
use crate::transport::LdpTransport;
use crate::{resource_id, LdpError, LdpResult};
use annolink_core::codec;
use annolink_core::model::{Literal, Term, Triple};
use annolink_core::vocab::{cnt, dc, dctypes, deployment, ldp, oa, rdf};
use annolink_core::{Annotation, AnnotationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info};

/// Slug of the body container below the root
pub const BODY_SLUG: &str = "b";
/// Slug of the target container below the root
pub const TARGET_SLUG: &str = "t";

/// Resources created so far, as paths relative to the LDP base
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProgress {
    pub root_id: Option<String>,
    pub body_container: Option<String>,
    pub bodies: Vec<String>,
    pub target_container: Option<String>,
    pub targets: Vec<String>,
}

impl CreateProgress {
    /// Every created path in creation order
    pub fn created_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        paths.extend(self.root_id.iter().cloned());
        paths.extend(self.body_container.iter().cloned());
        paths.extend(self.bodies.iter().cloned());
        paths.extend(self.target_container.iter().cloned());
        paths.extend(self.targets.iter().cloned());
        paths
    }

    pub fn is_empty(&self) -> bool {
        self.root_id.is_none()
    }
}

/// Step of the create sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreateStep {
    Validate,
    Root,
    BodyContainer,
    Body(usize),
    TargetContainer,
    Target(usize),
}

impl fmt::Display for CreateStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreateStep::Validate => write!(f, "validation"),
            CreateStep::Root => write!(f, "root resource"),
            CreateStep::BodyContainer => write!(f, "body container"),
            CreateStep::Body(index) => write!(f, "body #{}", index),
            CreateStep::TargetContainer => write!(f, "target container"),
            CreateStep::Target(index) => write!(f, "target #{}", index),
        }
    }
}

/// Create stopped part way; `progress` lists what exists on the server
#[derive(Debug, thiserror::Error)]
#[error("Annotation create failed at {step}: {source}")]
pub struct PartialCreateError {
    pub progress: CreateProgress,
    pub step: CreateStep,
    pub source: Box<LdpError>,
}

impl PartialCreateError {
    fn new(progress: &CreateProgress, step: CreateStep, source: LdpError) -> Self {
        Self {
            progress: progress.clone(),
            step,
            source: Box::new(source),
        }
    }

    /// Paths left behind on the server
    pub fn created_paths(&self) -> Vec<String> {
        self.progress.created_paths()
    }

    pub fn root_id(&self) -> Option<&str> {
        self.progress.root_id.as_deref()
    }
}

/// What a target resource is created from
#[derive(Debug, Clone, PartialEq, Eq)]
enum TargetContent {
    Reference(String),
    Description(Vec<Triple>),
}

/// Writes one annotation to the LDP server
pub struct LdpCreator<'a, T: ?Sized> {
    transport: &'a T,
    annotation: &'a Annotation,
    external_reference: String,
}

impl<'a, T: LdpTransport + ?Sized> LdpCreator<'a, T> {
    pub fn new(transport: &'a T, annotation: &'a Annotation) -> Self {
        Self {
            transport,
            annotation,
            external_reference: deployment::EXTERNAL_REFERENCE.to_string(),
        }
    }

    pub fn with_external_reference(mut self, predicate: &str) -> Self {
        self.external_reference = predicate.to_string();
        self
    }

    /// Create the full container tree and return the root id
    pub async fn create(&self, cx: &CallContext) -> Result<String, PartialCreateError> {
        self.resume(CreateProgress::default(), cx).await
    }

    /// Continue a create from `progress`, skipping resources that exist
    pub async fn resume(&self, mut progress: CreateProgress, cx: &CallContext) -> Result<String, PartialCreateError> {
        let (motivations, bodies, targets) = self
            .contents()
            .map_err(|e| PartialCreateError::new(&progress, CreateStep::Validate, e))?;

        let root_id = match progress.root_id.clone() {
            Some(root_id) => root_id,
            None => {
                let root_id = self
                    .create_root(&motivations, cx)
                    .await
                    .map_err(|e| PartialCreateError::new(&progress, CreateStep::Root, e))?;
                progress.root_id = Some(root_id.clone());
                root_id
            }
        };
        let root_url = self.transport.resource_url(&root_id);

        if progress.body_container.is_none() {
            let path = self
                .create_container(&root_id, &root_url, oa::HAS_BODY, BODY_SLUG, cx)
                .await
                .map_err(|e| PartialCreateError::new(&progress, CreateStep::BodyContainer, e))?;
            progress.body_container = Some(path);
        }
        let body_container = progress.body_container.clone().unwrap_or_default();
        for (index, chars) in bodies.iter().enumerate().skip(progress.bodies.len()) {
            let path = self
                .create_body(&body_container, chars, cx)
                .await
                .map_err(|e| PartialCreateError::new(&progress, CreateStep::Body(index), e))?;
            progress.bodies.push(path);
        }

        if progress.target_container.is_none() {
            let path = self
                .create_container(&root_id, &root_url, oa::HAS_TARGET, TARGET_SLUG, cx)
                .await
                .map_err(|e| PartialCreateError::new(&progress, CreateStep::TargetContainer, e))?;
            progress.target_container = Some(path);
        }
        let target_container = progress.target_container.clone().unwrap_or_default();
        for (index, target) in targets.iter().enumerate().skip(progress.targets.len()) {
            let path = self
                .create_target(&target_container, target, cx)
                .await
                .map_err(|e| PartialCreateError::new(&progress, CreateStep::Target(index), e))?;
            progress.targets.push(path);
        }

        info!(
            "Created annotation {} ({} bodies, {} targets)",
            root_id,
            progress.bodies.len(),
            progress.targets.len()
        );
        Ok(root_id)
    }

    /// Motivations, text bodies and targets, in a stable order.
    ///
    /// IRI targets come first, sorted, followed by described targets in
    /// graph order.
    fn contents(&self) -> LdpResult<(Vec<Term>, Vec<String>, Vec<TargetContent>)> {
        let graph = self.annotation.try_graph()?;
        self.annotation.annotation_type()?;

        let mut motivations = BTreeSet::new();
        for motivation in graph.objects(None, oa::MOTIVATED_BY) {
            if motivation.is_blank_node() {
                return Err(unsupported("motivation", motivation));
            }
            motivations.insert(motivation.clone());
        }

        let bodies: Vec<String> = self.annotation.has_body().into_iter().collect();

        let mut references = BTreeSet::new();
        let mut described = Vec::new();
        for target in self.annotation.target_terms() {
            match target {
                Term::Iri(iri) => {
                    references.insert(iri.clone());
                }
                Term::BlankNode(_) => {
                    let closure = graph.subject_closure(target);
                    if closure.is_empty() {
                        return Err(unsupported("target", target));
                    }
                    let this = Term::iri("");
                    let relabel = |term: &Term| if term == target { this.clone() } else { term.clone() };
                    let triples = closure
                        .iter()
                        .map(|triple| Triple::new(relabel(&triple.subject), triple.predicate.clone(), relabel(&triple.object)))
                        .collect();
                    debug!("Target {} is described by {} statements", target, closure.len());
                    described.push(TargetContent::Description(triples));
                }
                Term::Literal(_) => return Err(unsupported("target", target)),
            }
        }

        let mut targets: Vec<TargetContent> = references.into_iter().map(TargetContent::Reference).collect();
        targets.extend(described);
        if targets.is_empty() {
            return Err(AnnotationError::MissingTarget.into());
        }

        Ok((motivations.into_iter().collect(), bodies, targets))
    }

    async fn post(&self, path: &str, triples: &[Triple], slug: Option<&str>, cx: &CallContext) -> LdpResult<String> {
        let turtle = codec::to_turtle(triples)?;
        let location = self.transport.post_turtle(path, turtle, slug, cx).await?;
        Ok(location)
    }

    async fn create_root(&self, motivations: &[Term], cx: &CallContext) -> LdpResult<String> {
        let this = Term::iri("");
        let mut triples = vec![Triple::with_predicate(this.clone(), rdf::TYPE, Term::iri(oa::ANNOTATION))];
        triples.extend(
            motivations
                .iter()
                .map(|motivation| Triple::with_predicate(this.clone(), oa::MOTIVATED_BY, motivation.clone())),
        );

        let location = self.post("", &triples, None, cx).await?;
        let root_id = resource_id(&location).to_string();
        info!("Created annotation root {}", root_id);
        Ok(root_id)
    }

    async fn create_container(
        &self,
        root_id: &str,
        root_url: &str,
        member_relation: &str,
        slug: &str,
        cx: &CallContext,
    ) -> LdpResult<String> {
        let this = Term::iri("");
        let triples = [
            Triple::with_predicate(this.clone(), rdf::TYPE, Term::iri(ldp::DIRECT_CONTAINER)),
            Triple::with_predicate(this.clone(), ldp::HAS_MEMBER_RELATION, Term::iri(member_relation)),
            Triple::with_predicate(this, ldp::MEMBERSHIP_RESOURCE, Term::iri(root_url)),
        ];

        let location = self.post(root_id, &triples, Some(slug), cx).await?;
        Ok(self.path_of(&location, || format!("{}/{}", root_id, slug)))
    }

    async fn create_body(&self, container: &str, chars: &str, cx: &CallContext) -> LdpResult<String> {
        let this = Term::iri("");
        let triples = [
            Triple::with_predicate(this.clone(), rdf::TYPE, Term::iri(cnt::CONTENT_AS_TEXT)),
            Triple::with_predicate(this.clone(), rdf::TYPE, Term::iri(dctypes::TEXT)),
            Triple::with_predicate(this, cnt::CHARS, Term::Literal(Literal::string(chars))),
        ];

        let location = self.post(container, &triples, None, cx).await?;
        Ok(self.path_of(&location, || format!("{}/{}", container, resource_id(&location))))
    }

    async fn create_target(&self, container: &str, target: &TargetContent, cx: &CallContext) -> LdpResult<String> {
        let triples = match target {
            TargetContent::Reference(iri) => {
                let this = Term::iri("");
                vec![
                    Triple::with_predicate(this.clone(), rdf::TYPE, Term::iri(dctypes::TEXT)),
                    Triple::with_predicate(this.clone(), dc::FORMAT, Term::literal("text/html")),
                    Triple::with_predicate(this, self.external_reference.as_str(), Term::iri(iri.as_str())),
                ]
            }
            TargetContent::Description(triples) => triples.clone(),
        };

        let location = self.post(container, &triples, None, cx).await?;
        Ok(self.path_of(&location, || format!("{}/{}", container, resource_id(&location))))
    }

    fn path_of<F: FnOnce() -> String>(&self, location: &str, fallback: F) -> String {
        self.transport.relative_path(location).unwrap_or_else(fallback)
    }
}

fn unsupported(role: &'static str, term: &Term) -> LdpError {
    LdpError::UnsupportedTerm {
        role,
        term: term.to_string(),
    }
}
