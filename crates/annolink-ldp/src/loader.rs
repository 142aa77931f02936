//! Reassemble annotations from the LDP server

use crate::call::CallContext;
use crate::ldp_annotation::LdpAnnotation;
use crate::transport::LdpTransport;
use crate::{resource_id, LdpError, LdpResult};
use annolink_core::codec;
use annolink_core::model::Term;
use annolink_core::vocab::{deployment, ldp};
use annolink_core::Annotation;
use futures::future::try_join_all;
use tracing::{debug, info};

/// Reads annotations back from the LDP server
pub struct LdpLoader<'a, T: ?Sized> {
    transport: &'a T,
    external_reference: String,
}

impl<'a, T: LdpTransport + ?Sized> LdpLoader<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self {
            transport,
            external_reference: deployment::EXTERNAL_REFERENCE.to_string(),
        }
    }

    pub fn with_external_reference(mut self, predicate: &str) -> Self {
        self.external_reference = predicate.to_string();
        self
    }

    /// Load the annotation stored under `id`, mapped back to Open Annotation
    pub async fn load(&self, id: &str, cx: &CallContext) -> LdpResult<Annotation> {
        let stored = self.load_ldp(id, cx).await?;
        stored.to_oa(Some(id.to_string()), &self.external_reference)
    }

    /// Fetch root, body and target resources and merge them as stored
    pub async fn load_ldp(&self, id: &str, cx: &CallContext) -> LdpResult<LdpAnnotation> {
        let mut stored = LdpAnnotation::new();
        self.load_resource(&mut stored, id, cx).await?;

        let bodies = self.owned_paths(stored.body_uris())?;
        let targets = self.owned_paths(stored.target_uris())?;
        if targets.is_empty() {
            return Err(LdpError::MissingTarget { root: id.to_string() });
        }

        for path in bodies.iter().chain(targets.iter()) {
            self.load_resource(&mut stored, path, cx).await?;
        }

        info!(
            "Loaded annotation {} ({} bodies, {} targets, {} statements)",
            id,
            bodies.len(),
            targets.len(),
            stored.graph().len()
        );
        Ok(stored)
    }

    /// Load several annotations concurrently; the first failure aborts all
    pub async fn load_many(&self, ids: &[String], cx: &CallContext) -> LdpResult<Vec<Annotation>> {
        try_join_all(ids.iter().map(|id| self.load(id, cx))).await
    }

    /// One id-only stub per resource in the root container
    pub async fn find_all(&self, cx: &CallContext) -> LdpResult<Vec<Annotation>> {
        let base = self.transport.base_url().trim_end_matches('/');
        let turtle = self.transport.get_turtle("", cx).await?;
        let graph = codec::parse_turtle(&turtle, Some(base))?;

        let root = Term::iri(base);
        let root_with_slash = Term::iri(format!("{}/", base));
        let stubs: Vec<Annotation> = graph
            .objects(Some(&root), ldp::CONTAINS)
            .into_iter()
            .chain(graph.objects(Some(&root_with_slash), ldp::CONTAINS))
            .filter_map(Term::as_iri)
            .map(|uri| Annotation::with_id(resource_id(uri)))
            .collect();

        debug!("Found {} annotations under {}", stubs.len(), base);
        Ok(stubs)
    }

    async fn load_resource(&self, stored: &mut LdpAnnotation, path: &str, cx: &CallContext) -> LdpResult<()> {
        let turtle = self.transport.get_turtle(path, cx).await?;
        stored.load_data_into_graph(&turtle, &self.transport.resource_url(path))
    }

    fn owned_paths(&self, uris: Vec<&str>) -> LdpResult<Vec<String>> {
        uris.into_iter()
            .map(|uri| {
                self.transport
                    .relative_path(uri)
                    .ok_or_else(|| LdpError::ForeignResource {
                        uri: uri.to_string(),
                        base: self.transport.base_url().to_string(),
                    })
            })
            .collect()
    }
}
