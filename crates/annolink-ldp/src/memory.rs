//! In-process LDP server
//!
//! Keeps every resource as a [`Graph`] keyed by its path below the base URL.
//! POST resolves `<>` in the payload to the new resource, records
//! `ldp:contains` on the parent and, when the parent is a
//! `ldp:DirectContainer`, adds the membership triple to the membership
//! resource. This is the behaviour annotation create/load relies on.

use crate::call::CallContext;
use crate::transport::{join_url, LdpTransport, TransportError};
use annolink_core::codec;
use annolink_core::model::{Term, Triple};
use annolink_core::vocab::{ldp, rdf};
use annolink_core::Graph;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Default)]
struct MemoryState {
    resources: BTreeMap<String, Graph>,
    posts: usize,
    fail_at: Option<usize>,
}

/// LDP server held in memory
#[derive(Debug)]
pub struct MemoryLdp {
    base_url: String,
    state: RwLock<MemoryState>,
}

impl MemoryLdp {
    /// Server with an empty `ldp:BasicContainer` at `base_url`
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        let root = Term::iri(base_url.as_str());
        let mut graph = Graph::new();
        graph.insert(Triple::with_predicate(root.clone(), rdf::TYPE, Term::iri(ldp::BASIC_CONTAINER)));
        graph.insert(Triple::with_predicate(root.clone(), rdf::TYPE, Term::iri(ldp::CONTAINER)));
        graph.insert(Triple::with_predicate(root, rdf::TYPE, Term::iri(ldp::RDF_SOURCE)));

        let mut state = MemoryState::default();
        state.resources.insert(String::new(), graph);

        Self {
            base_url,
            state: RwLock::new(state),
        }
    }

    /// Make the POST after the next `posts` successful ones fail with 500.
    /// `None` clears the failure.
    pub async fn fail_after(&self, posts: Option<usize>) {
        let mut state = self.state.write().await;
        let succeeded = state.posts;
        state.fail_at = posts.map(|posts| succeeded + posts);
    }

    /// Paths of all stored resources, root container included as `""`
    pub async fn paths(&self) -> Vec<String> {
        self.state.read().await.resources.keys().cloned().collect()
    }

    /// Stored triples of one resource
    pub async fn resource(&self, path: &str) -> Option<Graph> {
        self.state.read().await.resources.get(path.trim_matches('/')).cloned()
    }

    fn status(method: &'static str, url: String, status: u16, message: &str) -> TransportError {
        TransportError::Status {
            method,
            url,
            status,
            message: message.to_string(),
        }
    }

    fn post_locked(
        &self,
        state: &mut MemoryState,
        path: &str,
        body: &str,
        slug: Option<&str>,
    ) -> Result<String, TransportError> {
        let url = join_url(&self.base_url, path);
        if !state.resources.contains_key(path) {
            return Err(Self::status("POST", url, 404, "Not Found"));
        }
        if state.fail_at.is_some_and(|fail_at| state.posts >= fail_at) {
            warn!("Injected failure for POST {}", url);
            return Err(Self::status("POST", url, 500, "Injected failure"));
        }

        let name = match slug.map(|slug| slug.trim_matches('/')).filter(|slug| !slug.is_empty()) {
            Some(slug) if !state.resources.contains_key(&join_path(path, slug)) => slug.to_string(),
            _ => Uuid::new_v4().to_string(),
        };
        let child_path = join_path(path, &name);
        let child_url = join_url(&self.base_url, &child_path);

        let parsed = codec::parse_turtle(body, Some(&child_url))
            .map_err(|e| Self::status("POST", url.clone(), 400, &e.to_string()))?;

        let child = Term::iri(child_url.as_str());
        let mut graph = parsed;
        graph.insert(Triple::with_predicate(child.clone(), rdf::TYPE, Term::iri(ldp::RDF_SOURCE)));
        let is_container = [ldp::BASIC_CONTAINER, ldp::DIRECT_CONTAINER]
            .iter()
            .any(|class| graph.has_type(&child, class));
        if is_container {
            graph.insert(Triple::with_predicate(child.clone(), rdf::TYPE, Term::iri(ldp::CONTAINER)));
        }

        let parent = Term::iri(url.as_str());
        let membership = state.resources.get(path).and_then(|parent_graph| {
            if !parent_graph.has_type(&parent, ldp::DIRECT_CONTAINER) {
                return None;
            }
            let resource = parent_graph
                .objects(Some(&parent), ldp::MEMBERSHIP_RESOURCE)
                .into_iter()
                .find_map(Term::as_iri)?
                .to_string();
            let relation = parent_graph
                .objects(Some(&parent), ldp::HAS_MEMBER_RELATION)
                .into_iter()
                .find_map(Term::as_iri)?
                .to_string();
            Some((resource, relation))
        });

        if let Some(parent_graph) = state.resources.get_mut(path) {
            parent_graph.insert(Triple::with_predicate(parent, ldp::CONTAINS, child.clone()));
        }
        if let Some((resource, relation)) = membership {
            match self.relative_path(&resource) {
                Some(member_path) if state.resources.contains_key(&member_path) => {
                    if let Some(member_graph) = state.resources.get_mut(&member_path) {
                        member_graph.insert(Triple::with_predicate(
                            Term::iri(resource.as_str()),
                            relation,
                            child.clone(),
                        ));
                    }
                }
                _ => warn!("Membership resource {} is not stored here", resource),
            }
        }

        state.resources.insert(child_path, graph);
        state.posts += 1;
        debug!("Stored {}", child_url);
        Ok(child_url)
    }

    fn delete_locked(&self, state: &mut MemoryState, path: &str) -> Result<(), TransportError> {
        let url = join_url(&self.base_url, path);
        if path.is_empty() {
            return Err(Self::status("DELETE", url, 405, "Method Not Allowed"));
        }
        if !state.resources.contains_key(path) {
            return Err(Self::status("DELETE", url, 404, "Not Found"));
        }

        let prefix = format!("{}/", path);
        let removed: Vec<String> = state
            .resources
            .keys()
            .filter(|key| key.as_str() == path || key.starts_with(&prefix))
            .cloned()
            .collect();
        let removed_urls: Vec<Term> = removed
            .iter()
            .map(|key| Term::iri(join_url(&self.base_url, key)))
            .collect();
        for key in &removed {
            state.resources.remove(key);
        }

        // Drop containment and membership triples pointing into the subtree
        for graph in state.resources.values_mut() {
            graph.retain(|triple| !removed_urls.contains(&triple.object));
        }
        debug!("Deleted {} resources under {}", removed.len(), url);
        Ok(())
    }
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

#[async_trait]
impl LdpTransport for MemoryLdp {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_turtle(&self, path: &str, cx: &CallContext) -> Result<String, TransportError> {
        let path = path.trim_matches('/');
        cx.run(async {
            let state = self.state.read().await;
            match state.resources.get(path) {
                Some(graph) => codec::graph_to_turtle(graph)
                    .map_err(|e| Self::status("GET", self.resource_url(path), 500, &e.to_string())),
                None => Err(Self::status("GET", self.resource_url(path), 404, "Not Found")),
            }
        })
        .await
    }

    async fn post_turtle(
        &self,
        path: &str,
        body: String,
        slug: Option<&str>,
        cx: &CallContext,
    ) -> Result<String, TransportError> {
        let path = path.trim_matches('/');
        cx.run(async {
            let mut state = self.state.write().await;
            self.post_locked(&mut state, path, &body, slug)
        })
        .await
    }

    async fn delete(&self, path: &str, cx: &CallContext) -> Result<(), TransportError> {
        let path = path.trim_matches('/');
        cx.run(async {
            let mut state = self.state.write().await;
            self.delete_locked(&mut state, path)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use annolink_core::vocab::oa;

    const BASE: &str = "http://localhost:8080/rest/anno";

    fn iri(value: &str) -> Term {
        Term::iri(value)
    }

    #[tokio::test]
    async fn test_post_resolves_relative_subject() {
        let server = MemoryLdp::new(BASE);
        let cx = CallContext::new();

        let location = server
            .post_turtle("", "<> a <http://www.w3.org/ns/oa#Annotation> .".to_string(), Some("anno1"), &cx)
            .await
            .unwrap();

        assert_eq!(location, format!("{}/anno1", BASE));
        let graph = server.resource("anno1").await.unwrap();
        assert!(graph.has_type(&iri(&location), oa::ANNOTATION));
        assert!(graph.has_type(&iri(&location), ldp::RDF_SOURCE));

        let root = server.resource("").await.unwrap();
        assert!(root.contains(&Triple::with_predicate(iri(BASE), ldp::CONTAINS, iri(&location))));
    }

    #[tokio::test]
    async fn test_generated_names_and_taken_slugs() {
        let server = MemoryLdp::new(BASE);
        let cx = CallContext::new();
        let body = "<> a <http://www.w3.org/ns/oa#Annotation> .";

        let first = server.post_turtle("", body.to_string(), Some("same"), &cx).await.unwrap();
        let second = server.post_turtle("", body.to_string(), Some("same"), &cx).await.unwrap();
        let third = server.post_turtle("", body.to_string(), None, &cx).await.unwrap();

        assert!(first.ends_with("/same"));
        assert_ne!(first, second);
        assert_ne!(second, third);
        assert_eq!(server.paths().await.len(), 4);
    }

    #[tokio::test]
    async fn test_direct_container_membership() {
        let server = MemoryLdp::new(BASE);
        let cx = CallContext::new();

        let root = server
            .post_turtle("", "<> a <http://www.w3.org/ns/oa#Annotation> .".to_string(), Some("a1"), &cx)
            .await
            .unwrap();
        let container = format!(
            "<> a <{}> ; <{}> <{}> ; <{}> <{}> .",
            ldp::DIRECT_CONTAINER,
            ldp::HAS_MEMBER_RELATION,
            oa::HAS_TARGET,
            ldp::MEMBERSHIP_RESOURCE,
            root
        );
        server.post_turtle("a1", container, Some("t"), &cx).await.unwrap();
        let target = server
            .post_turtle("a1/t", "<> a <http://purl.org/dc/dcmitype/Text> .".to_string(), None, &cx)
            .await
            .unwrap();

        let root_graph = server.resource("a1").await.unwrap();
        assert!(root_graph.contains(&Triple::with_predicate(iri(&root), oa::HAS_TARGET, iri(&target))));

        let container_graph = server.resource("a1/t").await.unwrap();
        assert!(container_graph.has_type(&iri(&format!("{}/t", root)), ldp::CONTAINER));
    }

    #[tokio::test]
    async fn test_get_serializes_resource() {
        let server = MemoryLdp::new(BASE);
        let cx = CallContext::new();
        server
            .post_turtle("", "<> <http://purl.org/dc/elements/1.1/format> \"text/html\" .".to_string(), Some("r"), &cx)
            .await
            .unwrap();

        let turtle = server.get_turtle("r", &cx).await.unwrap();
        let graph = codec::parse_turtle(&turtle, None).unwrap();
        assert_eq!(graph, server.resource("r").await.unwrap());

        let missing = server.get_turtle("nope", &cx).await.unwrap_err();
        assert_eq!(missing.status(), Some(404));
    }

    #[tokio::test]
    async fn test_post_rejects_bad_turtle_and_missing_parent() {
        let server = MemoryLdp::new(BASE);
        let cx = CallContext::new();

        let bad = server.post_turtle("", "<> a".to_string(), None, &cx).await.unwrap_err();
        assert_eq!(bad.status(), Some(400));

        let orphan = server
            .post_turtle("missing", "<> a <http://example.org/C> .".to_string(), None, &cx)
            .await
            .unwrap_err();
        assert_eq!(orphan.status(), Some(404));
        assert_eq!(server.paths().await, vec![String::new()]);
    }

    #[tokio::test]
    async fn test_delete_removes_subtree_and_references() {
        let server = MemoryLdp::new(BASE);
        let cx = CallContext::new();
        let body = "<> a <http://example.org/C> .";

        server.post_turtle("", body.to_string(), Some("a"), &cx).await.unwrap();
        server.post_turtle("a", body.to_string(), Some("b"), &cx).await.unwrap();
        server.post_turtle("", body.to_string(), Some("ab"), &cx).await.unwrap();

        server.delete("a", &cx).await.unwrap();

        assert_eq!(server.paths().await, vec![String::new(), "ab".to_string()]);
        let root = server.resource("").await.unwrap();
        assert_eq!(root.objects(Some(&iri(BASE)), ldp::CONTAINS), vec![&iri(&format!("{}/ab", BASE))]);

        assert_eq!(server.delete("a", &cx).await.unwrap_err().status(), Some(404));
        assert_eq!(server.delete("", &cx).await.unwrap_err().status(), Some(405));
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let server = MemoryLdp::new(BASE);
        let cx = CallContext::new();
        let body = "<> a <http://example.org/C> .";

        server.fail_after(Some(1)).await;
        server.post_turtle("", body.to_string(), None, &cx).await.unwrap();
        let error = server.post_turtle("", body.to_string(), None, &cx).await.unwrap_err();
        assert_eq!(error.status(), Some(500));

        server.fail_after(None).await;
        server.post_turtle("", body.to_string(), None, &cx).await.unwrap();
    }
}
