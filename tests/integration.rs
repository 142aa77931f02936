// Integration tests for Annolink components
// These tests store annotations on the in-memory LDP server and read them back

use annolink_core::vocab::oa;
use annolink_core::{Annotation, DocumentFormat};
use annolink_ldp::transport::{LdpTransport, TransportError};
use annolink_ldp::{
    CallContext, CreateStep, LdpCreator, LdpDestroyer, LdpError, LdpLoader, MemoryLdp,
};
use std::collections::BTreeSet;
use std::sync::Arc;

const BASE: &str = "http://localhost:8080/rest/anno";

fn fixture(name: &str) -> String {
    let path = format!(
        "{}/../crates/annolink-core/tests/fixtures/{}",
        env!("CARGO_MANIFEST_DIR"),
        name
    );
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("missing fixture {}: {}", path, e))
}

async fn store(server: &MemoryLdp, annotation: &Annotation) -> String {
    LdpCreator::new(server, annotation)
        .create(&CallContext::new())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_round_trip_in_every_format() {
    let server = MemoryLdp::new(BASE);
    let cx = CallContext::new();

    for (name, format) in [
        ("body-chars.json", DocumentFormat::JsonLd),
        ("body-chars.ttl", DocumentFormat::Turtle),
        ("body-chars.rdf", DocumentFormat::RdfXml),
    ] {
        let original = Annotation::with_format(fixture(name), format);
        let id = store(&server, &original).await;
        let loaded = LdpLoader::new(&server).load(&id, &cx).await.unwrap();

        assert_eq!(loaded.has_target(), original.has_target(), "{}", name);
        assert_eq!(loaded.has_body(), original.has_body(), "{}", name);
        assert_eq!(loaded.motivated_by(), original.motivated_by(), "{}", name);
        assert_eq!(loaded.annotation_type().unwrap(), oa::ANNOTATION, "{}", name);
    }
}

#[tokio::test]
async fn test_round_trip_with_multiple_values() {
    let server = MemoryLdp::new(BASE);
    let cx = CallContext::new();

    for name in ["mult-targets.json", "mult-bodies.json", "mult-motivations.json"] {
        let original = Annotation::new(fixture(name));
        let id = store(&server, &original).await;
        let loaded = LdpLoader::new(&server).load(&id, &cx).await.unwrap();

        assert_eq!(loaded.has_target(), original.has_target(), "{}", name);
        assert_eq!(loaded.has_body(), original.has_body(), "{}", name);
        assert_eq!(loaded.motivated_by(), original.motivated_by(), "{}", name);
    }
}

#[tokio::test]
async fn test_loaded_annotation_survives_turtle_output() {
    let server = MemoryLdp::new(BASE);
    let cx = CallContext::new();

    let original = Annotation::new(fixture("body-chars.ttl"));
    let id = store(&server, &original).await;
    let loaded = LdpLoader::new(&server).load(&id, &cx).await.unwrap();

    let reparsed = Annotation::with_format(loaded.to_turtle().unwrap(), DocumentFormat::Turtle);
    assert_eq!(reparsed.has_body(), original.has_body());
    assert_eq!(reparsed.has_target(), original.has_target());
    assert_eq!(reparsed.url(), loaded.url());
}

#[tokio::test]
async fn test_listing_returns_id_only_stubs() {
    let server = MemoryLdp::new(BASE);
    let cx = CallContext::new();

    let mut ids = BTreeSet::new();
    for name in ["bookmark.json", "body-chars.json", "mult-targets.json"] {
        ids.insert(store(&server, &Annotation::new(fixture(name))).await);
    }

    let stubs = LdpLoader::new(&server).find_all(&cx).await.unwrap();
    let listed: BTreeSet<String> = stubs
        .iter()
        .filter_map(|stub| stub.id().map(str::to_string))
        .collect();

    assert_eq!(stubs.len(), 3);
    assert_eq!(listed, ids);
    assert!(stubs.iter().all(|stub| stub.url().is_none() && stub.annotation_type().is_err()));
}

#[tokio::test]
async fn test_partial_create_resume_and_cleanup() {
    let server = MemoryLdp::new(BASE);
    let cx = CallContext::new();
    let annotation = Annotation::new(fixture("mult-targets.json"));

    // root, body container, target container, first target
    server.fail_after(Some(4)).await;
    let failed = LdpCreator::new(&server, &annotation).create(&cx).await.unwrap_err();
    assert_eq!(failed.step, CreateStep::Target(1));
    assert_eq!(failed.created_paths().len(), 4);

    // The half-written annotation loads with only the first target
    let root_id = failed.root_id().unwrap().to_string();
    let partial = LdpLoader::new(&server).load(&root_id, &cx).await.unwrap();
    assert_eq!(partial.has_target().len(), 1);

    server.fail_after(None).await;
    let resumed = LdpCreator::new(&server, &annotation)
        .resume(failed.progress.clone(), &cx)
        .await
        .unwrap();
    assert_eq!(resumed, root_id);
    let loaded = LdpLoader::new(&server).load(&resumed, &cx).await.unwrap();
    assert_eq!(loaded.has_target(), annotation.has_target());

    LdpDestroyer::new(&server).cleanup(&failed, &cx).await.unwrap();
    assert_eq!(server.paths().await, vec![String::new()]);
}

#[tokio::test]
async fn test_cancelled_create_writes_nothing() {
    let server = MemoryLdp::new(BASE);
    let annotation = Annotation::new(fixture("bookmark.json"));

    let (cx, cancel) = CallContext::new().cancellable();
    cancel.cancel();

    let failed = LdpCreator::new(&server, &annotation).create(&cx).await.unwrap_err();
    assert_eq!(failed.step, CreateStep::Root);
    assert!(failed.created_paths().is_empty());
    assert!(matches!(
        *failed.source,
        LdpError::Transport(TransportError::Cancelled)
    ));
    assert_eq!(server.paths().await.len(), 1);
}

#[tokio::test]
async fn test_independent_annotations_concurrently() {
    let server = Arc::new(MemoryLdp::new(BASE));

    let handles: Vec<_> = ["bookmark.json", "body-chars.json", "mult-bodies.json", "mult-targets.json"]
        .into_iter()
        .map(|name| {
            let server = Arc::clone(&server);
            let data = fixture(name);
            tokio::spawn(async move {
                let annotation = Annotation::new(data);
                let cx = CallContext::new();
                let id = LdpCreator::new(server.as_ref(), &annotation)
                    .create(&cx)
                    .await
                    .unwrap();
                let loaded = LdpLoader::new(server.as_ref()).load(&id, &cx).await.unwrap();
                (annotation.has_body(), loaded.has_body(), annotation.has_target(), loaded.has_target())
            })
        })
        .collect();

    for handle in futures::future::join_all(handles).await {
        let (bodies, loaded_bodies, targets, loaded_targets) = handle.unwrap();
        assert_eq!(bodies, loaded_bodies);
        assert_eq!(targets, loaded_targets);
    }

    let stubs = LdpLoader::new(server.as_ref()).find_all(&CallContext::new()).await.unwrap();
    assert_eq!(stubs.len(), 4);
}

#[tokio::test]
async fn test_body_outside_the_server_is_rejected() {
    let server = MemoryLdp::new(BASE);
    let cx = CallContext::new();

    let root = format!(
        "<> a <{}> ; <{}> <http://elsewhere.example.org/body> ; <{}> <{}/x> .",
        oa::ANNOTATION,
        oa::HAS_BODY,
        oa::HAS_TARGET,
        BASE
    );
    server.post_turtle("", root, Some("foreign"), &cx).await.unwrap();

    let error = LdpLoader::new(&server).load("foreign", &cx).await.unwrap_err();
    assert!(matches!(error, LdpError::ForeignResource { .. }));
}
