//! Tests for the annolink-cli crate

use annolink_cli::commands::{
    AnnotationSummary, Cli, CommandExecutor, CommandResult, Commands, InputFormat, OutputFormat,
};
use annolink_core::Annotation;
use annolink_ldp::{CallContext, CancelHandle, LdpConfig, LdpTransport, MemoryLdp, TransportError};
use async_trait::async_trait;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

const BASE: &str = "http://localhost:8080/rest/anno";

const ANNOTATION: &str = r#"{
  "@context": "http://www.w3.org/ns/oa-context-20130208.json",
  "@type": "oa:Annotation",
  "motivatedBy": "oa:commenting",
  "hasBody": { "@type": "cnt:ContentAsText", "chars": "I love this!" },
  "hasTarget": "http://example.org/t"
}"#;

fn annotation_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn executor() -> CommandExecutor {
    CommandExecutor::with_transport(LdpConfig::new(BASE), Box::new(MemoryLdp::new(BASE)))
}

#[test]
fn test_cli_parsing_parse() {
    let args = vec!["annolink", "parse", "anno.json", "--input", "json-ld", "--format", "json"];
    let cli = Cli::try_parse_from(args).unwrap();

    match cli.command {
        Commands::Parse { file, input, format } => {
            assert_eq!(file, PathBuf::from("anno.json"));
            assert_eq!(input, Some(InputFormat::JsonLd));
            assert_eq!(format, OutputFormat::Json);
        }
        _ => panic!("Expected Parse command"),
    }
}

#[test]
fn test_cli_parsing_global_options() {
    let args = vec!["annolink", "load", "abc", "--ldp-url", "http://ldp.example.com/anno/", "--timeout", "3"];
    let cli = Cli::try_parse_from(args).unwrap();

    assert_eq!(cli.ldp_url.as_deref(), Some("http://ldp.example.com/anno/"));
    assert_eq!(cli.timeout, Some(3));
    match &cli.command {
        Commands::Load { id, format } => {
            assert_eq!(id, "abc");
            assert_eq!(*format, OutputFormat::Summary);
        }
        _ => panic!("Expected Load command"),
    }

    let config = cli.config().unwrap();
    assert_eq!(config.base_url, "http://ldp.example.com/anno");
    assert_eq!(config.timeout_seconds, 3);
}

#[test]
fn test_cli_parsing_create() {
    let args = vec!["annolink", "create", "anno.ttl", "--resume", "progress.json", "--cleanup"];
    let cli = Cli::try_parse_from(args).unwrap();

    match cli.command {
        Commands::Create { file, input, resume, cleanup } => {
            assert_eq!(file, PathBuf::from("anno.ttl"));
            assert_eq!(input, None);
            assert_eq!(resume, Some(PathBuf::from("progress.json")));
            assert!(cleanup);
        }
        _ => panic!("Expected Create command"),
    }
}

#[test]
fn test_cli_invalid_args() {
    let args = vec!["annolink", "delete"]; // Missing id
    assert!(Cli::try_parse_from(args).is_err());

    let args = vec!["annolink", "load", "abc", "--format", "yaml"];
    assert!(Cli::try_parse_from(args).is_err());
}

#[test]
fn test_annotation_summary() {
    let annotation = Annotation::new(ANNOTATION);
    let summary = AnnotationSummary::of(&annotation);

    assert_eq!(summary.url, None);
    assert_eq!(summary.annotation_type.as_deref(), Some("http://www.w3.org/ns/oa#Annotation"));
    assert!(summary.bodies.contains("I love this!"));

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["type"], "http://www.w3.org/ns/oa#Annotation");
    assert_eq!(json["targets"][0], "http://example.org/t");
}

#[tokio::test]
async fn test_execute_parse() {
    let file = annotation_file(ANNOTATION);
    let mut executor = executor();

    let result = executor
        .execute(Commands::Parse {
            file: file.path().to_path_buf(),
            input: None,
            format: OutputFormat::Summary,
        })
        .await
        .unwrap();

    assert!(result.success);
    let data = result.data.unwrap();
    assert_eq!(data["motivations"][0], "http://www.w3.org/ns/oa#commenting");
}

#[tokio::test]
async fn test_execute_parse_invalid_document() {
    let file = annotation_file("{ \"@context\": \"http://www.w3.org/ns/oa.jsonld\", ");
    let mut executor = executor();

    let result = executor
        .execute(Commands::Parse {
            file: file.path().to_path_buf(),
            input: None,
            format: OutputFormat::Summary,
        })
        .await
        .unwrap();

    assert!(!result.success);
    assert!(result.data.is_none());
}

#[tokio::test]
async fn test_execute_create_load_list_delete() {
    let file = annotation_file(ANNOTATION);
    let mut executor = executor();

    let created: CommandResult = executor
        .execute(Commands::Create {
            file: file.path().to_path_buf(),
            input: Some(InputFormat::JsonLd),
            resume: None,
            cleanup: false,
        })
        .await
        .unwrap();
    assert!(created.success);
    let id = created.data.unwrap()["id"].as_str().unwrap().to_string();

    let loaded = executor
        .execute(Commands::Load {
            id: id.clone(),
            format: OutputFormat::Turtle,
        })
        .await
        .unwrap();
    let data = loaded.data.unwrap();
    assert_eq!(data["bodies"][0], "I love this!");
    assert_eq!(data["targets"][0], "http://example.org/t");
    assert_eq!(data["url"], format!("{}/{}", BASE, id));

    let listed = executor
        .execute(Commands::List { format: OutputFormat::Json })
        .await
        .unwrap();
    assert_eq!(listed.data.unwrap()["ids"][0], id.as_str());

    let deleted = executor.execute(Commands::Delete { id: id.clone() }).await.unwrap();
    assert!(deleted.success);

    let missing = executor
        .execute(Commands::Load {
            id,
            format: OutputFormat::Summary,
        })
        .await;
    assert!(missing.is_err());
}

/// Cancels the shared context once the first resource has been posted
struct CancelAfterFirstPost {
    inner: Arc<MemoryLdp>,
    handle: CancelHandle,
}

#[async_trait]
impl LdpTransport for CancelAfterFirstPost {
    fn base_url(&self) -> &str {
        self.inner.base_url()
    }

    async fn get_turtle(&self, path: &str, cx: &CallContext) -> Result<String, TransportError> {
        self.inner.get_turtle(path, cx).await
    }

    async fn post_turtle(
        &self,
        path: &str,
        body: String,
        slug: Option<&str>,
        cx: &CallContext,
    ) -> Result<String, TransportError> {
        let location = self.inner.post_turtle(path, body, slug, cx).await?;
        self.handle.cancel();
        Ok(location)
    }

    async fn delete(&self, path: &str, cx: &CallContext) -> Result<(), TransportError> {
        self.inner.delete(path, cx).await
    }
}

#[tokio::test]
async fn test_cleanup_runs_after_cancellation() {
    let file = annotation_file(ANNOTATION);
    let server = Arc::new(MemoryLdp::new(BASE));
    let (cx, handle) = CallContext::new().cancellable();
    let transport = CancelAfterFirstPost {
        inner: Arc::clone(&server),
        handle,
    };
    let mut executor =
        CommandExecutor::with_transport(LdpConfig::new(BASE), Box::new(transport)).with_call_context(cx);

    let result = executor
        .execute(Commands::Create {
            file: file.path().to_path_buf(),
            input: Some(InputFormat::JsonLd),
            resume: None,
            cleanup: true,
        })
        .await
        .unwrap();

    assert!(!result.success);
    let data = result.data.unwrap();
    assert_eq!(data["step"], "body container");
    assert!(data["progress"]["root_id"].is_string());
    // the root created before cancellation is gone again
    assert_eq!(server.paths().await, vec![String::new()]);
}

#[tokio::test]
async fn test_command_executor_info() {
    let mut executor = executor();
    let result = executor.execute(Commands::Info).await.unwrap();

    assert!(result.success);
    assert!(result.message.contains("System information"));

    let info = result.data.unwrap();
    assert_eq!(info["name"], "annolink-cli");
    assert_eq!(info["ldp_url"], BASE);
    assert!(info.as_object().unwrap().contains_key("version"));
}
