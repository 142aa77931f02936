//! CLI command definitions and handlers

use annolink_core::{Annotation, DocumentFormat};
use annolink_ldp::{
    CallContext, CreateProgress, HttpTransport, LdpConfig, LdpCreator, LdpDestroyer, LdpLoader, LdpTransport,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Main CLI structure
#[derive(Parser)]
#[command(name = "annolink")]
#[command(about = "Store and load Web Annotations on an LDP server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// LDP root container URL (overrides ANNOLINK_LDP_URL)
    #[arg(long, global = true)]
    pub ldp_url: Option<String>,

    /// Request timeout in seconds (overrides ANNOLINK_TIMEOUT_SECS)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Environment configuration with command-line overrides applied
    pub fn config(&self) -> Result<LdpConfig> {
        let mut config = LdpConfig::from_env()?;
        if let Some(url) = &self.ldp_url {
            config = LdpConfig {
                base_url: LdpConfig::new(url).base_url,
                ..config
            };
        }
        if let Some(seconds) = self.timeout {
            config = config.with_timeout(seconds);
        }
        Ok(config)
    }
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Parse an annotation document and show what it says
    Parse {
        /// Annotation document (JSON-LD, Turtle or RDF/XML)
        file: PathBuf,

        /// Document format; guessed from the content when omitted
        #[arg(long)]
        input: Option<InputFormat>,

        /// Output format
        #[arg(short, long, default_value = "summary")]
        format: OutputFormat,
    },

    /// Store an annotation document on the LDP server
    Create {
        /// Annotation document (JSON-LD, Turtle or RDF/XML)
        file: PathBuf,

        /// Document format; guessed from the content when omitted
        #[arg(long)]
        input: Option<InputFormat>,

        /// Continue an earlier failed create from its saved progress (JSON)
        #[arg(long)]
        resume: Option<PathBuf>,

        /// Delete partially created resources when the create fails
        #[arg(long)]
        cleanup: bool,
    },

    /// Load a stored annotation
    Load {
        /// Annotation id
        id: String,

        /// Output format
        #[arg(short, long, default_value = "summary")]
        format: OutputFormat,
    },

    /// List stored annotation ids
    List {
        /// Output format
        #[arg(short, long, default_value = "summary")]
        format: OutputFormat,
    },

    /// Delete a stored annotation
    Delete {
        /// Annotation id
        id: String,
    },

    /// Show system information
    Info,
}

/// Annotation document formats accepted on input
#[derive(Clone, Copy, Debug, PartialEq, clap::ValueEnum)]
pub enum InputFormat {
    JsonLd,
    Turtle,
    RdfXml,
}

impl From<InputFormat> for DocumentFormat {
    fn from(format: InputFormat) -> Self {
        match format {
            InputFormat::JsonLd => DocumentFormat::JsonLd,
            InputFormat::Turtle => DocumentFormat::Turtle,
            InputFormat::RdfXml => DocumentFormat::RdfXml,
        }
    }
}

/// Output format options
#[derive(Clone, Debug, PartialEq, clap::ValueEnum)]
pub enum OutputFormat {
    Summary,
    Turtle,
    Json,
    JsonPretty,
}

/// Command execution result
pub struct CommandResult {
    pub success: bool,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// What an annotation says, flattened for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationSummary {
    pub id: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub annotation_type: Option<String>,
    pub motivations: BTreeSet<String>,
    pub targets: BTreeSet<String>,
    pub bodies: BTreeSet<String>,
}

impl AnnotationSummary {
    pub fn of(annotation: &Annotation) -> Self {
        Self {
            id: annotation.id().map(str::to_string),
            url: annotation.url().map(str::to_string),
            annotation_type: annotation.annotation_type().ok().map(str::to_string),
            motivations: annotation.motivated_by(),
            targets: annotation.has_target(),
            bodies: annotation.has_body(),
        }
    }

    fn to_text(&self) -> String {
        let mut output = String::new();
        let single = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
        output.push_str(&format!("id:          {}\n", single(&self.id)));
        output.push_str(&format!("url:         {}\n", single(&self.url)));
        output.push_str(&format!("type:        {}\n", single(&self.annotation_type)));
        for (label, values) in [
            ("motivation", &self.motivations),
            ("target", &self.targets),
            ("body", &self.bodies),
        ] {
            for value in values {
                output.push_str(&format!("{:<12} {}\n", format!("{}:", label), value));
            }
        }
        output
    }
}

/// Execute CLI commands
pub struct CommandExecutor {
    config: LdpConfig,
    transport: Box<dyn LdpTransport>,
    cx: CallContext,
}

impl CommandExecutor {
    /// Executor talking HTTP to the configured server
    pub fn new(config: LdpConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.clone())?;
        Ok(Self::with_transport(config, Box::new(transport)))
    }

    pub fn with_transport(config: LdpConfig, transport: Box<dyn LdpTransport>) -> Self {
        Self {
            config,
            transport,
            cx: CallContext::new(),
        }
    }

    /// Base context for every remote call; the configured timeout is added
    /// per command
    pub fn with_call_context(mut self, cx: CallContext) -> Self {
        self.cx = cx;
        self
    }

    fn call_context(&self) -> CallContext {
        self.cx.clone().with_timeout(self.config.timeout())
    }

    /// Execute a CLI command
    pub async fn execute(&mut self, command: Commands) -> Result<CommandResult> {
        match command {
            Commands::Parse { file, input, format } => self.execute_parse(&file, input, format),
            Commands::Create {
                file,
                input,
                resume,
                cleanup,
            } => self.execute_create(&file, input, resume.as_deref(), cleanup).await,
            Commands::Load { id, format } => self.execute_load(&id, format).await,
            Commands::List { format } => self.execute_list(format).await,
            Commands::Delete { id } => self.execute_delete(&id).await,
            Commands::Info => self.execute_info(),
        }
    }

    fn execute_parse(&self, file: &Path, input: Option<InputFormat>, format: OutputFormat) -> Result<CommandResult> {
        let annotation = match read_annotation(file, input)? {
            Ok(annotation) => annotation,
            Err(message) => {
                eprintln!("{}", message);
                return Ok(CommandResult {
                    success: false,
                    message,
                    data: None,
                });
            }
        };

        let summary = AnnotationSummary::of(&annotation);
        print_annotation(&annotation, &summary, &format)?;

        Ok(CommandResult {
            success: true,
            message: "Annotation parsed".to_string(),
            data: Some(serde_json::to_value(&summary)?),
        })
    }

    async fn execute_create(
        &self,
        file: &Path,
        input: Option<InputFormat>,
        resume: Option<&Path>,
        cleanup: bool,
    ) -> Result<CommandResult> {
        let annotation = match read_annotation(file, input)? {
            Ok(annotation) => annotation,
            Err(message) => {
                eprintln!("{}", message);
                return Ok(CommandResult {
                    success: false,
                    message,
                    data: None,
                });
            }
        };

        let progress = match resume {
            Some(path) => {
                let saved = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read progress file {}", path.display()))?;
                serde_json::from_str::<CreateProgress>(&saved)?
            }
            None => CreateProgress::default(),
        };

        let cx = self.call_context();
        let creator = LdpCreator::new(self.transport.as_ref(), &annotation)
            .with_external_reference(&self.config.external_reference);

        match creator.resume(progress, &cx).await {
            Ok(id) => {
                println!("{}", id);
                Ok(CommandResult {
                    success: true,
                    message: format!("Created annotation {}", id),
                    data: Some(serde_json::json!({ "id": id })),
                })
            }
            Err(failed) => {
                eprintln!("Error: {}", failed);
                if cleanup {
                    // The create context may be the one that was cancelled
                    let cleanup_cx = CallContext::new().with_timeout(self.config.timeout());
                    let destroyer = LdpDestroyer::new(self.transport.as_ref());
                    match destroyer.cleanup(&failed, &cleanup_cx).await {
                        Ok(()) => info!("Removed partially created resources"),
                        Err(e) => warn!("Cleanup failed: {}", e),
                    }
                } else if !failed.progress.is_empty() {
                    eprintln!("Progress (pass to --resume to continue):");
                    eprintln!("{}", serde_json::to_string_pretty(&failed.progress)?);
                }

                Ok(CommandResult {
                    success: false,
                    message: failed.to_string(),
                    data: Some(serde_json::json!({
                        "step": failed.step.to_string(),
                        "progress": failed.progress,
                        "cleaned_up": cleanup,
                    })),
                })
            }
        }
    }

    async fn execute_load(&self, id: &str, format: OutputFormat) -> Result<CommandResult> {
        let loader = LdpLoader::new(self.transport.as_ref()).with_external_reference(&self.config.external_reference);
        let annotation = loader.load(id, &self.call_context()).await?;

        let summary = AnnotationSummary::of(&annotation);
        print_annotation(&annotation, &summary, &format)?;

        Ok(CommandResult {
            success: true,
            message: format!("Loaded annotation {}", id),
            data: Some(serde_json::to_value(&summary)?),
        })
    }

    async fn execute_list(&self, format: OutputFormat) -> Result<CommandResult> {
        let loader = LdpLoader::new(self.transport.as_ref());
        let ids: Vec<String> = loader
            .find_all(&self.call_context())
            .await?
            .iter()
            .filter_map(|stub| stub.id().map(str::to_string))
            .collect();

        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string(&ids)?),
            OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(&ids)?),
            OutputFormat::Summary | OutputFormat::Turtle => {
                for id in &ids {
                    println!("{}", id);
                }
            }
        }

        Ok(CommandResult {
            success: true,
            message: format!("Found {} annotations", ids.len()),
            data: Some(serde_json::json!({ "ids": ids })),
        })
    }

    async fn execute_delete(&self, id: &str) -> Result<CommandResult> {
        LdpDestroyer::new(self.transport.as_ref())
            .destroy(id, &self.call_context())
            .await?;
        println!("Deleted {}", id);

        Ok(CommandResult {
            success: true,
            message: format!("Deleted annotation {}", id),
            data: Some(serde_json::json!({ "id": id })),
        })
    }

    fn execute_info(&self) -> Result<CommandResult> {
        let info = serde_json::json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "description": env!("CARGO_PKG_DESCRIPTION"),
            "ldp_url": self.config.base_url,
            "timeout_seconds": self.config.timeout_seconds,
            "external_reference": self.config.external_reference,
            "formats": ["json-ld", "turtle", "rdf-xml"]
        });

        let result = serde_json::to_string_pretty(&info)?;
        println!("{}", result);

        Ok(CommandResult {
            success: true,
            message: "System information".to_string(),
            data: Some(info),
        })
    }
}

/// Read and parse an annotation file. Unparseable documents are reported as
/// `Err(message)`; I/O failures as the outer error.
fn read_annotation(file: &Path, input: Option<InputFormat>) -> Result<std::result::Result<Annotation, String>> {
    let data = std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    Ok(Annotation::parse(data, input.map(DocumentFormat::from))
        .map_err(|e| format!("{}: {}", file.display(), e)))
}

fn print_annotation(annotation: &Annotation, summary: &AnnotationSummary, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Summary => print!("{}", summary.to_text()),
        OutputFormat::Turtle => print!("{}", annotation.to_turtle()?),
        OutputFormat::Json => println!("{}", serde_json::to_string(summary)?),
        OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(summary)?),
    }
    Ok(())
}
