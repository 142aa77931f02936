//! Annolink CLI main entry point

use annolink_cli::commands::{Cli, CommandExecutor};
use annolink_ldp::CallContext;
use anyhow::Result;
use clap::Parser;
use tracing::warn;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config()?;

    // Ctrl+C cancels whatever remote call is in flight
    let (cx, cancel) = CallContext::new().cancellable();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            cancel.cancel();
        }
    });

    let mut executor = CommandExecutor::new(config)?.with_call_context(cx);
    let result = executor.execute(cli.command).await?;

    // Exit with appropriate code
    if result.success {
        std::process::exit(0);
    } else {
        std::process::exit(1);
    }
}
