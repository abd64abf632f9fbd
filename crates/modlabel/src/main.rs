mod cli;
mod server;

use std::sync::Arc;

use clap::Parser;
use eyre::WrapErr;

use modlabel_core::session::load_labels;
use modlabel_core::{LabelStore, ProcessSnapshot};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    // Generate a random API token for this server session.
    let api_token = {
        use rand::Rng;
        let bytes: [u8; 16] = rand::thread_rng().r#gen();
        hex_encode(bytes)
    };

    let target = match &args.modules {
        Some(path) => {
            let snapshot = ProcessSnapshot::from_path(path)
                .wrap_err_with(|| format!("load process snapshot {}", path.display()))?;
            tracing::info!(
                path = %path.display(),
                modules = snapshot.modules().len(),
                "loaded process snapshot"
            );
            snapshot
        }
        None => {
            tracing::warn!("no --modules snapshot given, starting detached");
            ProcessSnapshot::new()
        }
    };
    let target = Arc::new(target);
    let labels = Arc::new(LabelStore::new(target.clone()));

    if let Some(path) = args.session.as_deref().filter(|p| p.exists()) {
        let summary = load_labels(&labels, path).context("load session labels")?;
        tracing::info!(
            path = %path.display(),
            manual = summary.manual,
            automatic = summary.automatic,
            "restored labels from session"
        );
    }

    let state = server::AppState {
        labels,
        target,
        session_path: args.session.clone(),
        api_token: api_token.clone(),
    };

    let bind_addr = format!("{}:{}", args.bind, args.port);
    let origin = format!("http://{}:{}", args.bind, args.port);
    let router = server::build_router(state, &origin).context("build router")?;

    if args.bind == "0.0.0.0" {
        tracing::warn!("server is bound to 0.0.0.0, it is accessible from the network");
    }

    println!();
    println!("  modlabel is running:");
    println!("    URL:       http://{bind_addr}");
    println!("    API token: {api_token}");
    println!();

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .context("bind TCP listener")?;

    tracing::info!("listening on {bind_addr}");
    axum::serve(listener, router)
        .await
        .context("run HTTP server")?;

    Ok(())
}

/// Tiny hex-encoding helper to avoid adding a `hex` crate dependency.
fn hex_encode(bytes: impl AsRef<[u8]>) -> String {
    bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
}
