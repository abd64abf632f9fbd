use std::path::PathBuf;

use clap::Parser;

/// modlabel — debugger label service: module-relative address labels
/// persisted across sessions and module relocation.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Address to bind the web server to.
    #[arg(long, default_value = "127.0.0.1", env = "MODLABEL_BIND")]
    pub bind: String,

    /// Port to listen on.
    #[arg(long, default_value = "3090", env = "MODLABEL_PORT")]
    pub port: u16,

    /// JSON process snapshot describing the attached target's modules.
    /// If omitted, the service starts detached.
    #[arg(long, env = "MODLABEL_MODULES")]
    pub modules: Option<PathBuf>,

    /// Session document to load labels from at startup and save them to.
    #[arg(long, env = "MODLABEL_SESSION")]
    pub session: Option<PathBuf>,
}
