use std::path::PathBuf;

use clap::Parser;
use tower_lsp::{LspService, Server};

mod capabilities;
mod config;
mod document;
mod handlers;
mod logging;
mod server;

use config::ServerConfig;

#[derive(Parser)]
#[command(name = "taikou-lsp")]
#[command(about = "Language Server for Taikou5 event scripts")]
struct Cli {
    /// Use stdio for communication (required)
    #[arg(long)]
    stdio: bool,

    /// Enable debug mode
    #[arg(long)]
    debug: bool,

    /// Directory holding the .snippet files (default: `everedit` next to this binary)
    #[arg(long, value_name = "DIR")]
    snippets_dir: Option<PathBuf>,

    /// Path to tkhack-dx.exe
    #[arg(long, value_name = "PATH")]
    compiler: Option<PathBuf>,

    /// Log filter for stderr output (overrides RUST_LOG)
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    if !args.stdio {
        eprintln!("Error: --stdio flag is required");
        std::process::exit(1);
    }

    logging::init_logging(args.log_level.as_deref());

    let config = ServerConfig::from_cli(args.snippets_dir, args.compiler);
    tracing::info!(snippets_dir = %config.snippets.dir.display(), "starting taikou-lsp");

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) =
        LspService::new(|client| server::Backend::new(client, config, args.debug));

    Server::new(stdin, stdout, socket).serve(service).await;
}
