//! `msgpack-pack`: encode JSON (stdin) to MessagePack (stdout).

use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::Parser;
use juneau_msgpack::MsgPackOptions;
use juneau_msgpack_cli::{load_options, pack, CliError};

#[derive(Parser)]
#[command(name = "msgpack-pack", about = "Encode JSON from stdin as MessagePack")]
struct Cli {
    /// TOML file with codec options.
    #[arg(long, env = "JUNEAU_MSGPACK_CONFIG")]
    config: Option<PathBuf>,
    /// Order map entries by encoded key bytes.
    #[arg(long)]
    sort_maps: bool,
    /// Write floats as float32 when exact.
    #[arg(long)]
    compact_floats: bool,
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let mut options = match &cli.config {
        Some(path) => {
            tracing::debug!(config = %path.display(), "loading options");
            load_options(path)?
        }
        None => MsgPackOptions::default(),
    };
    options.sort_maps |= cli.sort_maps;
    options.compact_floats |= cli.compact_floats;

    let mut json = String::new();
    io::stdin().read_to_string(&mut json)?;
    let bytes = pack(json.trim(), &options)?;
    tracing::debug!(bytes = bytes.len(), "encoded document");

    let mut stdout = io::stdout().lock();
    stdout.write_all(&bytes)?;
    stdout.flush()?;
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        tracing::error!(error = %e, "msgpack-pack failed");
        std::process::exit(1);
    }
}
