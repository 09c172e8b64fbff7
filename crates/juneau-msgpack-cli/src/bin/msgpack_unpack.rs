//! `msgpack-unpack`: decode MessagePack (stdin) to JSON (stdout).

use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::Parser;
use juneau_msgpack::MsgPackOptions;
use juneau_msgpack_cli::{load_options, unpack, CliError, UnpackFormat};

#[derive(Parser)]
#[command(name = "msgpack-unpack", about = "Decode MessagePack from stdin as JSON")]
struct Cli {
    /// TOML file with codec options.
    #[arg(long, env = "JUNEAU_MSGPACK_CONFIG")]
    config: Option<PathBuf>,
    /// Print single-line JSON.
    #[arg(long)]
    compact: bool,
    /// Decode every concatenated value into a JSON array.
    #[arg(long)]
    all: bool,
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let options = match &cli.config {
        Some(path) => {
            tracing::debug!(config = %path.display(), "loading options");
            load_options(path)?
        }
        None => MsgPackOptions::default(),
    };

    let mut bytes = Vec::new();
    io::stdin().read_to_end(&mut bytes)?;
    tracing::debug!(bytes = bytes.len(), "read input");
    let format = UnpackFormat {
        compact: cli.compact,
        all: cli.all,
    };
    let json = unpack(&bytes, &options, format)?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{json}")?;
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
        tracing::error!(error = %e, "msgpack-unpack failed");
        std::process::exit(1);
    }
}
