mod cli;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dns-core", about = "Inspect DNS headers and resource records")]
struct Args {
    /// More log output (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a 12-byte message header given as hex (e.g. 1234 0100 0001 0000 0000 0000)
    Header {
        #[arg(required = true)]
        hex: Vec<String>,
    },

    /// Encode a message header and print it as hex
    EncodeHeader(cli::HeaderArgs),

    /// Parse a serialized record and show it together with its wire form
    Record { line: String },

    /// Sort serialized records (one per line) into canonical order
    Sort {
        /// Input file, stdin when omitted
        file: Option<PathBuf>,

        /// Drop records repeating name, content, type and class
        #[arg(long)]
        dedup: bool,
    },

    /// Derive the SOA of a zone from a file of serialized records
    Soa {
        zone: String,
        file: PathBuf,

        /// Serial handed out last time; the new one will not be lower
        #[arg(long)]
        previous_serial: Option<u32>,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init()
        .ok();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let started = dns_core::start_time::init();
    tracing::debug!(?started, command = ?args.command, "starting");

    let result = match args.command {
        Command::Header { hex } => cli::decode_header(&hex.join(" ")),
        Command::EncodeHeader(header) => cli::encode_header(&header),
        Command::Record { line } => cli::show_record(&line),
        Command::Sort { file, dedup } => cli::sort_records(file.as_deref(), dedup),
        Command::Soa {
            zone,
            file,
            previous_serial,
        } => cli::derive_soa(&zone, &file, previous_serial),
    };

    tracing::debug!(elapsed = ?dns_core::start_time::uptime(), "done");
    result
}
