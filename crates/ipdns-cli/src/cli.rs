use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "ipdns",
    about = "DNS over IPFS: serve and publish domain records through IPNS pointers",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Path to the ipfs binary
    #[arg(long, global = true)]
    pub ipfs_bin: Option<String>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Answer DNS queries until interrupted
    Serve(ServeArgs),
    /// Resolve one domain name and print its addresses
    Resolve(ResolveArgs),
    /// Publish a TOML zone file and print its root pointer
    Publish(PublishArgs),
    /// Generate a named key
    Keygen(KeygenArgs),
    /// List named keys
    Keys(KeysArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Directory for IPFS transfer files
    pub data_path: PathBuf,
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Root pointer every lookup starts from
    #[arg(long)]
    pub root: Option<String>,
    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct ResolveArgs {
    pub data_path: PathBuf,
    pub domain: String,
    #[arg(long)]
    pub root: String,
}

#[derive(Args)]
pub struct PublishArgs {
    pub data_path: PathBuf,
    pub zone_file: PathBuf,
    /// Key name of the zone root
    #[arg(long, default_value = ipdns_resolver::DEFAULT_ROOT_NAME)]
    pub root_name: String,
}

#[derive(Args)]
pub struct KeygenArgs {
    pub data_path: PathBuf,
    pub name: String,
}

#[derive(Args)]
pub struct KeysArgs {
    pub data_path: PathBuf,
}
