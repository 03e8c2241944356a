use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use colored::Colorize;
use ipdns_kubo::{KuboClient, DEFAULT_IPFS_BIN};
use ipdns_naming::NamingService;
use ipdns_resolver::{Resolution, Resolver, ZoneNode, ZonePublisher};
use ipdns_server::{DnsServer, ServerConfig};
use ipdns_types::{DomainName, PointerId};
use serde_json::json;
use tracing::info;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let ipfs_bin = cli.ipfs_bin;
    match cli.command {
        Command::Serve(args) => cmd_serve(args, ipfs_bin).await,
        Command::Resolve(args) => cmd_resolve(args, ipfs_bin, &cli.format).await,
        Command::Publish(args) => cmd_publish(args, ipfs_bin, &cli.format).await,
        Command::Keygen(args) => cmd_keygen(args, ipfs_bin, &cli.format).await,
        Command::Keys(args) => cmd_keys(args, ipfs_bin, &cli.format).await,
    }
}

fn kubo(data_path: &Path, ipfs_bin: Option<String>) -> anyhow::Result<Arc<KuboClient>> {
    if !data_path.is_dir() {
        bail!("data path {} is not a directory", data_path.display());
    }
    let bin = ipfs_bin.unwrap_or_else(|| DEFAULT_IPFS_BIN.to_string());
    Ok(Arc::new(KuboClient::new(data_path).with_binary(bin)))
}

fn parse_root(root: &str) -> anyhow::Result<PointerId> {
    PointerId::new(root).with_context(|| format!("invalid root pointer `{root}`"))
}

async fn cmd_serve(args: ServeArgs, ipfs_bin: Option<String>) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::from_toml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ServerConfig::default(),
    };
    config.data_path = args.data_path;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(root) = &args.root {
        config.root_key = Some(parse_root(root)?);
    }
    if let Some(bin) = ipfs_bin {
        config.ipfs_bin = bin;
    }
    let Some(root) = config.root_key.clone() else {
        bail!("no root pointer: pass --root or set root_key in the config file");
    };

    let client = kubo(&config.data_path, Some(config.ipfs_bin.clone()))?;
    info!(data_path = %config.data_path.display(), "using data path");
    let resolver = Resolver::new(client.clone(), client, root).with_retry(config.retry_policy());
    let server = DnsServer::bind(&config, Arc::new(resolver))
        .await
        .context("starting DNS server")?;
    println!(
        "{} Serving DNS on {}",
        "✓".green().bold(),
        server.local_addr()?.to_string().bold()
    );

    server
        .serve_until(async {
            if tokio::signal::ctrl_c().await.is_err() {
                // Without a signal handler the server runs until killed.
                std::future::pending::<()>().await;
            }
        })
        .await?;
    println!("Exiting due to interrupt");
    Ok(())
}

async fn cmd_resolve(
    args: ResolveArgs,
    ipfs_bin: Option<String>,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let client = kubo(&args.data_path, ipfs_bin)?;
    let root = parse_root(&args.root)?;
    let name = DomainName::parse(&args.domain)
        .with_context(|| format!("invalid domain name `{}`", args.domain))?;

    let resolver = Resolver::new(client.clone(), client, root);
    let resolution = resolver
        .resolve(&name)
        .await
        .with_context(|| format!("resolving {name}"))?;

    match (format, resolution) {
        (OutputFormat::Json, Resolution::Found(addrs)) => {
            println!("{}", json!({"name": name.to_string(), "addresses": addrs}));
        }
        (OutputFormat::Json, Resolution::NotFound(reason)) => {
            println!(
                "{}",
                json!({"name": name.to_string(), "addresses": [], "reason": reason.to_string()})
            );
        }
        (OutputFormat::Text, Resolution::Found(addrs)) => {
            for addr in addrs {
                println!("{}  {}", name.to_string().bold(), addr.to_string().green());
            }
        }
        (OutputFormat::Text, Resolution::NotFound(reason)) => {
            println!("{} {} not found ({reason})", "✗".red().bold(), name.to_string().bold());
        }
    }
    Ok(())
}

async fn cmd_publish(
    args: PublishArgs,
    ipfs_bin: Option<String>,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let client = kubo(&args.data_path, ipfs_bin)?;
    let text = std::fs::read_to_string(&args.zone_file)
        .with_context(|| format!("reading {}", args.zone_file.display()))?;
    let zone = ZoneNode::from_toml_str(&text)
        .with_context(|| format!("parsing {}", args.zone_file.display()))?;

    let publisher = ZonePublisher::new(client.clone(), client);
    let root = publisher
        .publish_zone(&args.root_name, &zone)
        .await
        .context("publishing zone")?;

    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({"root_name": args.root_name, "root": root.as_str(), "nodes": zone.node_count()})
        ),
        OutputFormat::Text => {
            println!(
                "{} Published {} records under {}",
                "✓".green().bold(),
                zone.node_count(),
                args.root_name.yellow()
            );
            println!("  Root: {}", root.as_str().cyan());
        }
    }
    Ok(())
}

async fn cmd_keygen(
    args: KeygenArgs,
    ipfs_bin: Option<String>,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let client = kubo(&args.data_path, ipfs_bin)?;
    let key = client
        .generate_key(&args.name)
        .await
        .with_context(|| format!("generating key `{}`", args.name))?;
    match format {
        OutputFormat::Json => println!("{}", json!({"name": args.name, "key": key.as_str()})),
        OutputFormat::Text => println!(
            "{} Generated {} {}",
            "✓".green().bold(),
            args.name.yellow(),
            key.as_str().cyan()
        ),
    }
    Ok(())
}

async fn cmd_keys(
    args: KeysArgs,
    ipfs_bin: Option<String>,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let client = kubo(&args.data_path, ipfs_bin)?;
    let keys = client.list_keys().await.context("listing keys")?;
    match format {
        OutputFormat::Json => {
            let entries: Vec<_> = keys
                .iter()
                .map(|(name, key)| json!({"name": name, "key": key.as_str()}))
                .collect();
            println!("{}", serde_json::Value::Array(entries));
        }
        OutputFormat::Text if keys.is_empty() => println!("No keys."),
        OutputFormat::Text => {
            for (name, key) in &keys {
                println!("{}  {}", key.as_str().cyan(), name.yellow());
            }
        }
    }
    Ok(())
}
