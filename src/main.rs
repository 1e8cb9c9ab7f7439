//! cfddns - dynamic DNS updater for Cloudflare A records.

use cfddns::cloudflare::CloudflareClient;
use cfddns::config::Config;
use cfddns::reconciler::run_cycle;
use cfddns::resolver::{HttpIpResolver, IpSource};
use cfddns::targets::parse_targets;
use cfddns::DnsApi;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "cfddns")]
#[command(about = "Dynamic DNS updater for Cloudflare-hosted A records")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current public IP and each target's record content
    Status,

    /// Run one update cycle
    Update,

    /// Run update cycles on a schedule
    Daemon {
        /// Seconds between cycles (overrides the configured interval)
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Validate configuration and target spec without touching the network
    Validate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cfddns=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Status => cmd_status(cli.config).await?,
        Commands::Update => cmd_update(cli.config).await?,
        Commands::Daemon { interval } => cmd_daemon(cli.config, interval).await?,
        Commands::Validate => cmd_validate(cli.config)?,
    }

    Ok(())
}

async fn cmd_status(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = Config::load(config_path.as_deref())?;
    let targets = parse_targets(&config.domains)?;
    let resolver = HttpIpResolver::with_endpoint(config.ip_endpoint.clone());
    let client = CloudflareClient::new(config.api_key.clone(), config.auth_email.clone());

    println!("cfddns Status");
    println!("=============\n");

    match resolver.resolve().await {
        Ok(ip) => println!("Current Public IP: {}", ip),
        Err(e) => println!("Failed to resolve IP: {}", e),
    }

    println!("\nTargets:");
    println!("-------");

    for target in &targets {
        print!("  {} ({}/{}): ", target.name, target.zone_id, target.record_id);

        match client.fetch_records(&target.zone_id).await {
            Ok(records) => {
                let matched = records.iter().find(|r| {
                    r.id == target.record_id
                        && r.zone_id == target.zone_id
                        && r.record_type == "A"
                });
                match matched {
                    Some(record) => println!("{}", record.content),
                    None => println!("(no matching A record)"),
                }
            }
            Err(e) => println!("error: {}", e),
        }
    }

    Ok(())
}

async fn cmd_update(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = Config::load(config_path.as_deref())?;
    let targets = parse_targets(&config.domains)?;
    let resolver = HttpIpResolver::with_endpoint(config.ip_endpoint.clone());
    let client = CloudflareClient::new(config.api_key.clone(), config.auth_email.clone());

    let report = run_cycle(&resolver, &client, &targets).await?;
    println!("Cycle complete: {}", report);

    Ok(())
}

async fn cmd_daemon(config_path: Option<PathBuf>, interval: Option<u64>) -> anyhow::Result<()> {
    // Fail fast on a broken configuration; later reloads only log.
    let config = Config::load(config_path.as_deref())?;
    let interval = Duration::from_secs(interval.unwrap_or(config.interval_secs));

    println!("Starting cfddns daemon (interval: {}s)", interval.as_secs());

    loop {
        // Configuration is re-read each cycle so targets and credentials can
        // change without a restart.
        match Config::load(config_path.as_deref()) {
            Ok(config) => run_daemon_cycle(&config).await,
            Err(e) => tracing::error!("Skipping cycle, configuration invalid: {}", e),
        }

        // Cycles never overlap: the next one is only scheduled after this
        // one has finished.
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => {
                println!("Interrupt received, stopping daemon");
                break;
            }
        }
    }

    Ok(())
}

async fn run_daemon_cycle(config: &Config) {
    let targets = match parse_targets(&config.domains) {
        Ok(targets) => targets,
        Err(e) => {
            tracing::error!("Skipping cycle, invalid target spec: {}", e);
            return;
        }
    };

    let resolver = HttpIpResolver::with_endpoint(config.ip_endpoint.clone());
    let client = CloudflareClient::new(config.api_key.clone(), config.auth_email.clone());

    match run_cycle(&resolver, &client, &targets).await {
        Ok(report) => tracing::info!("Cycle complete: {}", report),
        Err(e) => tracing::error!("Cycle failed: {}", e),
    }
}

fn cmd_validate(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    println!("Validating configuration...\n");

    let config = Config::load(config_path.as_deref())?;
    let targets = parse_targets(&config.domains)?;

    for target in &targets {
        println!(
            "  {} -> zone {} record {}",
            target.name, target.zone_id, target.record_id
        );
    }

    println!("\nConfiguration OK ({} target(s)).", targets.len());
    Ok(())
}
