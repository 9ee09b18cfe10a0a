//! `apiary` — convention-based Discord bot launcher.

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    apiary_bots::{BotDiscoverer, FsBotDiscoverer},
    apiary_discord::DiscordGateway,
    apiary_launcher::{
        ApiaryConfig, DEFAULT_HANDLERS_FOLDER, DEFAULT_INTENTS_FILE, discover_and_load,
        load_config,
    },
};

#[derive(Parser)]
#[command(name = "apiary", about = "apiary — convention-based Discord bot launcher")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file path (overrides the standard search locations).
    #[arg(long, global = true, env = "APIARY_CONFIG")]
    config: Option<PathBuf>,

    /// Bot token (overrides the config file value).
    #[arg(long, global = true, env = "APIARY_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Bots root directory (overrides the config file value).
    #[arg(long, global = true, env = "APIARY_BOTS_ROOT")]
    bots_root: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover bots and start the gateway session (the default).
    Start,
    /// Print every discovered bot with its intents and handler events.
    List,
}

fn init_tracing(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

fn load(cli: &Cli) -> anyhow::Result<ApiaryConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => discover_and_load(),
    };
    if let Some(token) = &cli.token {
        config.token = Some(token.clone());
    }
    if let Some(root) = &cli.bots_root {
        config.bots_root = Some(root.clone());
    }
    Ok(config)
}

async fn start(config: ApiaryConfig) -> anyhow::Result<()> {
    let mut launcher = config.into_launcher()?;
    let mut gateway = DiscordGateway::new();
    launcher.start(&mut gateway).await
}

fn list(config: &ApiaryConfig) -> anyhow::Result<()> {
    let root = config
        .bots_root
        .clone()
        .ok_or_else(|| anyhow::anyhow!("a bots root path must be set"))?;
    let discoverer = FsBotDiscoverer::new(
        root,
        config.handlers_folder.as_deref().unwrap_or(DEFAULT_HANDLERS_FOLDER),
        config.intents_file.as_deref().unwrap_or(DEFAULT_INTENTS_FILE),
    );

    let bots = discoverer.discover()?;
    if bots.is_empty() {
        println!("no bots found");
        return Ok(());
    }
    for bot in bots {
        println!("{}", bot.name);
        println!("  intents:  {}", bot.intents);
        for (event, handler) in &bot.handlers {
            println!("  handler:  {event} ({})", handler.path().display());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli);

    let config = load(&cli)?;
    match cli.command.unwrap_or(Commands::Start) {
        Commands::Start => {
            info!("starting apiary");
            start(config).await
        },
        Commands::List => list(&config),
    }
}
