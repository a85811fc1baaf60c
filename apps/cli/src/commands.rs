//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use steplab_core::Tutorial;
use steplab_server::{AppState, CachePolicy};
use steplab_shared::{
    AppConfig, Article, ContentLayout, FileRequest, ResolvedSource, Step, init_config,
    load_config, load_config_from,
};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// StepLab: serve a tutorial where every step builds on the one before.
#[derive(Parser)]
#[command(
    name = "steplab",
    version,
    about = "Serve step-by-step tutorial trees with layered, inherited assets.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ~/.steplab/steplab.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Tutorial root holding the step directories. Overrides `content.root`.
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Start the HTTP server.
    Serve {
        /// Listen address. Overrides `server.addr`.
        #[arg(long)]
        addr: Option<String>,

        /// Listen port, keeping the configured host.
        #[arg(long, env = "PORT")]
        port: Option<u16>,
    },

    /// Seed a step with the files of the step before it.
    Init {
        /// Step name, e.g. `step3`.
        step: String,
    },

    /// Show where a step file would be served from.
    Resolve {
        /// Step name, e.g. `step3`.
        step: String,

        /// File name inside the step.
        file: String,

        /// Resolve inside an article sub-directory of the step.
        #[arg(long)]
        article: Option<String>,
    },

    /// List the steps present under the tutorial root.
    Steps,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "steplab=info",
        1 => "steplab=debug,tower_http=debug",
        _ => "steplab=trace,tower_http=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref(), cli.root.as_deref())?;

    match cli.command {
        Command::Serve { addr, port } => cmd_serve(&settings, addr.as_deref(), port).await,
        Command::Init { step } => cmd_init(&settings, &step).await,
        Command::Resolve {
            step,
            file,
            article,
        } => cmd_resolve(&settings, &step, &file, article.as_deref()).await,
        Command::Steps => cmd_steps(&settings).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(&settings).await,
        },
    }
}

/// Loaded config plus the layout it resolves to after CLI overrides.
struct Settings {
    config: AppConfig,
    layout: ContentLayout,
}

impl Settings {
    fn load(path: Option<&Path>, root: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => load_config_from(p)?,
            None => load_config()?,
        };
        if let Some(root) = root {
            config.content.root = root.to_string_lossy().into_owned();
        }
        let layout = ContentLayout::from(&config);
        Ok(Self { config, layout })
    }

    fn tutorial(&self) -> Result<Tutorial> {
        Ok(Tutorial::new(self.layout.clone())?)
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_serve(settings: &Settings, addr: Option<&str>, port: Option<u16>) -> Result<()> {
    let addr = listen_addr(addr.unwrap_or(&settings.config.server.addr), port);
    let state = AppState::new(
        settings.tutorial()?,
        CachePolicy::from(&settings.config.server),
    );

    info!(
        addr = %addr,
        root = %settings.layout.root.display(),
        "starting tutorial server"
    );
    steplab_server::run(&addr, state)
        .await
        .map_err(|e| eyre!("server on {addr} failed: {e}"))
}

async fn cmd_init(settings: &Settings, step: &str) -> Result<()> {
    let step = Step::parse(step)?;
    let tutorial = settings.tutorial()?;
    let outcome = tutorial
        .initializer
        .initialize(step)
        .await?
        .into_result(step)?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

async fn cmd_resolve(
    settings: &Settings,
    step: &str,
    file: &str,
    article: Option<&str>,
) -> Result<()> {
    let step = Step::parse(step)?;
    let article = article.map(Article::parse).transpose()?;
    let tutorial = settings.tutorial()?;

    let request = FileRequest::new(step, article, file);
    let source = tutorial.resolver.resolve(&request).await?;

    match &source {
        ResolvedSource::NotFound => {
            return Err(eyre!("{step}/{file} does not resolve to any file"));
        }
        ResolvedSource::Synthesized(asset) => {
            println!("{:<8} {}", "origin", source.origin());
            println!("{:<8} {}", "length", asset.content_length());
            println!("{:<8} {}", "etag", asset.etag);
        }
        ResolvedSource::StepSpecific(path) | ResolvedSource::SharedBase(path) => {
            println!("{:<8} {}", "origin", source.origin());
            println!("{:<8} {}", "path", path.display());
        }
    }
    Ok(())
}

async fn cmd_steps(settings: &Settings) -> Result<()> {
    let tutorial = settings.tutorial()?;
    let steps = tutorial.steps().await?;

    if steps.is_empty() {
        println!(
            "No steps found under {}",
            settings.layout.root.display()
        );
        return Ok(());
    }
    for step in steps {
        println!("{step}");
    }
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(settings: &Settings) -> Result<()> {
    let toml_str = toml::to_string_pretty(&settings.config)?;
    println!("{toml_str}");
    Ok(())
}

/// Swap the port of `addr` when one is given.
fn listen_addr(addr: &str, port: Option<u16>) -> String {
    match port {
        Some(port) => {
            let host = addr.rsplit_once(':').map_or(addr, |(host, _)| host);
            format!("{host}:{port}")
        }
        None => addr.to_string(),
    }
}
