//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use briefcast_core::{check_status, generate_briefing, render_markdown};
use briefcast_shared::{ApiConfig, BriefingRequest, ConfigSource, SearchMode, store_path};
use briefcast_sources::{DEFAULT_FRESH_TTL_MS, SourceRegistry, fetch_with_cache};
use briefcast_storage::FeedCache;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// briefcast — assemble the daily briefing from search, extraction, and LLM synthesis.
#[derive(Parser)]
#[command(
    name = "briefcast",
    version,
    about = "Generate multi-section briefing documents with web retrieval and LLM synthesis.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Retrieval mode flag.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum ModeArg {
    /// Search the web and extract source bodies before generating.
    Web,
    /// Generate from section prompts alone.
    Skip,
}

impl From<ModeArg> for SearchMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Web => SearchMode::Web,
            ModeArg::Skip => SearchMode::Skip,
        }
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate a briefing document.
    Generate {
        /// Retrieval mode; overrides the request file when both are given.
        #[arg(short, long)]
        mode: Option<ModeArg>,

        /// JSON file with per-section overrides and an optional search mode.
        #[arg(short, long)]
        request: Option<PathBuf>,

        /// Emit the raw JSON response instead of rendered markdown.
        #[arg(long)]
        json: bool,

        /// Write the output to a file instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Check reachability of the configured providers.
    Status {
        /// Emit the raw JSON report.
        #[arg(long)]
        json: bool,
    },

    /// Fetch the registered feed sources.
    Feeds {
        /// Fetch a single source by identifier.
        #[arg(short, long)]
        source: Option<String>,

        /// Bypass the feed cache entirely.
        #[arg(long)]
        no_cache: bool,
    },

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
    /// Show the resolved configuration snapshot.
    Show,
    /// Save provider credentials, replacing the stored configuration.
    Set {
        /// Search provider API key.
        #[arg(long)]
        search_key: Option<String>,

        /// Content reader API key.
        #[arg(long)]
        reader_key: Option<String>,

        /// Generation provider API key.
        #[arg(long)]
        llm_key: Option<String>,

        /// Generation provider base URL.
        #[arg(long)]
        llm_base_url: Option<String>,

        /// Generation provider model name.
        #[arg(long)]
        llm_model: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "briefcast=info",
        1 => "briefcast=debug",
        _ => "briefcast=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Generate {
            mode,
            request,
            json,
            out,
        } => cmd_generate(mode, request.as_deref(), json, out.as_deref()).await,
        Command::Status { json } => cmd_status(json).await,
        Command::Feeds { source, no_cache } => cmd_feeds(source.as_deref(), no_cache).await,
        Command::Config { action } => match action {
            ConfigAction::Show => cmd_config_show().await,
            ConfigAction::Set {
                search_key,
                reader_key,
                llm_key,
                llm_base_url,
                llm_model,
            } => cmd_config_set(search_key, reader_key, llm_key, llm_base_url, llm_model).await,
        },
    }
}

// ---------------------------------------------------------------------------
// generate
// ---------------------------------------------------------------------------

async fn cmd_generate(
    mode: Option<ModeArg>,
    request_path: Option<&std::path::Path>,
    json: bool,
    out: Option<&std::path::Path>,
) -> Result<()> {
    let mut request: BriefingRequest = match request_path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| eyre!("cannot read request file '{}': {e}", path.display()))?;
            serde_json::from_str(&raw)
                .map_err(|e| eyre!("invalid request file '{}': {e}", path.display()))?
        }
        None => BriefingRequest::default(),
    };

    if let Some(mode) = mode {
        request.search_mode = Some(mode.into());
    }

    let runtime = briefcast_config::resolve_runtime().await?;

    info!(
        mode = ?request.search_mode.unwrap_or_default(),
        overrides = request.sections.as_ref().map(Vec::len).unwrap_or(0),
        "generating briefing"
    );

    let spinner = progress_spinner("Gathering context and generating sections");
    let result = generate_briefing(&runtime, request).await;
    spinner.finish_and_clear();
    let response = result?;

    let rendered = if json {
        serde_json::to_string_pretty(&response)?
    } else {
        render_markdown(&response)
    };

    match out {
        Some(path) => {
            std::fs::write(path, &rendered)
                .map_err(|e| eyre!("cannot write '{}': {e}", path.display()))?;
            println!("Briefing written to {}", path.display());
        }
        None => println!("{rendered}"),
    }

    let reference_count: usize = response.sections.iter().map(|s| s.references.len()).sum();
    println!();
    println!("  Sections:   {}", response.sections.len());
    println!("  References: {reference_count}");
    println!("  Mode:       {}", mode_name(response.search_mode));
    println!();

    Ok(())
}

fn mode_name(mode: SearchMode) -> &'static str {
    match mode {
        SearchMode::Web => "web",
        SearchMode::Skip => "skip",
    }
}

fn progress_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner.set_message(message.to_string());
    spinner
}

// ---------------------------------------------------------------------------
// status
// ---------------------------------------------------------------------------

async fn cmd_status(json: bool) -> Result<()> {
    let runtime = briefcast_config::resolve_runtime().await?;
    let report = check_status(&runtime).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("config source: {}", source_name(report.source));
    for status in &report.statuses {
        let marker = if status.ok { "ok" } else { "fail" };
        match status.latency_ms {
            Some(latency) => {
                println!("- [{marker}] {}: {} ({latency}ms)", status.label, status.message);
            }
            None => println!("- [{marker}] {}: {}", status.label, status.message),
        }
    }

    Ok(())
}

fn source_name(source: ConfigSource) -> &'static str {
    match source {
        ConfigSource::Persisted => "persisted",
        ConfigSource::Environment => "environment",
        ConfigSource::None => "none",
    }
}

// ---------------------------------------------------------------------------
// feeds
// ---------------------------------------------------------------------------

async fn cmd_feeds(source_id: Option<&str>, no_cache: bool) -> Result<()> {
    let registry = SourceRegistry::new()?;
    let cache = if no_cache {
        None
    } else {
        FeedCache::from_env().await
    };

    let selected: Vec<&dyn briefcast_sources::FeedSource> = match source_id {
        Some(id) => {
            let source = registry
                .get(id)
                .ok_or_else(|| eyre!("unknown feed source '{id}' (known: {:?})", registry.ids()))?;
            vec![source]
        }
        None => registry.iter().collect(),
    };

    for source in selected {
        match fetch_with_cache(source, cache.as_ref(), DEFAULT_FRESH_TTL_MS).await {
            Ok(feed) => {
                println!("{} ({}): {} items", source.label(), source.id(), feed.items.len());
                for item in feed.items.iter().take(10) {
                    println!("  - {}", item.title);
                    println!("    {}", item.url);
                }
            }
            Err(e) => {
                // One broken upstream should not hide the others.
                println!("{} ({}): fetch failed: {e}", source.label(), source.id());
            }
        }
        println!();
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_show() -> Result<()> {
    let snapshot = briefcast_config::snapshot().await?;

    println!("source:       {}", source_name(snapshot.source));
    println!("store exists: {}", snapshot.store_exists);
    println!("store path:   {}", store_path()?.display());
    println!();

    match &snapshot.config {
        Some(config) => {
            let toml_str = toml::to_string_pretty(config)?;
            println!("{toml_str}");
        }
        None => println!("(no configuration from any source)"),
    }

    Ok(())
}

async fn cmd_config_set(
    search_key: Option<String>,
    reader_key: Option<String>,
    llm_key: Option<String>,
    llm_base_url: Option<String>,
    llm_model: Option<String>,
) -> Result<()> {
    let config = ApiConfig {
        search_api_key: search_key,
        reader_api_key: reader_key,
        llm_api_key: llm_key,
        llm_base_url,
        llm_model,
        updated_at: None,
    };

    if !config.has_any_value() {
        return Err(eyre!(
            "nothing to save: provide at least one of --search-key, --reader-key, --llm-key, \
             --llm-base-url, --llm-model"
        ));
    }

    let snapshot = briefcast_config::save(&config).await?;
    println!(
        "Configuration saved (source: {}).",
        source_name(snapshot.source)
    );
    println!("Note: the stored row was fully replaced; omitted fields are now unset.");

    Ok(())
}
