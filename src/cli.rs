use crate::common::CommonParams;
use crate::config::{API_KEY_ENV, Config, resolve_api_key};
use crate::error::RizzError;
use crate::orchestrator::RequestOrchestrator;
use crate::provider::GeminiClient;
use crate::session::Session;
use crate::storage::Store;
use crate::types::{ImageData, Mode};
use crate::{log_debug, ui};
use anyhow::{Context, Result, anyhow, bail};
use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand, crate_version};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

const LOG_FILE: &str = "rizzmaster-debug.log";

/// Largest image accepted as an attachment
pub const MAX_FILE_SIZE_MB: u64 = 5;

/// Shown when a failure carries nothing worth showing the user
const GENERIC_FAILURE: &str = "Something went wrong. The AI got nervous.";

/// CLI structure defining the available commands and global arguments
#[derive(Parser)]
#[command(
    author,
    version = crate_version!(),
    about = "RizzMaster: AI wingman for replies and date plans",
    long_about = "RizzMaster reads a message or a screenshot of a conversation and suggests replies in the tone you want. Search mode plans dates using live web results.",
    disable_version_flag = true,
    after_help = get_dynamic_help(),
    styles = get_styles(),
)]
pub struct Cli {
    /// Subcommands available for the CLI
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log debug messages to a file
    #[arg(
        short = 'l',
        long = "log",
        global = true,
        help = "Log debug messages to a file"
    )]
    pub log: bool,

    /// Specify a custom log file path
    #[arg(
        long = "log-file",
        global = true,
        help = "Specify a custom log file path"
    )]
    pub log_file: Option<String>,

    /// Suppress non-essential output (spinners, waiting messages, etc.)
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress non-essential output"
    )]
    pub quiet: bool,

    /// Display the version
    #[arg(
        short = 'v',
        long = "version",
        global = true,
        help = "Display the version"
    )]
    pub version: bool,
}

/// Enumeration of available subcommands
#[derive(Subcommand)]
#[command(subcommand_negates_reqs = true)]
#[command(subcommand_precedence_over_arg = true)]
pub enum Commands {
    /// Generate reply suggestions
    #[command(
        about = "Generate reply suggestions for a message or screenshot",
        long_about = "Send a message, a screenshot, or both, and get three suggested replies. Use --more to ask for fresh options right away."
    )]
    Gen {
        #[command(flatten)]
        common: CommonParams,

        /// The message or context to answer
        #[arg(help = "The message or context to answer")]
        text: Option<String>,

        /// Image to attach (PNG, JPEG, WebP, GIF)
        #[arg(short, long, help = "Image to attach (max 5MB)")]
        image: Option<PathBuf>,

        /// Number of extra "load more" rounds
        #[arg(
            short = 'n',
            long,
            default_value_t = 0,
            help = "Ask for more options this many times after the first batch"
        )]
        more: u32,
    },

    /// Load better options for the most recent result
    #[command(
        about = "Load better options for the most recent result",
        long_about = "Ask again for the newest history entry. New options join the old ones and only the latest six are kept."
    )]
    More,

    /// Show or clear past results
    #[command(about = "Show or clear past results")]
    History {
        /// Delete all stored history
        #[arg(long, help = "Delete all stored history")]
        clear: bool,

        /// Print the full result of entry N (1 is the newest)
        #[arg(long, value_name = "N", help = "Print the full result of entry N")]
        show: Option<usize>,
    },

    /// Configure RizzMaster settings
    #[command(
        about = "Configure RizzMaster settings",
        long_about = "Set the API key and the default mode and tone. Run without options to print the current configuration."
    )]
    Config {
        #[command(flatten)]
        common: CommonParams,

        /// Store a Gemini API key
        #[arg(long, help = "Store a Gemini API key")]
        api_key: Option<String>,

        /// Remove the stored API key
        #[arg(long, help = "Remove the stored API key")]
        clear_api_key: bool,
    },
}

/// Define custom styles for Clap
fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Magenta.on_default().bold())
        .usage(AnsiColor::Cyan.on_default().bold())
        .literal(AnsiColor::Green.on_default().bold())
        .placeholder(AnsiColor::Yellow.on_default())
        .valid(AnsiColor::Blue.on_default().bold())
        .invalid(AnsiColor::Red.on_default().bold())
        .error(AnsiColor::Red.on_default().bold())
}

/// Parse the command-line arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Help footer listing the available modes
fn get_dynamic_help() -> String {
    use strum::IntoEnumIterator;

    let modes = Mode::iter()
        .map(|m| format!("{}", m.to_string().bold()))
        .collect::<Vec<_>>()
        .join(" • ");

    format!("\nAvailable Modes: {modes}\nAPI key: set {API_KEY_ENV} or run `rizzmaster config --api-key <KEY>`")
}

/// Main function to parse arguments and handle the command
pub async fn main() -> Result<()> {
    let cli = parse_args();

    if cli.version {
        ui::print_version(crate_version!());
        return Ok(());
    }

    if cli.log {
        crate::logger::enable_logging();
        let log_file = cli.log_file.as_deref().unwrap_or(LOG_FILE);
        crate::logger::set_log_file(log_file)?;

        // Load config to check for verbose logging settings
        if let Ok(config) = Config::load() {
            if config.verbose_logging {
                crate::logger::set_verbose_logging(true);
                log_debug!(
                    "Verbose logging enabled - will show HTTP requests and external library logs"
                );
            } else {
                log_debug!("Verbose logging disabled - hiding noisy external library logs");
            }
        }
    } else {
        crate::logger::disable_logging();
    }

    // Set quiet mode in the UI module
    if cli.quiet {
        ui::set_quiet_mode(true);
    }

    if let Some(command) = cli.command {
        handle_command(command).await
    } else {
        // If no subcommand is provided, print the help
        let _ = Cli::parse_from(["rizzmaster", "--help"]);
        Ok(())
    }
}

pub async fn handle_command(command: Commands) -> Result<()> {
    match command {
        Commands::Gen {
            common,
            text,
            image,
            more,
        } => handle_gen(common, text, image, more).await,
        Commands::More => handle_more().await,
        Commands::History { clear, show } => handle_history(clear, show),
        Commands::Config {
            common,
            api_key,
            clear_api_key,
        } => handle_config(&common, api_key, clear_api_key),
    }
}

/// Reads an image attachment, rejecting files above [`MAX_FILE_SIZE_MB`]
pub fn load_image(path: &Path) -> Result<ImageData> {
    let metadata = fs::metadata(path)
        .with_context(|| format!("Failed to read image {}", path.display()))?;
    if metadata.len() > MAX_FILE_SIZE_MB * 1024 * 1024 {
        bail!("File too large. Max {MAX_FILE_SIZE_MB}MB.");
    }

    let bytes = fs::read(path).with_context(|| format!("Failed to read image {}", path.display()))?;
    Ok(ImageData::from_bytes(
        &bytes,
        ImageData::mime_type_for_path(path),
    ))
}

/// Text shown to the user for a failed request
pub fn user_message(error: &RizzError) -> String {
    match error {
        RizzError::MissingCredential => format!(
            "{error}\nSet {API_KEY_ENV} or run `rizzmaster config --api-key <KEY>`."
        ),
        RizzError::Provider(_) | RizzError::MalformedResponse(_) => GENERIC_FAILURE.to_string(),
        _ => error.to_string(),
    }
}

fn build_orchestrator(config: &Config) -> RequestOrchestrator {
    let client = GeminiClient::new(config.api_base_url.clone());
    RequestOrchestrator::new(Box::new(client), config.models.clone())
}

fn resolve_key(store: &Store) -> Result<Option<String>> {
    resolve_api_key(std::env::var(API_KEY_ENV).ok(), store)
}

/// Handle the `Gen` command
async fn handle_gen(
    common: CommonParams,
    text: Option<String>,
    image: Option<PathBuf>,
    more: u32,
) -> Result<()> {
    log_debug!(
        "Handling 'gen' command with common: {:?}, image: {:?}, more: {}",
        common,
        image,
        more
    );

    let text = text.unwrap_or_default();
    let image = image.as_deref().map(load_image).transpose()?;
    if text.trim().is_empty() && image.is_none() {
        bail!("Nothing to answer. Pass a message, an --image, or both.");
    }

    let config = Config::load()?;
    let store = Store::open_default()?;
    let mode = common.effective_mode(&config);
    let tone = common.effective_tone(&config);
    let mut session = Session::new(build_orchestrator(&config), resolve_key(&store)?, mode, tone);

    let spinner = ui::create_spinner(mode.loading_message());
    let outcome = session.send(&text, image).await.map(|_| ());
    spinner.finish_and_clear();
    outcome.map_err(|e| anyhow!(user_message(&e)))?;

    for _ in 0..more {
        let spinner = ui::create_spinner(mode.loading_message());
        let outcome = session.load_more().await.map(|_| ());
        spinner.finish_and_clear();
        if let Err(e) = outcome {
            ui::print_warning(&user_message(&e));
            break;
        }
    }

    if let Some(result) = session.result() {
        ui::print_result(result);
    }
    if let Some(item) = session.to_history_item() {
        store.push_history(item)?;
    }
    Ok(())
}

/// Handle the `More` command
async fn handle_more() -> Result<()> {
    log_debug!("Handling 'more' command");

    let config = Config::load()?;
    let store = Store::open_default()?;
    let history = store.load_history();
    let Some(latest) = history.first() else {
        bail!(RizzError::NoPreviousResult);
    };

    let mut session = Session::restore(build_orchestrator(&config), resolve_key(&store)?, latest);

    let spinner = ui::create_spinner(latest.mode.loading_message());
    let outcome = session.load_more().await.map(|_| ());
    spinner.finish_and_clear();
    outcome.map_err(|e| anyhow!(user_message(&e)))?;

    if let Some(result) = session.result() {
        ui::print_result(result);

        let mut updated = latest.clone();
        updated.result = result.clone();
        store.replace_latest(updated)?;
    }
    Ok(())
}

/// Handle the `History` command
fn handle_history(clear: bool, show: Option<usize>) -> Result<()> {
    log_debug!("Handling 'history' command with clear: {}, show: {:?}", clear, show);

    let store = Store::open_default()?;
    if clear {
        store.clear_history()?;
        ui::print_success("History cleared.");
        return Ok(());
    }

    let history = store.load_history();
    match show {
        Some(n) => {
            let item = n
                .checked_sub(1)
                .and_then(|i| history.get(i))
                .ok_or_else(|| anyhow!("No history entry #{n}. There are {} entries.", history.len()))?;
            ui::print_info(&format!("{} [{}/{}]", item.label(), item.mode, item.tone));
            ui::print_result(&item.result);
        }
        None => ui::print_history(&history),
    }
    Ok(())
}

/// Handle the `Config` command
fn handle_config(common: &CommonParams, api_key: Option<String>, clear_api_key: bool) -> Result<()> {
    log_debug!(
        "Handling 'config' command with common: {:?}, api_key set: {}, clear_api_key: {}",
        common,
        api_key.is_some(),
        clear_api_key
    );

    let mut config = Config::load()?;
    let store = Store::open_default()?;

    let mut changes_made = common.apply_to_config(&mut config);
    if changes_made {
        config.save()?;
    }

    if let Some(key) = api_key {
        if key.trim().is_empty() {
            bail!("API key cannot be empty");
        }
        store.save_api_key(&key)?;
        changes_made = true;
    }
    if clear_api_key {
        store.clear_api_key()?;
        changes_made = true;
    }

    if changes_made {
        ui::print_success("Configuration updated successfully.");
        ui::print_newline();
    }

    print_configuration(&config, &store)
}

fn print_configuration(config: &Config, store: &Store) -> Result<()> {
    let key_status = if std::env::var(API_KEY_ENV).is_ok_and(|k| !k.trim().is_empty()) {
        format!("set (from {API_KEY_ENV})").green()
    } else if store.load_api_key()?.is_some() {
        "set (stored)".green()
    } else {
        "not set".red()
    };

    println!("{}", "RIZZMASTER CONFIGURATION".magenta().bold());
    println!("  {:<12} {}", "API key".cyan(), key_status);
    println!("  {:<12} {}", "Mode".cyan(), config.default_mode);
    println!("  {:<12} {}", "Tone".cyan(), config.default_tone);
    println!("  {:<12} {}", "Fast model".cyan(), config.models.fast);
    println!("  {:<12} {}", "Pro model".cyan(), config.models.pro);
    println!("  {:<12} {}", "Endpoint".cyan(), config.api_base_url);
    println!("  {:<12} {}", "Data dir".cyan(), store.dir().display());
    Ok(())
}
