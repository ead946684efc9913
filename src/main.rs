//! tabscribe - summarize open browser tabs and export them as Markdown

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};

use tabscribe::browser::adapters::chrome::ChromeAppleScriptAdapter;
use tabscribe::browser::adapters::url_list::UrlListAdapter;
use tabscribe::browser::BrowserAdapter;
use tabscribe::platform::PlatformDetector;
use tabscribe::settings::SettingsManager;
use tabscribe::{logging, AppError, Commands, Report, Sink};

#[derive(Parser)]
#[command(name = "tabscribe")]
#[command(about = "Summarize open browser tabs with Gemini and export them as Markdown")]
#[command(version)]
struct Cli {
    /// Where tabs come from
    #[arg(short, long, value_enum, default_value_t = BrowserKind::Chrome, global = true)]
    browser: BrowserKind,

    /// URL to treat as an open tab (with --browser urls); repeatable
    #[arg(short, long = "url", global = true)]
    urls: Vec<String>,

    /// File with one `URL` or `URL|||Title` per line (with --browser urls)
    #[arg(long, global = true)]
    url_file: Option<PathBuf>,

    /// Settings file (default: ~/.tabscribe/settings.json)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum BrowserKind {
    /// Google Chrome through AppleScript (macOS)
    Chrome,
    /// The URLs given with --url or --url-file
    Urls,
}

#[derive(Clone, Copy, ValueEnum)]
enum Target {
    Clipboard,
    File,
    Obsidian,
}

impl From<Target> for Sink {
    fn from(target: Target) -> Self {
        match target {
            Target::Clipboard => Sink::Clipboard,
            Target::File => Sink::File,
            Target::Obsidian => Sink::Obsidian,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Summarize every open tab
    Summarize {
        #[arg(long, value_enum, default_value_t = Target::Clipboard)]
        to: Target,
    },

    /// List every open tab as a link, without summaries
    Links {
        #[arg(long, value_enum, default_value_t = Target::Clipboard)]
        to: Target,
    },

    /// Analyze the active YouTube video and append it to Obsidian
    Research {
        /// Prompt to use instead of the saved one; `{transcript}` marks where the transcript goes
        #[arg(long)]
        prompt: Option<String>,
    },

    /// Copy the transcript of the active YouTube video
    Transcript,

    /// Collect the Watch Later playlist in the active tab and append it to Obsidian
    WatchLater,

    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the current settings
    Show,

    /// Set one setting by its key (e.g. obsidian_vault, gemini_api_key, proxies)
    Set { key: String, value: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(logging::logs_dir().as_deref());

    match run(cli).await {
        Ok(report) => {
            println!("{}", report.status);
            if let Some(details) = report.details {
                println!("\n{}", details);
            }
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<Report, AppError> {
    let settings = match &cli.settings {
        Some(path) => SettingsManager::new_with_path(path.clone()),
        None => SettingsManager::new(),
    }
    .map_err(AppError::Settings)?;

    match cli.browser {
        BrowserKind::Chrome => {
            let adapter = ChromeAppleScriptAdapter::new();
            if !PlatformDetector::supports_chrome_scripting() {
                return Err(AppError::Browser(
                    "Chrome scripting is only available on macOS; use --browser urls".to_string(),
                ));
            }
            if !adapter.is_available() {
                return Err(AppError::Browser(
                    "Google Chrome is not running; start it or use --browser urls".to_string(),
                ));
            }
            dispatch(Commands::new(adapter, settings)?, cli.command).await
        }
        BrowserKind::Urls => {
            let mut lines = cli.urls.join("\n");
            if let Some(path) = &cli.url_file {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| AppError::FileIO(format!("Failed to read {}: {}", path.display(), e)))?;
                lines.push('\n');
                lines.push_str(&text);
            }
            dispatch(Commands::new(UrlListAdapter::from_lines(&lines), settings)?, cli.command).await
        }
    }
}

async fn dispatch<A: BrowserAdapter>(mut commands: Commands<A>, command: Command) -> Result<Report, AppError> {
    match command {
        Command::Summarize { to } => commands.save_tabs(to.into(), true).await,
        Command::Links { to } => commands.save_tabs(to.into(), false).await,
        Command::Research { prompt } => commands.research(prompt.as_deref()).await,
        Command::Transcript => commands.copy_transcript().await,
        Command::WatchLater => commands.export_watch_later().await,
        Command::Config { action: ConfigAction::Show } => {
            let mut settings = commands.settings();
            if !settings.gemini_api_key.is_empty() {
                settings.gemini_api_key = "********".to_string();
            }
            let json = serde_json::to_string_pretty(&settings)
                .map_err(|e| AppError::Settings(format!("Failed to serialize settings: {}", e)))?;
            Ok(Report {
                status: json,
                details: None,
            })
        }
        Command::Config {
            action: ConfigAction::Set { key, value },
        } => {
            let mut settings = commands.settings();
            settings.set_field(&key, &value).map_err(AppError::Settings)?;
            info!("Config: Setting {}", key);
            commands.save_settings(settings)
        }
    }
}
