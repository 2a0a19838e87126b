mod cli;
mod core;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "limitmon", about = "AI usage limit monitor", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<String>,

    /// Shorthand for --format json
    #[arg(short = 'j', long = "json", global = true)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    /// Debug diagnostics to stderr (same as `debug = true` in the config)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one aggregation pass and display the snapshot
    Usage {
        /// Show a single provider (anthropic/claude, openai/codex, gemini)
        #[arg(short, long)]
        provider: Option<String>,
    },
    /// Poll continuously and print each published snapshot
    Watch {
        /// Poll interval in minutes (overrides the configured value)
        #[arg(short, long)]
        interval: Option<u64>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Generate default config file
    Init,
    /// Print the current config (secrets redacted)
    Show,
    /// Validate config file
    Check,
    /// Set a config key
    Set {
        /// Key name as it appears in `config show`
        key: String,
        value: String,
    },
    /// Store a captured Anthropic web session and switch to web mode
    SetWebSession { cookie: String, org_id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let output_opts = cli::output::OutputOptions {
        format: if cli.json {
            cli::output::OutputFormat::Json
        } else {
            match cli.format.as_deref() {
                Some("json") => cli::output::OutputFormat::Json,
                _ => cli::output::OutputFormat::Text,
            }
        },
        pretty: cli.pretty,
        use_color: cli::output::detect_color(!cli.no_color),
    };

    match cli.command {
        None => cli::usage_cmd::run(None, &output_opts, cli.verbose).await?,
        Some(Commands::Usage { provider }) => {
            cli::usage_cmd::run(provider.as_deref(), &output_opts, cli.verbose).await?;
        }
        Some(Commands::Watch { interval }) => {
            cli::watch_cmd::run(interval, &output_opts, cli.verbose).await?;
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Init => cli::config_cmd::init(&output_opts)?,
            ConfigAction::Show => cli::config_cmd::show(&output_opts)?,
            ConfigAction::Check => cli::config_cmd::check(&output_opts)?,
            ConfigAction::Set { key, value } => {
                cli::config_cmd::set(&key, &value, &output_opts)?
            }
            ConfigAction::SetWebSession { cookie, org_id } => {
                cli::config_cmd::set_web_session(&cookie, &org_id)?
            }
        },
    }

    Ok(())
}
