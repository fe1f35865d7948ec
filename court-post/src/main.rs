//! court-post - Post a status update as one of the CourtLab accounts

use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use libcourtpost::logging::{LogFormat, LoggingConfig};
use libcourtpost::{
    credentials, Account, Config, CourtpostError, PostResult, Publisher, Result,
    TwitterClientFactory,
};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "court-post")]
#[command(version)]
#[command(about = "Post a status update to Twitter as a CourtLab account")]
#[command(long_about = "\
court-post - Post a status update to Twitter as a CourtLab account

USAGE:
    court-post courtlab \"New drills are up on the app\"
    echo \"Match day!\" | court-post esther -

ACCOUNTS:
    courtlab    @CourtLabApp
    esther      @EstherCourtLab

CREDENTIALS:
    A KEY=VALUE file (default: ~/.config/courtpost/.env.twitter) holding,
    for each account, <PREFIX>_API_KEY, <PREFIX>_API_SECRET,
    <PREFIX>_ACCESS_TOKEN and <PREFIX>_ACCESS_SECRET, where PREFIX is
    COURTLAB or ESTHER.

CONFIGURATION:
    Configuration file: ~/.config/courtpost/config.toml
    (override with COURTPOST_CONFIG)

EXIT CODES:
    0 - Posted
    1 - Configuration error or the service rejected the post
    2 - Missing or rejected credentials (also used for usage errors)
    3 - Unknown account or empty message
")]
struct Cli {
    /// Account to post as (courtlab or esther)
    account: String,

    /// Message text ("-" reads it from stdin)
    #[arg(allow_hyphen_values = true)]
    text: String,

    /// Credentials file (overrides the config file)
    #[arg(long, env = "COURTPOST_CREDENTIALS", value_name = "PATH")]
    credentials: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Resolve credentials and build the client without posting
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log format (text, json, pretty)
    #[arg(long, value_name = "FORMAT")]
    log_format: Option<LogFormat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

enum Outcome {
    Published(PostResult),
    DryRun { account: Account, chars: usize },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env(cli.verbose);
    if let Some(format) = cli.log_format {
        logging.format = format;
    }
    logging.init();

    let outcome = match run(&cli).await {
        Ok(outcome) => outcome,
        Err(e) => Outcome::Published(e.into()),
    };

    std::process::exit(report(&outcome, cli.format));
}

async fn run(cli: &Cli) -> Result<Outcome> {
    let config = Config::load()?;

    let credentials_path = cli
        .credentials
        .clone()
        .unwrap_or_else(|| config.credentials_path());
    debug!(path = %credentials_path.display(), "Loading credentials");
    let bundle = credentials::load(&credentials_path)?;

    let text = read_text(&cli.text)?;

    let publisher = Publisher::new(bundle, TwitterClientFactory::new(&config.api))
        .with_status_url_base(config.api.status_url_base.as_str());

    if cli.dry_run {
        let (account, _client) = publisher.prepare(&cli.account, &text)?;
        return Ok(Outcome::DryRun {
            account,
            chars: text.chars().count(),
        });
    }

    Ok(Outcome::Published(publisher.publish(&cli.account, &text).await))
}

/// The message itself, or stdin when it is `-`
fn read_text(arg: &str) -> Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|e| CourtpostError::InvalidInput(format!("Failed to read stdin: {}", e)))?;

    let trimmed = buffer.strip_suffix('\n').unwrap_or(&buffer);
    let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
    Ok(trimmed.to_string())
}

/// Print the outcome and return the exit code
fn report(outcome: &Outcome, format: OutputFormat) -> i32 {
    match (outcome, format) {
        (Outcome::Published(result), OutputFormat::Json) => {
            let line = serde_json::to_string(result)
                .unwrap_or_else(|e| format!("{{\"status\":\"failed\",\"reason\":\"{}\"}}", e));
            println!("{}", line);
            result.exit_code()
        }
        (Outcome::Published(result), OutputFormat::Text) => {
            match result {
                PostResult::Posted { id, url } => {
                    println!("Tweet posted! ID: {}", id);
                    println!("{}", url);
                }
                PostResult::Failed { reason, .. } => {
                    eprintln!("Error: {}", reason);
                }
            }
            result.exit_code()
        }
        (Outcome::DryRun { account, chars }, OutputFormat::Json) => {
            let value = serde_json::json!({
                "status": "dry_run",
                "account": account.alias(),
                "chars": chars,
            });
            println!("{}", value);
            0
        }
        (Outcome::DryRun { account, chars }, OutputFormat::Text) => {
            println!("Dry run: would post {} characters as {}", chars, account);
            0
        }
    }
}
