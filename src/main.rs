//! citycast CLI
//!
//! One-shot forecasts, place suggestions and an interactive search prompt.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use citycast::config::LoggingConfig;
use citycast::display::{self, OutputFormat};
use citycast::{
    CityQuery, CitycastConfig, CitycastError, DayCount, ForecastOrchestrator, OpenMeteoClient,
    SearchContext, SearchOutcome, Suggestion,
};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// citycast - weather for any city
#[derive(Parser)]
#[command(name = "citycast")]
#[command(author, version, about = "City weather lookup from the terminal", long_about = None)]
struct Cli {
    /// Configuration file (default: <config dir>/citycast/config.toml)
    #[arg(short, long, global = true, env = "CITYCAST_CONFIG")]
    config: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the forecast for a city
    ///
    /// Example: citycast forecast "Chicago, Illinois" --days 1
    Forecast {
        /// City, optionally followed by a comma and a state or country
        city: Option<String>,

        /// Number of days to show (1, 3 or 7)
        #[arg(short, long)]
        days: Option<DayCount>,

        /// Print the rendered view as JSON
        #[arg(long)]
        json: bool,
    },

    /// List places matching partially typed input
    ///
    /// Example: citycast suggest "Springfield, Mi"
    Suggest {
        /// Place name, optionally followed by a comma and a state prefix
        input: String,
    },

    /// Search interactively
    Interactive,
}

/// Determine log filter level from verbosity count
fn log_filter(verbose: u8, logging: &LoggingConfig) -> String {
    match verbose {
        0 => logging.level.clone(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

fn init_logging(verbose: u8, logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter(verbose, logging)));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<CitycastError>() {
                Some(err) => eprintln!("{}", err.user_message()),
                None => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = CitycastConfig::load_from_path(cli.config)?;
    init_logging(cli.verbose, &config.logging);

    let client = OpenMeteoClient::new(&config)?;
    let orchestrator = ForecastOrchestrator::new(Arc::new(client), &config);
    let default_days = DayCount::try_from(config.display.default_days)?;

    match cli.command {
        Commands::Forecast { city, days, json } => {
            let input = city.unwrap_or_else(|| config.display.default_city.clone());
            let ctx = SearchContext::new(CityQuery::parse(&input)?, days.unwrap_or(default_days));
            let format = if json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            };

            if let SearchOutcome::Rendered(view) = orchestrator.show_forecast(ctx).await? {
                display::write_view(&mut std::io::stdout().lock(), &view, format)?;
            }
        }

        Commands::Suggest { input } => {
            let suggestions = orchestrator.suggest(&input).await?;
            display::write_suggestions(&mut std::io::stdout().lock(), &suggestions)?;
        }

        Commands::Interactive => interactive(&orchestrator, default_days).await?,
    }

    Ok(())
}

const HELP: &str = "Type a place to see suggestions. #N picks suggestion N, \
/search CITY searches directly, :1 :3 :7 change the day count, :q quits.";

/// One line of interactive input
#[derive(Debug, PartialEq)]
enum Command<'a> {
    Empty,
    Quit,
    Help,
    /// `:N`, change the day count; `None` when N is not 1, 3 or 7
    Days(Option<DayCount>),
    /// `#N`, 1-based; `None` when N is not a number
    Pick(Option<usize>),
    /// `/search TEXT`
    Search(&'a str),
    /// Anything else starting with `/`
    Unknown(&'a str),
    Suggest(&'a str),
}

fn parse_command(line: &str) -> Command<'_> {
    let line = line.trim();
    match line {
        "" => Command::Empty,
        ":q" | ":quit" => Command::Quit,
        ":h" | ":help" => Command::Help,
        _ => {
            if let Some(days) = line.strip_prefix(':') {
                Command::Days(days.parse().ok())
            } else if let Some(number) = line.strip_prefix('#') {
                Command::Pick(number.trim().parse().ok())
            } else if line == "/search" {
                Command::Search("")
            } else if let Some(text) = line
                .strip_prefix("/search")
                .filter(|rest| rest.starts_with(char::is_whitespace))
            {
                Command::Search(text.trim())
            } else if line.starts_with('/') {
                Command::Unknown(line)
            } else {
                Command::Suggest(line)
            }
        }
    }
}

/// Line-based prompt; errors are reported and the prompt continues
async fn interactive(orchestrator: &ForecastOrchestrator, mut days: DayCount) -> anyhow::Result<()> {
    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut suggestions: Vec<Suggestion> = Vec::new();

    loop {
        print!("> ");
        std::io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };
        debug!("Interactive input: {:?}", line);

        let result = match parse_command(&line) {
            Command::Empty => Ok(()),
            Command::Quit => break,
            Command::Help | Command::Unknown(_) => {
                println!("{HELP}");
                Ok(())
            }
            Command::Days(Some(new_days)) => {
                days = new_days;
                match orchestrator.last_query() {
                    Some(query) => search(orchestrator, SearchContext::new(query, days)).await,
                    None => {
                        println!("Showing {days} days from the next search.");
                        Ok(())
                    }
                }
            }
            Command::Days(None) => Err(CitycastError::validation("days must be 1, 3 or 7")),
            Command::Pick(number) => match number.and_then(|n| pick(&suggestions, n)) {
                Some(suggestion) => {
                    let query = CityQuery {
                        name: suggestion.candidate.name.clone(),
                        state: suggestion.candidate.admin1.clone(),
                        coordinates: None,
                    };
                    orchestrator.select(suggestion.clone());
                    search(orchestrator, SearchContext::new(query, days)).await
                }
                None => {
                    println!("No such suggestion; type a place name first.");
                    Ok(())
                }
            },
            Command::Search(text) => match CityQuery::parse(text) {
                Ok(query) => search(orchestrator, SearchContext::new(query, days)).await,
                Err(e) => Err(e),
            },
            Command::Suggest(text) => match orchestrator.suggest(text).await {
                Ok(found) => {
                    suggestions = found;
                    display::write_suggestions(&mut std::io::stdout().lock(), &suggestions)
                }
                Err(e) => Err(e),
            },
        };

        if let Err(e) = result {
            eprintln!("{}", e.user_message());
        }
    }

    Ok(())
}

/// Suggestion `number`, counting from 1
fn pick(suggestions: &[Suggestion], number: usize) -> Option<&Suggestion> {
    suggestions.get(number.checked_sub(1)?)
}

async fn search(orchestrator: &ForecastOrchestrator, ctx: SearchContext) -> citycast::Result<()> {
    if let SearchOutcome::Rendered(view) = orchestrator.show_forecast(ctx).await? {
        display::write_view(&mut std::io::stdout().lock(), &view, OutputFormat::Text)?;
    }
    Ok(())
}
