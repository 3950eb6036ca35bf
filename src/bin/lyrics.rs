use anyhow::Result;
use clap::{Parser, Subcommand};
use lyrics_engine::{
    LookupRequest, ResolveError, Resolver,
    config::Config,
    response::{ErrorResponse, LyricsResponse, MultiSearchResponse, status_for},
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lyrics")]
#[command(about = "Find song lyrics across lyrics sites", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search every source in order and print the first lyrics found
    Song {
        /// Song name, optionally with the artist
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
    /// Read lyrics straight from a supported song page
    Url {
        /// Page URL on one of the configured sources
        url: String,
    },
    /// List search candidates from every source
    Search {
        /// Song name, optionally with the artist
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Usage errors exit here with clap's own status, before any logging
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays pure JSON
    let logs = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr);
    if std::env::var("LYRICS_LOG_FORMAT").is_ok_and(|format| format == "json") {
        logs.json().init();
    } else {
        logs.init();
    }

    let config = Config::from_env()?;
    let resolver = Resolver::from_config(&config)?;

    let outcome = match cli.command {
        Command::Song { name } => resolver
            .resolve(&LookupRequest {
                song: Some(name.join(" ")),
                url: None,
            })
            .await
            .map(|record| to_json(&LyricsResponse::from(record))),
        Command::Url { url } => resolver
            .resolve(&LookupRequest {
                song: None,
                url: Some(url),
            })
            .await
            .map(|record| to_json(&LyricsResponse::from(record))),
        Command::Search { name } => resolver
            .search_all(&name.join(" "))
            .await
            .map(|search| to_json(&MultiSearchResponse::from(search))),
    };

    match outcome {
        Ok(body) => {
            println!("{}", body?);
            Ok(())
        }
        Err(err) => {
            println!("{}", to_json(&ErrorResponse::from(&err))?);
            std::process::exit(exit_code(&err));
        }
    }
}

/// Process status for a failed lookup. 2 belongs to clap's usage errors.
fn exit_code(err: &ResolveError) -> i32 {
    match status_for(err) {
        400 => 4,
        404 => 3,
        _ => 1,
    }
}

fn to_json<T: Serialize>(body: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(body)?)
}
