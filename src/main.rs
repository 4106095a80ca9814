use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

mod config;

use betledger::{Bet, Grouping, MarketQuote, Odds, Reporter};
use config::{Command, Config};

/// Input to `betledger evaluate`.
#[derive(Debug, Deserialize)]
struct CandidateRequest {
    bet: Bet,
    #[serde(default)]
    market: Option<MarketQuote>,
    #[serde(default)]
    fair_probability: Option<f64>,
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    config.validate()?;

    let reporter = Reporter::new(config.report_config())?;
    debug!(config = ?reporter.config(), "Reporter ready");

    match &config.command {
        Command::Summary {
            input,
            from,
            to,
            group_by,
        } => {
            let bets: Vec<Bet> = load_json(input)?;
            let range = config::date_range(*from, *to);
            info!("Loaded {} bet(s) from {}", bets.len(), input.display());

            let summary = reporter.summarize(&bets, range.as_ref())?;
            if summary.is_empty() {
                info!("No bets in the requested window");
            }

            match group_by {
                Some(group_by) => {
                    let grouping = Grouping::from(*group_by);
                    let groups = reporter.breakdown(&bets, range.as_ref(), grouping)?;
                    info!("Grouped into {} bucket(s) by {:?}", groups.len(), grouping);
                    print_json(&serde_json::json!({ "summary": summary, "groups": groups }))?;
                }
                None => print_json(&summary)?,
            }
        }

        Command::Evaluate { input } => {
            let request: CandidateRequest = load_json(input)?;
            let evaluation = match (&request.market, request.fair_probability) {
                (Some(_), Some(_)) => {
                    anyhow::bail!("candidate may carry a market or a fair_probability, not both")
                }
                (None, Some(p)) => reporter.evaluate_with_probability(&request.bet, p)?,
                (market, None) => reporter.evaluate_candidate(&request.bet, market.as_ref())?,
            };
            if let Some(edge) = evaluation.edge {
                info!("Candidate {} edge: {:+.2}%", request.bet.id, edge * 100.0);
            }
            print_json(&evaluation)?;
        }

        Command::Convert { odds } => {
            let odds: Odds = odds
                .parse()
                .with_context(|| format!("could not parse odds '{}'", odds))?;
            print_json(&reporter.convert_odds(&odds)?)?;
        }
    }

    Ok(())
}

fn load_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
