use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

use food_search::client::HttpFoodProvider;
use food_search::config::{ProviderKind, SearchConfig};
use food_search::entry::{FoodField, ManualEntryController, VitaminField};
use food_search::search::{SearchController, SearchState};

#[derive(Parser)]
#[command(name = "food-search", version, about = "Search food nutrition data or enter it by hand")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search the configured food database
    #[command(alias = "food-search")]
    Search {
        /// Free-text query
        query: Vec<String>,
        /// `openfoodfacts` or `usda`, overrides FOOD_PROVIDER
        #[arg(long)]
        provider: Option<String>,
        /// Overrides FOOD_API_BASE_URL
        #[arg(long)]
        base_url: Option<String>,
        /// Print raw results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Enter a food's nutritional data by hand
    #[command(alias = "food-entry")]
    Entry {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        calories: Option<String>,
        /// Protein (g)
        #[arg(long)]
        protein: Option<String>,
        /// Carbs (g)
        #[arg(long)]
        carbs: Option<String>,
        /// Fat (g)
        #[arg(long)]
        fat: Option<String>,
        /// Repeatable, unit defaults to mg
        #[arg(long = "vitamin", value_name = "NAME:AMOUNT[:UNIT]")]
        vitamins: Vec<String>,
    },
}

fn init_tracing() {
    let env_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "food_search=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    match Cli::parse().command {
        Command::Search {
            query,
            provider,
            base_url,
            json,
        } => run_search(&query.join(" "), provider, base_url, json).await,
        Command::Entry {
            name,
            calories,
            protein,
            carbs,
            fat,
            vitamins,
        } => run_entry(
            [
                (FoodField::Name, name),
                (FoodField::Calories, calories),
                (FoodField::Protein, protein),
                (FoodField::Carbs, carbs),
                (FoodField::Fat, fat),
            ],
            &vitamins,
        ),
    }
}

async fn run_search(
    query: &str,
    provider: Option<String>,
    base_url: Option<String>,
    json: bool,
) -> Result<()> {
    let provider = provider
        .map(|p| p.parse::<ProviderKind>())
        .transpose()?;
    let mut config = SearchConfig::from_env_with_provider(provider)?;
    if let Some(base_url) = base_url {
        config = config.with_base_url(base_url);
    }

    let controller = SearchController::new(Arc::new(HttpFoodProvider::new(config)?));

    match controller.submit_query(query).await {
        SearchState::Success(results) if json => {
            println!("{}", serde_json::to_string_pretty(&results)?);
            Ok(())
        }
        state @ SearchState::Success(_) => {
            println!("Results\n");
            for summary in state.summaries() {
                println!("{}\n", summary);
            }
            Ok(())
        }
        SearchState::Failure(message) => Err(anyhow!(message)),
        other => Err(anyhow!("search did not settle: {:?}", other)),
    }
}

fn run_entry(fields: [(FoodField, Option<String>); 5], vitamins: &[String]) -> Result<()> {
    let mut controller = ManualEntryController::new();

    for (field, value) in fields {
        if let Some(value) = value {
            controller.set_field(field, value);
        }
    }

    for vitamin in vitamins {
        let mut parts = vitamin.splitn(3, ':');
        let index = controller.add_vitamin_row();
        controller.set_vitamin_field(index, VitaminField::Name, parts.next().unwrap_or(""))?;
        controller.set_vitamin_field(index, VitaminField::Amount, parts.next().unwrap_or(""))?;
        if let Some(unit) = parts.next() {
            controller.set_vitamin_field(index, VitaminField::Unit, unit)?;
        }
    }

    match controller.submit() {
        Ok(submission) => {
            println!("{}", serde_json::to_string_pretty(&submission.record)?);
            if let Some(message) = controller.success_message() {
                println!("{}", message);
            }
            Ok(())
        }
        Err(food_search::error::EntryError::Validation(errors)) => {
            for error in &errors {
                eprintln!("  {}", error);
            }
            Err(anyhow!("food entry rejected: {} invalid field(s)", errors.len()))
        }
        Err(e) => Err(e.into()),
    }
}
