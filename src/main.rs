use std::{path::PathBuf, process::ExitCode, str::FromStr};

use clap::{Parser, Subcommand};
use lootcase::{
    catalog::{files::load_catalog, Catalog},
    drops,
};
use rand::{rngs::StdRng, SeedableRng};

#[derive(Parser)]
#[command(name = "lootcase", about = "Inspect loot case data and open cases")]
struct Cli {
    /// Directory holding rarities.json, skins.json and cases.json.
    #[arg(long, env = "LOOTCASE_DATA", default_value = "data")]
    data: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check the catalog, failing if any case lists an unknown item.
    Validate,

    /// List rarities and cases.
    List,

    /// Print the drop chance of every item in a case.
    Odds { case: String },

    /// Open a case and print the awarded items as JSON.
    Open {
        case: String,

        #[arg(short, long, default_value_t = 1)]
        count: usize,

        /// Seed for reproducible draws.
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn validate(catalog: &Catalog) -> Result<(), String> {
    let dangling = catalog.dangling_references();
    for (case, item) in &dangling {
        println!("{case}: unknown item {item}");
    }
    println!(
        "{} rarities, {} items, {} cases, {} unknown item references.",
        catalog.rarities().len(),
        catalog.items().len(),
        catalog.cases().len(),
        dangling.len()
    );

    if dangling.is_empty() {
        Ok(())
    } else {
        Err("Catalog contains cases with unknown items.".to_string())
    }
}

fn list(catalog: &Catalog) {
    println!("Rarities:");
    for rarity in catalog.rarities() {
        let (min, max) = rarity.value_range();
        println!(
            "  {:<20} weight {:<10} value {min:.2} - {max:.2}",
            rarity.name(),
            rarity.weight()
        );
    }

    println!("Cases:");
    for case in catalog.cases() {
        println!(
            "  {:<20} ${:<8.2} {} items",
            case.name(),
            case.price(),
            case.items().len()
        );
    }
}

fn odds(catalog: &Catalog, case: &str) -> Result<(), String> {
    for odds in drops::odds(case, catalog).map_err(|e| e.to_string())? {
        println!(
            "{:>8.4}%  {} ({})",
            odds.chance * 100.0,
            odds.item,
            odds.rarity
        );
    }
    Ok(())
}

fn open(catalog: &Catalog, case: &str, count: usize, seed: Option<u64>) -> Result<(), String> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let items = drops::open_cases(case, count, catalog, &mut rng).map_err(|e| e.to_string())?;
    let total: f64 = items.iter().map(|item| item.value).sum();
    tracing::debug!("Opened {count} x {case:?} worth {total:.2}.");

    let json = serde_json::ser::to_string_pretty(&items).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

fn to_log_level(env: String) -> Option<tracing::Level> {
    tracing::Level::from_str(&env.to_uppercase()).ok()
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = std::env::var("LOG_LEVEL")
        .ok()
        .and_then(to_log_level)
        .unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    let catalog = match load_catalog(&cli.data).await {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!("Failed to load catalog: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Command::Validate => validate(&catalog),
        Command::List => {
            list(&catalog);
            Ok(())
        }
        Command::Odds { case } => odds(&catalog, &case),
        Command::Open { case, count, seed } => open(&catalog, &case, count, seed),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
