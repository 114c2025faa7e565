use clap::{Parser, Subcommand};
use product_match_engine::{
    generate_variants, normalize, to_fts_query, CandidateSource, CatalogEntry, EngineConfig,
    MatchEngine, ResolveOutcome, SqliteCatalog, SqliteUnknownLog, UnknownLog,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "product-match")]
#[command(about = "Spoken product name matcher", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Database path (overrides config and DB_PATH)
    #[arg(short, long, global = true)]
    db: Option<String>,

    /// Config file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a spoken product name
    Resolve {
        /// Transcribed text
        text: String,

        /// Do not record unknown results
        #[arg(long)]
        no_record: bool,
    },

    /// Show the ranked candidates with score breakdown
    Rank {
        text: String,

        /// Maximum candidates shown
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Show query variants and the rendered FTS query
    Variants { text: String },

    /// Show normalized text
    Normalize { text: String },

    /// Add a product to the catalog
    Add {
        #[arg(short, long)]
        name: String,

        /// Comma-separated aliases
        #[arg(short, long, default_value = "")]
        aliases: String,
    },

    /// Import products from a JSON array of {name, aliases}
    Import { file: PathBuf },

    /// List catalog products
    List,

    /// List recorded unknown products
    Unknowns {
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Catalog and unknown-product statistics
    Stats,

    /// Drop unknown products not seen recently
    Cleanup {
        /// Maximum age in days
        #[arg(short, long, default_value = "30")]
        max_age_days: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = EngineConfig::load(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.database = db;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Normalize { text } => {
            println!("{}", normalize(&text));
        }

        Commands::Variants { text } => {
            let variants = generate_variants(&text);
            println!("🔤 Variants ({}):", variants.len());
            for variant in &variants {
                println!("   {}", variant);
            }
            println!("\n🔎 FTS query:\n   {}", to_fts_query(&variants));
        }

        Commands::Resolve { text, no_record } => {
            let catalog = Arc::new(SqliteCatalog::new(&config.database).await?);
            let engine = MatchEngine::with_weights(catalog, config.weights)?;

            match engine.resolve(&text).await {
                ResolveOutcome::AutoAdd { entry, score } => {
                    println!("✅ {} (score {:.3})", entry.name, score);
                }
                ResolveOutcome::Suggestions { ranked } => {
                    println!("🤔 Did you mean:");
                    for (i, candidate) in ranked.iter().enumerate() {
                        println!("   {}. {}", i + 1, candidate.display());
                    }
                }
                ResolveOutcome::Unknown { original_text } => {
                    println!("❓ Unknown product: {}", original_text);
                    if !no_record {
                        let log = SqliteUnknownLog::new(&config.database).await?;
                        log.record(&original_text).await?;
                    }
                }
            }
        }

        Commands::Rank { text, limit } => {
            let catalog = Arc::new(SqliteCatalog::new(&config.database).await?);
            let engine = MatchEngine::with_weights(catalog, config.weights)?;
            let ranked = engine.rank_query(&text).await;

            if ranked.is_empty() {
                println!("No candidates scored above zero");
            }
            for (i, candidate) in ranked.iter().take(limit).enumerate() {
                println!("{}. {}", i + 1, candidate.display());
                let breakdown: Vec<String> = candidate
                    .breakdown
                    .iter()
                    .map(|(metric, value)| format!("{}={:.3}", metric, value))
                    .collect();
                println!("   {}", breakdown.join(" "));
            }
        }

        Commands::Add { name, aliases } => {
            let catalog = SqliteCatalog::new(&config.database).await?;
            let entry = catalog.insert(&name, &[aliases]).await?;
            println!("✅ Added #{}: {} [{}]", entry.id, entry.name, entry.joined_aliases());
        }

        Commands::Import { file } => {
            let json = std::fs::read_to_string(&file)?;
            let entries: Vec<CatalogEntry> = serde_json::from_str(&json)?;
            let catalog = SqliteCatalog::new(&config.database).await?;
            let inserted = catalog.insert_all(&entries).await?;
            println!("📦 Imported {} products from {}", inserted.len(), file.display());
        }

        Commands::List => {
            let catalog = SqliteCatalog::new(&config.database).await?;
            let entries = catalog.get_all().await?;
            println!("📋 {} products:", entries.len());
            for entry in entries {
                println!("   #{} {} [{}]", entry.id, entry.name, entry.joined_aliases());
            }
        }

        Commands::Unknowns { limit } => {
            let log = SqliteUnknownLog::new(&config.database).await?;
            let entries = log.list(limit).await?;
            println!("❓ {} unknown products:", entries.len());
            for entry in entries {
                println!(
                    "   {} x{} (last: {})",
                    entry.spoken_text,
                    entry.occurrences,
                    entry.last_seen.format("%Y-%m-%d %H:%M:%S")
                );
            }
        }

        Commands::Stats => {
            let catalog = SqliteCatalog::new(&config.database).await?;
            let log = SqliteUnknownLog::new(&config.database).await?;
            let stats = log.stats().await?;

            println!("📊 Statistics:");
            println!("   Catalog products: {}", catalog.count().await?);
            println!("   Unknown entries: {}", stats.total_entries);
            println!("   Unknown occurrences: {}", stats.total_occurrences);
            println!("   Avg occurrences/entry: {:.2}", stats.avg_occurrences);

            if let Some(oldest) = stats.oldest_entry {
                println!("   Oldest unknown: {}", oldest.format("%Y-%m-%d %H:%M:%S"));
            }

            if let Some(newest) = stats.newest_entry {
                println!("   Newest unknown: {}", newest.format("%Y-%m-%d %H:%M:%S"));
            }
        }

        Commands::Cleanup { max_age_days } => {
            println!("🧹 Cleaning up unknowns older than {} days...", max_age_days);

            let log = SqliteUnknownLog::new(&config.database).await?;
            let deleted = log.cleanup(max_age_days).await?;

            println!("✅ Deleted {} entries", deleted);
        }
    }

    Ok(())
}
