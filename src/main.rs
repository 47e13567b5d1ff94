use anyhow::Context;
use clap::{ArgGroup, Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

mod cache;
mod catalog;
mod config;
mod engine;
mod features;
mod model;
mod models;

use cache::{PgCache, RecommendationCache};
use config::Config;
use engine::RecommendationEngine;

#[derive(Parser)]
#[command(name = "course-recommender")]
#[command(about = "Cache-backed course recommendation service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the cache schema
    InitDb,
    /// Recommend courses for one student
    Recommend {
        #[arg(long)]
        student_id: String,
        /// Emit the result as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Precompute and cache labels for a set of students
    #[command(group(
        ArgGroup::new("scope")
            .args(["ids", "all"])
            .required(true)
            .multiple(false)
    ))]
    Warm {
        #[arg(long, value_delimiter = ',')]
        ids: Vec<i64>,
        #[arg(long)]
        all: bool,
    },
    /// Show the raw cached labels for a student
    ShowCache {
        #[arg(long)]
        student_id: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(config.connect_timeout)
        .connect(&config.database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            cache::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Recommend { student_id, json } => {
            let engine = RecommendationEngine::new(PgCache::new(pool), &config);
            let result = engine.get_recommendations(&student_id).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }
            println!("Recommendations for student {student_id}:");
            println!(
                "- Study method: {}",
                result.study_method_label.as_deref().unwrap_or("unavailable")
            );
            println!(
                "- Engagement: {}",
                result.engagement_label.as_deref().unwrap_or("unavailable")
            );
            println!("Courses:");
            for course in &result.courses {
                println!("- {course}");
            }
        }
        Commands::Warm { ids, all } => {
            let engine = RecommendationEngine::new(PgCache::new(pool), &config);
            let ids = if all { engine.feature_student_ids() } else { ids };
            if ids.is_empty() {
                println!("No students to warm.");
                return Ok(());
            }

            let total = ids.len();
            let mut warmed = 0usize;
            for id in ids {
                let result = engine.get_recommendations(&id.to_string()).await;
                if result.study_method_label.is_some() {
                    warmed += 1;
                }
            }
            println!("Warmed {warmed} of {total} students.");
        }
        Commands::ShowCache { student_id } => {
            let cache = PgCache::new(pool);
            match cache.fetch(student_id).await? {
                Some(row) => {
                    let display = |value: Option<i32>| {
                        value
                            .map(|v| v.to_string())
                            .unwrap_or_else(|| "corrupt".to_string())
                    };
                    println!(
                        "Cached labels for student {student_id}: study_method={}, engagement={}",
                        display(row.predicted_study_method),
                        display(row.engagement_level)
                    );
                }
                None => println!("No cached recommendation for student {student_id}."),
            }
        }
    }

    Ok(())
}
