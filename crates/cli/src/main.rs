use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{KNOWN_BAD_ROWS, LoadOptions};
use pipeline::training::{self, TrainingConfig};
use pipeline::{VectorizerConfig, load_artifacts, save_artifacts};
use server::{Recommendation, RecommendError, RecommendationService};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// movie-recs - Content-based movie recommendation engine
#[derive(Parser)]
#[command(name = "movie-recs")]
#[command(about = "Train and query content-based movie recommendations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the movie table and similarity matrix from the raw dataset
    Train {
        /// Directory holding movies_metadata.csv, credits.csv, keywords.csv, links.csv
        #[arg(short, long, default_value = "data/the-movies-dataset")]
        data_dir: PathBuf,

        /// Where to write the artifacts
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Minimum number of movies a term must appear in
        #[arg(long, default_value = "3")]
        min_df: usize,

        /// Vocabulary size cap
        #[arg(long, default_value = "15000")]
        max_features: usize,

        /// Raw metadata row positions to drop (defaults to the known corrupted rows)
        #[arg(long, value_delimiter = ',')]
        drop_rows: Option<Vec<usize>>,
    },

    /// Recommend movies similar to a title
    Recommend {
        /// Directory holding the trained artifacts
        #[arg(short, long, default_value = ".")]
        artifact_dir: PathBuf,

        /// Movie title; prompts on stdin when omitted
        #[arg(long)]
        title: Option<String>,

        /// Number of recommendations to return
        #[arg(long, default_value = "14")]
        limit: usize,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            data_dir,
            output_dir,
            min_df,
            max_features,
            drop_rows,
        } => {
            let config = TrainingConfig {
                load: LoadOptions {
                    drop_rows: drop_rows.unwrap_or_else(|| KNOWN_BAD_ROWS.to_vec()),
                },
                vectorizer: VectorizerConfig {
                    min_df,
                    max_features: Some(max_features),
                    ..Default::default()
                },
            };
            handle_train(data_dir, output_dir, &config)?
        }
        Commands::Recommend {
            artifact_dir,
            title,
            limit,
        } => handle_recommend(artifact_dir, title, limit)?,
    }

    Ok(())
}

/// Handle the 'train' command
fn handle_train(data_dir: PathBuf, output_dir: PathBuf, config: &TrainingConfig) -> Result<()> {
    println!("Training on {}...", data_dir.display());
    let start = Instant::now();

    let model = training::train_from_dir(&data_dir, config)
        .with_context(|| format!("Training failed for dataset in {}", data_dir.display()))?;
    info!("Training finished in {:.2?}", start.elapsed());
    println!(
        "{} Trained on {} movies ({} terms, {} stored scores)",
        "✓".green(),
        model.table.len(),
        model.vocabulary_size,
        model.similarity.nnz()
    );

    let save_start = Instant::now();
    let paths = save_artifacts(&output_dir, &model.table, &model.similarity)
        .context("Failed to save artifacts")?;
    info!("Artifacts saved in {:.2?}", save_start.elapsed());
    println!(
        "{} Wrote {} and {}",
        "✓".green(),
        paths.movie_table.display(),
        paths.similarity.display()
    );
    println!("Total training time: {:.2} minutes", start.elapsed().as_secs_f64() / 60.0);
    Ok(())
}

/// Handle the 'recommend' command
fn handle_recommend(artifact_dir: PathBuf, title: Option<String>, limit: usize) -> Result<()> {
    let start = Instant::now();
    let (table, similarity) = load_artifacts(&artifact_dir)
        .with_context(|| format!("Failed to load artifacts from {}", artifact_dir.display()))?;
    let service = RecommendationService::new(table, similarity)?;
    info!("Artifacts loaded in {:.2?}", start.elapsed());
    println!(
        "{} Loaded {} movies in {:?}",
        "✓".green(),
        service.movies_count(),
        start.elapsed()
    );

    let title = match title {
        Some(title) => title,
        None => prompt_title()?,
    };

    let query_start = Instant::now();
    let result = service.recommend(&title, limit);
    info!("Recommendation query took {:.2?}", query_start.elapsed());

    match result {
        Ok(recommendations) => print_recommendations(&recommendations),
        Err(RecommendError::NotFound(_)) => {
            println!("{} Movie not found in database. Try another title.", "[WARN]".yellow());
        }
    }
    Ok(())
}

fn prompt_title() -> Result<String> {
    print!("Enter a movie name: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).context("Failed to read title")?;
    Ok(line.trim().to_string())
}

/// Helper function to format and print recommendations
fn print_recommendations(recommendations: &[Recommendation]) {
    println!();
    println!(
        "{}",
        format!("{:<40} | {:<20} | {:<15}", "Movie Title", "Director", "Release Date").bold().blue()
    );
    println!("{}", "-".repeat(80));
    for rec in recommendations {
        println!(
            "{:<40} | {:<20} | {:<15}",
            rec.title,
            rec.director.as_deref().unwrap_or("Unknown"),
            rec.release_date
        );
        println!("   {}", rec.google_link().dimmed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline::training::train_table;
    use pipeline::{MovieRecord, MovieTable};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn record(id: i64, title: &str, soup: &str) -> MovieRecord {
        MovieRecord {
            id,
            title: title.to_string(),
            release_date: None,
            main_director: None,
            cast: vec![],
            keywords: vec![],
            genres: vec![],
            soup: soup.to_string(),
        }
    }

    #[test]
    fn test_recommend_logs_stage_timings() {
        let table = MovieTable::new(vec![
            record(1, "Heat", "crime heist michaelmann"),
            record(2, "Thief", "crime heist michaelmann"),
            record(3, "Up", "animation balloon"),
        ]);
        let config = VectorizerConfig {
            min_df: 1,
            ..Default::default()
        };
        let model = train_table(table, &config).unwrap();
        let dir = tempfile::tempdir().unwrap();
        save_artifacts(dir.path(), &model.table, &model.similarity).unwrap();

        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            handle_recommend(dir.path().to_path_buf(), Some("Heat".to_string()), 2)
        })
        .unwrap();

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Artifacts loaded in"), "{}", output);
        assert!(output.contains("Recommendation query took"), "{}", output);
    }
}
