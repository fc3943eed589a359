//! Dataset building: cleaning, joining and ordering the raw tables.
//!
//! Steps, in order:
//! 1. Check that all four input files exist (fatal otherwise)
//! 2. Parse the files in parallel
//! 3. Drop the known-bad metadata rows by raw position
//! 4. Drop rows whose id is not an integer
//! 5. Inner-join metadata ⋈ credits ⋈ keywords on id
//! 6. Drop rows without a numeric popularity, sort by popularity (desc)
//!
//! The order produced by step 6 is final: row *i* of the dataset becomes
//! row *i* of the movie table and of the similarity matrix.

use crate::error::Result;
use crate::parser::{self, CreditsRow, KeywordsRow, LinkRow, MetadataRow};
use crate::types::*;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{info, instrument, warn};

impl Dataset {
    /// Load and clean the raw movie dataset from a directory.
    ///
    /// This is the main entry point for the offline pipeline's data stage.
    #[instrument(skip(options), fields(data_dir = %data_dir.display()))]
    pub fn load(data_dir: &Path, options: &LoadOptions) -> Result<Self> {
        parser::check_required_files(data_dir)?;
        info!("All dataset CSV files found");

        let movies_path = data_dir.join(parser::MOVIES_FILE);
        let credits_path = data_dir.join(parser::CREDITS_FILE);
        let keywords_path = data_dir.join(parser::KEYWORDS_FILE);
        let links_path = data_dir.join(parser::LINKS_FILE);

        // Nested joins give four-way parallelism
        let ((movies, credits), (keywords, links)) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_movies(&movies_path),
                    || parser::parse_credits(&credits_path),
                )
            },
            || {
                rayon::join(
                    || parser::parse_keywords(&keywords_path),
                    || parser::parse_links(&links_path),
                )
            },
        );
        let movies = movies?;
        let credits = credits?;
        let keywords = keywords?;
        let links = links?;

        info!(
            "Loaded CSV files: movies_metadata={}, credits={}, keywords={}, links={}",
            movies.len(),
            credits.len(),
            keywords.len(),
            links.len()
        );

        let dataset = Self::from_rows(movies, credits, keywords, links, options);
        info!("Dataset finalized with {} movies", dataset.len());
        Ok(dataset)
    }

    /// Build the dataset from already-parsed rows.
    ///
    /// `movies` carries the raw row position of each metadata record.
    pub fn from_rows(
        movies: Vec<(usize, MetadataRow)>,
        credits: Vec<CreditsRow>,
        keywords: Vec<KeywordsRow>,
        links: Vec<LinkRow>,
        options: &LoadOptions,
    ) -> Self {
        let dropped: HashSet<usize> = options.drop_rows.iter().copied().collect();
        let before = movies.len();
        let movies: Vec<(MovieId, MetadataRow)> = movies
            .into_iter()
            .filter(|(position, _)| !dropped.contains(position))
            .filter_map(|(position, row)| match parser::parse_id(row.id.as_deref()) {
                Some(id) => Some((id, row)),
                None => {
                    warn!("Dropping metadata row {} with invalid id {:?}", position, row.id);
                    None
                }
            })
            .collect();
        info!("Dropped {} bad metadata rows", before - movies.len());

        let credits_by_id = group_by_id(credits, |row| row.id.as_deref(), "credits");
        let keywords_by_id = group_by_id(keywords, |row| row.id.as_deref(), "keywords");

        let mut merged = merge(&movies, &credits_by_id, &keywords_by_id);
        info!("Merged dataset: {} rows", merged.len());

        let linked: HashSet<MovieId> = links
            .iter()
            .filter_map(|link| parser::parse_id(link.tmdb_id.as_deref()))
            .collect();
        let with_links = merged.iter().filter(|m| linked.contains(&m.id)).count();
        info!("{} of {} movies have external links", with_links, merged.len());

        // Stable, so equally popular movies keep their merge order
        merged.sort_by(|a, b| b.popularity.total_cmp(&a.popularity));

        Self {
            movies: merged,
            links_count: links.len(),
        }
    }
}

/// Group rows by integer id, preserving file order inside each group.
fn group_by_id<T>(
    rows: Vec<T>,
    id_of: impl Fn(&T) -> Option<&str>,
    table: &str,
) -> HashMap<MovieId, Vec<T>> {
    let mut groups: HashMap<MovieId, Vec<T>> = HashMap::new();
    let mut invalid = 0usize;
    for row in rows {
        match parser::parse_id(id_of(&row)) {
            Some(id) => groups.entry(id).or_default().push(row),
            None => invalid += 1,
        }
    }
    if invalid > 0 {
        warn!("Ignored {} {} rows with invalid id", invalid, table);
    }
    groups
}

/// Inner join in metadata order, then credits order, then keywords order.
///
/// Nested fields are parsed here, in parallel per metadata row. Rows with
/// no numeric popularity are dropped.
fn merge(
    movies: &[(MovieId, MetadataRow)],
    credits_by_id: &HashMap<MovieId, Vec<CreditsRow>>,
    keywords_by_id: &HashMap<MovieId, Vec<KeywordsRow>>,
) -> Vec<RawMovie> {
    movies
        .par_iter()
        .map(|(id, row)| {
            let (Some(credits), Some(keywords)) = (credits_by_id.get(id), keywords_by_id.get(id))
            else {
                return Vec::new();
            };
            let Some(popularity) = parser::parse_float(row.popularity.as_deref()) else {
                return Vec::new();
            };

            let genres: Vec<String> = NamedEntry::list_from_literal(row.genres.as_deref())
                .into_iter()
                .map(|entry| entry.name)
                .collect();
            let release_date = row
                .release_date
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string);
            let title = row.title.clone().unwrap_or_default();

            let mut out = Vec::with_capacity(credits.len() * keywords.len());
            for credit in credits {
                let cast = NamedEntry::list_from_literal(credit.cast.as_deref());
                let crew = NamedEntry::list_from_literal(credit.crew.as_deref());
                for keyword in keywords {
                    out.push(RawMovie {
                        id: *id,
                        title: title.clone(),
                        release_date: release_date.clone(),
                        popularity,
                        genres: genres.clone(),
                        cast: cast.clone(),
                        crew: crew.clone(),
                        keywords: NamedEntry::list_from_literal(keyword.keywords.as_deref()),
                    });
                }
            }
            out
        })
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect()
}
