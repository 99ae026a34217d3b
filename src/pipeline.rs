use crate::config::Settings;
use crate::error::Result;
use crate::models::book::{BookFilters, DeleteOutcome, GenreCount, GenreUpdate};
use crate::services::dataset::{load_books, prepare_dataset};
use crate::services::elasticsearch::Index;
use tracing::info;

pub const SAMPLE_QUERY: &str = "Harry";
pub const SAMPLE_GENRE: &str = "Fantasy";
pub const DEMO_GENRE: &str = "DemoGenre";

#[derive(Debug, Default)]
pub struct DemoReport {
    pub books_loaded: usize,
    pub documents_indexed: u64,
    pub hits: usize,
    pub updated: Option<(String, GenreUpdate)>,
    pub deleted: Option<(String, DeleteOutcome)>,
    pub top_genres: Vec<GenreCount>,
}

pub struct BookSearchDemo {
    index: Index,
    settings: Settings,
}

impl BookSearchDemo {
    pub fn new(index: Index, settings: Settings) -> Self {
        Self { index, settings }
    }

    pub async fn run(&self) -> Result<DemoReport> {
        let mut report = DemoReport::default();

        info!("Step 1: Data preparation");
        prepare_dataset(&self.settings.dataset_path, self.settings.seed)?;
        let books = load_books(&self.settings.dataset_path)?;
        report.books_loaded = books.len();
        info!("Data preparation completed. Processed {} books", books.len());

        info!("Step 2: Creating index with mapping");
        self.index.ensure_index().await?;

        info!("Step 3: Bulk indexing books");
        self.index.bulk_index(&books).await?;
        report.documents_indexed = self.index.count().await?;
        info!(
            "Indexing completed. Total documents in index: {}",
            report.documents_indexed
        );

        info!(
            "Sample search: '{}' in title or summary, genre = '{}'",
            SAMPLE_QUERY, SAMPLE_GENRE
        );
        let filters = BookFilters::new().query(SAMPLE_QUERY).genre(SAMPLE_GENRE);
        let found = self.index.search(&filters).await?;
        report.hits = found.len();
        for book in &found {
            println!("- {} by {} [{}]", book.title, book.author, book.genre_list());
            println!("  Summary: {}", book.summary);
        }

        if let Some(first) = found.first() {
            let update = self.index.add_genre(&first.id, DEMO_GENRE).await?;
            println!("Updated book {}: added genre '{}'", first.title, DEMO_GENRE);
            report.updated = Some((first.id.clone(), update));

            let outcome = self.index.delete(&first.id).await?;
            println!("Deleted book {}", first.title);
            report.deleted = Some((first.id.clone(), outcome));
        }

        info!("Sample aggregation: top 5 genres");
        report.top_genres = self.index.top_genres(&BookFilters::new()).await?;
        println!("Top 5 genres:");
        for bucket in &report.top_genres {
            println!("- {}: {}", bucket.genre, bucket.count);
        }

        Ok(report)
    }
}
