pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;

pub use config::Settings;
pub use error::{BookSearchError, Result};
pub use models::book::{Book, BookFilters, BulkReport, DeleteOutcome, GenreCount, GenreUpdate};
pub use pipeline::{BookSearchDemo, DemoReport};
pub use services::elasticsearch::{BookIndex, ElasticsearchBooks, EngineClient, Index};
