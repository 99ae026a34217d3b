use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    // The engine keeps the id as `_id`, so documents read back from `_source`
    // arrive without it.
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub author: String,
    pub summary: String,
    #[serde(default)]
    pub genres: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
}

impl Book {
    pub fn document(&self) -> BookDocument<'_> {
        BookDocument {
            title: &self.title,
            author: &self.author,
            summary: &self.summary,
            genres: &self.genres,
            year: self.year,
            publisher: self.publisher.as_deref(),
        }
    }

    pub fn genre_list(&self) -> String {
        if self.genres.is_empty() {
            "no genres".to_string()
        } else {
            self.genres.iter().cloned().collect::<Vec<_>>().join(", ")
        }
    }
}

/// Body stored in the index for a book. Same fields as [`Book`] minus the id.
#[derive(Debug, Serialize)]
pub struct BookDocument<'a> {
    pub title: &'a str,
    pub author: &'a str,
    pub summary: &'a str,
    pub genres: &'a BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<&'a str>,
}

/// Optional constraints shared by search and the genre aggregation.
/// Empty strings count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilters {
    pub query: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
}

impl BookFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn text_query(&self) -> Option<&str> {
        non_empty(&self.query)
    }

    pub fn author_filter(&self) -> Option<&str> {
        non_empty(&self.author)
    }

    pub fn genre_filter(&self) -> Option<&str> {
        non_empty(&self.genre)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreCount {
    pub genre: String,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkReport {
    pub submitted: usize,
    pub failed: usize,
}

impl BulkReport {
    pub fn succeeded(&self) -> usize {
        self.submitted - self.failed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenreUpdate {
    Added,
    AlreadyPresent,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    Other(String),
}

impl DeleteOutcome {
    pub fn from_result(result: &str) -> Self {
        match result {
            "deleted" => DeleteOutcome::Deleted,
            "not_found" => DeleteOutcome::NotFound,
            other => DeleteOutcome::Other(other.to_string()),
        }
    }
}
