use crate::config::Settings;
use crate::error::{BookSearchError, Result};
use crate::models::book::{Book, BookFilters, BulkReport, DeleteOutcome, GenreCount, GenreUpdate};
use crate::models::responses::{
    BulkResponse, CountResponse, GetResponse, SearchResponse, WriteResponse,
};
use crate::utils::query;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Operations the demo runs against one collection of books.
#[async_trait]
pub trait BookIndex {
    /// Creates the collection with the fixed schema unless it already exists.
    /// Returns `true` when it was created by this call.
    async fn ensure_index(&self) -> Result<bool>;
    async fn bulk_index(&self, books: &[Book]) -> Result<BulkReport>;
    async fn count(&self) -> Result<u64>;
    async fn search(&self, filters: &BookFilters) -> Result<Vec<Book>>;
    async fn top_genres(&self, filters: &BookFilters) -> Result<Vec<GenreCount>>;
    async fn get(&self, book_id: &str) -> Result<Option<Book>>;
    async fn add_genre(&self, book_id: &str, genre: &str) -> Result<GenreUpdate>;
    async fn delete(&self, book_id: &str) -> Result<DeleteOutcome>;
}

pub type Index = Arc<dyn BookIndex + Send + Sync>;

// Writes wait for the next refresh so follow-up reads observe them.
const REFRESH: (&str, &str) = ("refresh", "wait_for");

/// HTTP connection to a single search engine node.
#[derive(Clone, Debug)]
pub struct EngineClient {
    client: Client,
    base_url: String,
}

impl EngineClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.base_url())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins `segments` onto the base url, percent-encoding each one so ids
    /// containing `/`, `?` or `#` stay a single path segment.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| BookSearchError::InvalidConfig(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| {
                BookSearchError::InvalidConfig(format!("{} cannot be a base url", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub fn head(&self, segments: &[&str]) -> Result<RequestBuilder> {
        Ok(self.client.head(self.url(segments)?))
    }

    pub fn get(&self, segments: &[&str]) -> Result<RequestBuilder> {
        Ok(self.client.get(self.url(segments)?))
    }

    pub fn post(&self, segments: &[&str]) -> Result<RequestBuilder> {
        Ok(self.client.post(self.url(segments)?))
    }

    pub fn put(&self, segments: &[&str]) -> Result<RequestBuilder> {
        Ok(self.client.put(self.url(segments)?))
    }

    pub fn delete(&self, segments: &[&str]) -> Result<RequestBuilder> {
        Ok(self.client.delete(self.url(segments)?))
    }
}

async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(BookSearchError::engine(status, body))
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = check(response).await?;
    Ok(response.json::<T>().await?)
}

pub struct ElasticsearchBooks {
    client: EngineClient,
    index_name: String,
}

impl ElasticsearchBooks {
    pub fn new(client: EngineClient, index_name: impl Into<String>) -> Self {
        Self {
            client,
            index_name: index_name.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(EngineClient::from_settings(settings), &settings.index_name)
    }

    fn index_name(&self) -> &str {
        &self.index_name
    }

    async fn index_exists(&self) -> Result<bool> {
        let response = self.client.head(&[self.index_name()])?.send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(BookSearchError::engine(status, "index existence check failed")),
        }
    }

    async fn run_search(&self, body: &Value) -> Result<SearchResponse<Book>> {
        debug!("Search body: {}", body);
        let response = self
            .client
            .post(&[self.index_name(), "_search"])?
            .json(body)
            .send()
            .await?;
        read_json(response).await
    }
}

#[async_trait]
impl BookIndex for ElasticsearchBooks {
    async fn ensure_index(&self) -> Result<bool> {
        if self.index_exists().await? {
            info!("Index '{}' already exists", self.index_name);
            return Ok(false);
        }

        let response = self
            .client
            .put(&[self.index_name()])?
            .json(&query::index_definition())
            .send()
            .await?;
        check(response).await?;

        info!("Created index '{}' with mapping", self.index_name);
        Ok(true)
    }

    async fn bulk_index(&self, books: &[Book]) -> Result<BulkReport> {
        if books.is_empty() {
            warn!("No books to index");
            return Ok(BulkReport::default());
        }

        let payload = query::bulk_payload(&self.index_name, books)?;
        let response = self
            .client
            .post(&["_bulk"])?
            .query(&[REFRESH])
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(payload)
            .send()
            .await?;
        let bulk: BulkResponse = read_json(response).await?;

        let mut report = BulkReport {
            submitted: books.len(),
            failed: 0,
        };

        if bulk.errors {
            error!("Bulk indexing has failures");
            for item in bulk.items.iter().flat_map(|item| item.values()) {
                if let Some(cause) = &item.error {
                    report.failed += 1;
                    error!(
                        "Failed to index book {} ({}): {}",
                        item.id.as_deref().unwrap_or("<unknown>"),
                        cause.kind,
                        cause.reason.as_deref().unwrap_or("no reason given")
                    );
                }
            }
        } else {
            info!("Successfully indexed {} books", books.len());
        }

        Ok(report)
    }

    async fn count(&self) -> Result<u64> {
        let response = self.client.get(&[self.index_name(), "_count"])?.send().await?;
        let count: CountResponse = read_json(response).await?;
        Ok(count.count)
    }

    async fn search(&self, filters: &BookFilters) -> Result<Vec<Book>> {
        let response = self.run_search(&query::search_body(filters)).await?;

        let books = response
            .hits
            .hits
            .into_iter()
            .filter_map(|hit| {
                hit.source.map(|mut book| {
                    book.id = hit.id;
                    book
                })
            })
            .collect();

        Ok(books)
    }

    async fn top_genres(&self, filters: &BookFilters) -> Result<Vec<GenreCount>> {
        let response = self.run_search(&query::top_genres_body(filters)).await?;

        let buckets = response
            .aggregations
            .and_then(|mut aggs| aggs.remove(query::TOP_GENRES_AGG))
            .map(|agg| agg.buckets)
            .unwrap_or_default();

        Ok(buckets
            .into_iter()
            .map(|bucket| GenreCount {
                genre: bucket.key_string(),
                count: bucket.doc_count,
            })
            .collect())
    }

    async fn get(&self, book_id: &str) -> Result<Option<Book>> {
        let response = self
            .client
            .get(&[self.index_name(), "_doc", book_id])?
            .send()
            .await?;

        // A missing document is a 404 carrying `"found": false`; a 404 without
        // it (missing index) is an engine error.
        if response.status() == StatusCode::NOT_FOUND {
            let status = response.status();
            let body = response.text().await?;
            return match serde_json::from_str::<GetResponse<Value>>(&body) {
                Ok(doc) if !doc.found => Ok(None),
                _ => Err(BookSearchError::engine(status, body)),
            };
        }

        let doc: GetResponse<Book> = read_json(response).await?;
        if !doc.found {
            return Ok(None);
        }

        Ok(doc.source.map(|mut book| {
            book.id = book_id.to_string();
            book
        }))
    }

    async fn add_genre(&self, book_id: &str, genre: &str) -> Result<GenreUpdate> {
        let Some(mut book) = self.get(book_id).await? else {
            warn!("Book with id {} not found", book_id);
            return Ok(GenreUpdate::NotFound);
        };

        let outcome = if book.genres.insert(genre.to_string()) {
            GenreUpdate::Added
        } else {
            GenreUpdate::AlreadyPresent
        };

        let response = self
            .client
            .post(&[self.index_name(), "_update", book_id])?
            .query(&[REFRESH])
            .json(&query::genres_update_body(&book))
            .send()
            .await?;
        check(response).await?;

        info!("Updated book {}: genres now [{}]", book_id, book.genre_list());
        Ok(outcome)
    }

    async fn delete(&self, book_id: &str) -> Result<DeleteOutcome> {
        let response = self
            .client
            .delete(&[self.index_name(), "_doc", book_id])?
            .query(&[REFRESH])
            .send()
            .await?;

        // A missing document is a 404 with a regular write body; a 404 without
        // `result` (missing index) is an engine error.
        let status = response.status();
        let written: WriteResponse = if status == StatusCode::NOT_FOUND {
            let body = response.text().await?;
            serde_json::from_str(&body).map_err(|_| BookSearchError::engine(status, body))?
        } else {
            read_json(response).await?
        };

        let outcome = DeleteOutcome::from_result(&written.result);
        match outcome {
            DeleteOutcome::NotFound => warn!("Book with id {} not found for deletion", book_id),
            _ => info!("Deleted book with id {}. Result: {}", book_id, written.result),
        }
        Ok(outcome)
    }
}
