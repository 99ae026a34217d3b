use crate::error::Result;
use crate::models::book::{Book, BookFilters};
use serde_json::{json, Value};

pub const SEARCH_SIZE: usize = 10;
pub const TOP_GENRES_SIZE: usize = 5;
pub const TOP_GENRES_AGG: &str = "top_genres";

const SOURCE_FIELDS: [&str; 6] = ["title", "author", "summary", "genres", "year", "publisher"];

fn keyword_subfield() -> Value {
    json!({ "keyword": { "type": "keyword", "ignore_above": 256 } })
}

pub fn index_definition() -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 0
        },
        "mappings": {
            "properties": {
                "title": { "type": "text", "fields": keyword_subfield() },
                "author": { "type": "text", "fields": keyword_subfield() },
                "summary": { "type": "text" },
                "genres": { "type": "keyword" },
                "year": { "type": "integer" },
                "publisher": { "type": "keyword" }
            }
        }
    })
}

/// Free text is a scoring clause; author and genre are non-scoring filters.
pub fn bool_query(filters: &BookFilters) -> Value {
    let mut must = Vec::new();
    let mut filter = Vec::new();

    if let Some(text) = filters.text_query() {
        must.push(json!({
            "multi_match": { "query": text, "fields": ["title", "summary"] }
        }));
    }
    if let Some(author) = filters.author_filter() {
        filter.push(json!({ "term": { "author.keyword": author } }));
    }
    if let Some(genre) = filters.genre_filter() {
        filter.push(json!({ "term": { "genres": genre } }));
    }

    json!({ "bool": { "must": must, "filter": filter } })
}

pub fn search_body(filters: &BookFilters) -> Value {
    json!({
        "query": bool_query(filters),
        "size": SEARCH_SIZE,
        "_source": { "includes": SOURCE_FIELDS }
    })
}

pub fn top_genres_body(filters: &BookFilters) -> Value {
    json!({
        "query": bool_query(filters),
        "size": 0,
        "aggs": {
            TOP_GENRES_AGG: {
                "terms": { "field": "genres", "size": TOP_GENRES_SIZE }
            }
        }
    })
}

/// NDJSON payload for `_bulk`: an `index` action line followed by the
/// document line for every book, newline terminated.
pub fn bulk_payload(index_name: &str, books: &[Book]) -> Result<String> {
    let mut payload = String::new();
    for book in books {
        let action = json!({ "index": { "_index": index_name, "_id": book.id } });
        payload.push_str(&serde_json::to_string(&action)?);
        payload.push('\n');
        payload.push_str(&serde_json::to_string(&book.document())?);
        payload.push('\n');
    }
    Ok(payload)
}

pub fn genres_update_body(book: &Book) -> Value {
    json!({ "doc": { "genres": book.genres } })
}
