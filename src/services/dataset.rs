use crate::error::Result;
use crate::models::book::Book;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::info;
use uuid::Builder;

pub const GENRES: [&str; 15] = [
    "Fiction",
    "Mystery",
    "Science Fiction",
    "Fantasy",
    "Romance",
    "Thriller",
    "Horror",
    "Historical Fiction",
    "Biography",
    "Non-fiction",
    "Adventure",
    "Drama",
    "Poetry",
    "Classic",
    "Contemporary",
];

const PLACEHOLDER: (&str, &str) = (
    "Unknown Book",
    "A compelling book that explores various themes and ideas.",
);

// Authors with an empty catalogue get the placeholder title.
const CATALOGUE: [(&str, &[(&str, &str)]); 6] = [
    (
        "J.K. Rowling",
        &[
            (
                "Harry Potter and the Philosopher's Stone",
                "The story of a young wizard's first year at Hogwarts School of Witchcraft and Wizardry.",
            ),
            (
                "Harry Potter and the Chamber of Secrets",
                "Harry's second year at Hogwarts brings fresh challenges and mysterious dangers.",
            ),
            (
                "The Casual Vacancy",
                "A dark comedy about a small English town dealing with local politics and social issues.",
            ),
        ],
    ),
    (
        "George R.R. Martin",
        &[
            (
                "A Game of Thrones",
                "The first book in the epic fantasy series A Song of Ice and Fire.",
            ),
            (
                "A Clash of Kings",
                "The second novel in the series, continuing the saga of the Seven Kingdoms.",
            ),
        ],
    ),
    (
        "Stephen King",
        &[
            (
                "The Shining",
                "A psychological horror novel about a family serving as winter caretakers of the Overlook Hotel.",
            ),
            (
                "It",
                "A horror novel about seven children who face an ancient, shape-shifting evil.",
            ),
            (
                "The Stand",
                "A post-apocalyptic horror/fantasy novel about the survivors of a pandemic.",
            ),
        ],
    ),
    ("Jane Austen", &[]),
    ("Neil Gaiman", &[]),
    ("Brandon Sanderson", &[]),
];

/// Generates the sample catalogue. The same seed always yields the same
/// books, ids included.
pub fn generate_books(seed: u64) -> Vec<Book> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut books = Vec::new();

    for (author, titles) in CATALOGUE {
        let titles: &[(&str, &str)] = if titles.is_empty() {
            &[PLACEHOLDER]
        } else {
            titles
        };

        for &(title, summary) in titles {
            let id = Builder::from_random_bytes(rng.gen()).into_uuid();
            books.push(Book {
                id: id.to_string(),
                title: title.to_string(),
                author: author.to_string(),
                summary: summary.to_string(),
                genres: pick_genres(&mut rng),
                year: None,
                publisher: None,
            });
        }
    }

    books
}

fn pick_genres(rng: &mut StdRng) -> BTreeSet<String> {
    let wanted = rng.gen_range(1..=3);
    let mut genres = BTreeSet::new();
    while genres.len() < wanted {
        genres.insert(GENRES[rng.gen_range(0..GENRES.len())].to_string());
    }
    genres
}

pub fn persist_books(path: &Path, books: &[Book]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(books)?;
    fs::write(path, json)?;

    info!("Sample dataset written to {}", path.display());
    Ok(())
}

pub fn load_books(path: &Path) -> Result<Vec<Book>> {
    let content = fs::read_to_string(path)?;
    let books: Vec<Book> = serde_json::from_str(&content)?;
    info!("Loaded {} books from {}", books.len(), path.display());
    Ok(books)
}

pub fn prepare_dataset(path: &Path, seed: u64) -> Result<Vec<Book>> {
    let books = generate_books(seed);
    persist_books(path, &books)?;
    Ok(books)
}
