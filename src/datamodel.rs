use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::error::StoreError;

pub type AuthorId = i32;
pub type BookId = i32;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Book {
    pub id: BookId,
    pub name: String,
    pub author_id: AuthorId,
}

static SEED_AUTHORS: &[(AuthorId, &str)] = &[
    (1, "J. K. Rowling"),
    (2, "J. R. R. Tolkien"),
    (3, "Brent Weeks"),
];

static SEED_BOOKS: &[(BookId, &str, AuthorId)] = &[
    (1, "Harry Potter & The Sorcerer's Stone", 1),
    (2, "Harry Potter & The Chamber of Secrets", 1),
    (3, "The Two Towers", 2),
    (4, "Beyond the shadows", 3),
];

/// Access to the author and book tables.
///
/// Lists come back in insertion order. Batched lookups return maps keyed by the requested ids.
pub trait Repository: Send + Sync {
    fn authors(&self) -> Vec<Author>;
    fn books(&self) -> Vec<Book>;

    fn author(&self, id: AuthorId) -> Option<Author>;
    fn book(&self, id: BookId) -> Option<Book>;

    /// Unknown ids are left out of the result.
    fn authors_by_ids(&self, ids: &[AuthorId]) -> HashMap<AuthorId, Author>;
    /// Every requested id gets an entry, empty if the author has no books.
    fn books_by_author_ids(&self, ids: &[AuthorId]) -> HashMap<AuthorId, Vec<Book>>;

    fn add_author(&self, name: String) -> Author;
    fn add_book(&self, name: String, author_id: AuthorId) -> Result<Book, StoreError>;
}

pub type SharedRepository = Arc<dyn Repository>;

#[derive(Debug, Default)]
struct Tables {
    authors: Vec<Author>,
    books: Vec<Book>,

    author_index: HashMap<AuthorId, usize>,
    book_index: HashMap<BookId, usize>,
    books_by_author: HashMap<AuthorId, Vec<usize>>,

    next_author_id: AuthorId,
    next_book_id: BookId,
}

impl Tables {
    fn insert_author(&mut self, author: Author) {
        self.next_author_id = self.next_author_id.max(author.id + 1);
        self.author_index.insert(author.id, self.authors.len());
        self.authors.push(author);
    }

    fn insert_book(&mut self, book: Book) {
        let position = self.books.len();
        self.next_book_id = self.next_book_id.max(book.id + 1);
        self.book_index.insert(book.id, position);
        self.books_by_author
            .entry(book.author_id)
            .or_default()
            .push(position);
        self.books.push(book);
    }
}

/// In-memory [`Repository`] that only ever grows.
///
/// Ids come from per-table counters that advance under the same write lock as the append.
#[derive(Debug)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let tables = Tables {
            next_author_id: 1,
            next_book_id: 1,
            ..Default::default()
        };
        Self {
            tables: RwLock::new(tables),
        }
    }

    pub fn seeded() -> Self {
        let store = Self::new();
        {
            let mut tables = store.tables.write();
            for &(id, name) in SEED_AUTHORS {
                tables.insert_author(Author {
                    id,
                    name: name.into(),
                });
            }
            for &(id, name, author_id) in SEED_BOOKS {
                tables.insert_book(Book {
                    id,
                    name: name.into(),
                    author_id,
                });
            }
        }
        store
    }
}

impl Repository for MemoryStore {
    fn authors(&self) -> Vec<Author> {
        self.tables.read().authors.clone()
    }

    fn books(&self) -> Vec<Book> {
        self.tables.read().books.clone()
    }

    fn author(&self, id: AuthorId) -> Option<Author> {
        let tables = self.tables.read();
        let position = *tables.author_index.get(&id)?;
        Some(tables.authors[position].clone())
    }

    fn book(&self, id: BookId) -> Option<Book> {
        let tables = self.tables.read();
        let position = *tables.book_index.get(&id)?;
        Some(tables.books[position].clone())
    }

    fn authors_by_ids(&self, ids: &[AuthorId]) -> HashMap<AuthorId, Author> {
        let tables = self.tables.read();
        ids.iter()
            .filter_map(|id| {
                let position = *tables.author_index.get(id)?;
                Some((*id, tables.authors[position].clone()))
            })
            .collect()
    }

    fn books_by_author_ids(&self, ids: &[AuthorId]) -> HashMap<AuthorId, Vec<Book>> {
        let tables = self.tables.read();
        ids.iter()
            .map(|id| {
                let books = tables
                    .books_by_author
                    .get(id)
                    .map(|positions| {
                        positions
                            .iter()
                            .map(|&p| tables.books[p].clone())
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_default();
                (*id, books)
            })
            .collect()
    }

    fn add_author(&self, name: String) -> Author {
        let mut tables = self.tables.write();
        let author = Author {
            id: tables.next_author_id,
            name,
        };
        tables.insert_author(author.clone());

        info!(id = author.id, name = %author.name, "added author");
        author
    }

    fn add_book(&self, name: String, author_id: AuthorId) -> Result<Book, StoreError> {
        let mut tables = self.tables.write();
        if !tables.author_index.contains_key(&author_id) {
            return Err(StoreError::InvalidReference(author_id));
        }

        let book = Book {
            id: tables.next_book_id,
            name,
            author_id,
        };
        tables.insert_book(book.clone());

        info!(id = book.id, name = %book.name, author_id, "added book");
        Ok(book)
    }
}
