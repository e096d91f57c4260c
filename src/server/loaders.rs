use std::collections::HashMap;

use async_graphql::Context;
use tracing::debug;

use crate::datamodel::{Author, AuthorId, Book, SharedRepository};

use super::dataloader::{BatchLoader, DataLoader};

pub trait Loaders {
    async fn load_author(&self, id: AuthorId) -> Option<Author>;
    async fn load_books(&self, author_id: AuthorId) -> Vec<Book>;

    /// Invalidates whatever the loaders cached for `author_id`.
    fn forget_author(&self, author_id: AuthorId);
}

impl Loaders for Context<'_> {
    async fn load_author(&self, id: AuthorId) -> Option<Author> {
        self.data_unchecked::<DataLoader<LoadAuthors>>()
            .load(id)
            .await
    }

    async fn load_books(&self, author_id: AuthorId) -> Vec<Book> {
        self.data_unchecked::<DataLoader<LoadBooks>>()
            .load(author_id)
            .await
            .unwrap_or_default()
    }

    fn forget_author(&self, author_id: AuthorId) {
        if let Some(loader) = self.data_opt::<DataLoader<LoadAuthors>>() {
            loader.forget(&author_id);
        }
        if let Some(loader) = self.data_opt::<DataLoader<LoadBooks>>() {
            loader.forget(&author_id);
        }
    }
}

fn debug_keys(keys: &[AuthorId]) -> String {
    keys.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("`, `")
}

/// Resolves `Book.author` by author id.
pub struct LoadAuthors {
    repository: SharedRepository,
}

impl LoadAuthors {
    pub fn new(repository: SharedRepository) -> Self {
        Self { repository }
    }
}

impl BatchLoader for LoadAuthors {
    type K = AuthorId;
    type V = Author;

    fn load_batch(
        &mut self,
        keys: Vec<Self::K>,
    ) -> impl Future<Output = HashMap<Self::K, Self::V>> + Send + 'static {
        let repository = self.repository.clone();
        async move {
            let debug_keys = debug_keys(&keys);
            debug!("resolving Authors by id `{debug_keys}`");

            let authors = repository.authors_by_ids(&keys);

            debug!(found = authors.len(), "finished resolving Authors by id `{debug_keys}`");
            authors
        }
    }
}

/// Resolves `Author.books` by author id.
pub struct LoadBooks {
    repository: SharedRepository,
}

impl LoadBooks {
    pub fn new(repository: SharedRepository) -> Self {
        Self { repository }
    }
}

impl BatchLoader for LoadBooks {
    type K = AuthorId;
    type V = Vec<Book>;

    fn load_batch(
        &mut self,
        keys: Vec<Self::K>,
    ) -> impl Future<Output = HashMap<Self::K, Self::V>> + Send + 'static {
        let repository = self.repository.clone();
        async move {
            let debug_keys = debug_keys(&keys);
            debug!("resolving Books by author `{debug_keys}`");

            let books = repository.books_by_author_ids(&keys);

            debug!("finished resolving Books by author `{debug_keys}`");
            books
        }
    }
}
