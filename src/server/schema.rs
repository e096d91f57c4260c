use async_graphql::{ComplexObject, Context, ErrorExtensions, Object, SimpleObject};

use crate::datamodel::{self, AuthorId, BookId, SharedRepository};

use super::loaders::Loaders;

fn repository<'a>(ctx: &'a Context<'_>) -> &'a SharedRepository {
    ctx.data_unchecked::<SharedRepository>()
}

/// A book, written by a single author
#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct Book {
    id: BookId,
    name: String,
    author_id: AuthorId,
}

impl From<datamodel::Book> for Book {
    fn from(book: datamodel::Book) -> Self {
        Self {
            id: book.id,
            name: book.name,
            author_id: book.author_id,
        }
    }
}

#[ComplexObject]
impl Book {
    async fn author(&self, ctx: &Context<'_>) -> Option<Author> {
        ctx.load_author(self.author_id).await.map(Author::from)
    }
}

/// An author, with the books they wrote
#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct Author {
    id: AuthorId,
    name: String,
}

impl From<datamodel::Author> for Author {
    fn from(author: datamodel::Author) -> Self {
        Self {
            id: author.id,
            name: author.name,
        }
    }
}

#[ComplexObject]
impl Author {
    async fn books(&self, ctx: &Context<'_>) -> Vec<Book> {
        ctx.load_books(self.id)
            .await
            .into_iter()
            .map(Book::from)
            .collect()
    }
}

pub struct Query;

/// Root Query for book details
#[Object]
impl Query {
    /// List of all books
    async fn books(&self, ctx: &Context<'_>) -> Vec<Book> {
        repository(ctx).books().into_iter().map(Book::from).collect()
    }

    /// List of all authors
    async fn authors(&self, ctx: &Context<'_>) -> Vec<Author> {
        repository(ctx)
            .authors()
            .into_iter()
            .map(Author::from)
            .collect()
    }

    /// A single book
    async fn book(&self, ctx: &Context<'_>, id: Option<BookId>) -> Option<Book> {
        repository(ctx).book(id?).map(Book::from)
    }

    /// A single author
    async fn author(&self, ctx: &Context<'_>, id: Option<AuthorId>) -> Option<Author> {
        repository(ctx).author(id?).map(Author::from)
    }
}

pub struct Mutation;

/// Root Mutation
#[Object]
impl Mutation {
    /// Add a book
    async fn add_book(
        &self,
        ctx: &Context<'_>,
        name: String,
        author_id: AuthorId,
    ) -> Option<Book> {
        // A failed insert reports its error but still yields `addBook: null`.
        match repository(ctx).add_book(name, author_id) {
            Ok(book) => {
                ctx.forget_author(author_id);
                Some(book.into())
            }
            Err(e) => {
                ctx.add_error(e.extend().into_server_error(ctx.item.pos));
                None
            }
        }
    }

    /// Add a author
    async fn add_author(&self, ctx: &Context<'_>, name: String) -> Author {
        let author = repository(ctx).add_author(name);
        ctx.forget_author(author.id);

        author.into()
    }
}
