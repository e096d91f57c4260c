use std::sync::Arc;

use cynic::{MutationBuilder as _, QueryBuilder as _};

use crate::client::{
    AddAuthor, AddAuthorVariables, AddBook, AddBookVariables, AllAuthors, AllBooks, AuthorById,
    BookById, ById, Client,
};
use crate::datamodel::MemoryStore;
use crate::server::{GRAPHQL_PATH, make_app};


use testserver::TestServer;

async fn serve() -> (TestServer, Client) {
    let app = make_app(Arc::new(MemoryStore::seeded()));
    let server = TestServer::start(app).await;
    let client = Client::new(server.endpoint(GRAPHQL_PATH));
    (server, client)
}

#[tokio::test]
async fn lists_seed_data() {
    let (_server, client) = serve().await;

    let books = client.run(AllBooks::build(())).await.data.unwrap().books;
    let names: Vec<_> = books.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "Harry Potter & The Sorcerer's Stone",
            "Harry Potter & The Chamber of Secrets",
            "The Two Towers",
            "Beyond the shadows",
        ]
    );
    assert_eq!(books.iter().map(|b| b.author_id).collect::<Vec<_>>(), [1, 1, 2, 3]);

    let authors = client.run(AllAuthors::build(())).await.data.unwrap().authors;
    let ids: Vec<_> = authors.iter().map(|a| a.id).collect();
    assert_eq!(ids, [1, 2, 3]);
}

#[tokio::test]
async fn looks_up_books_and_their_authors() {
    let (_server, client) = serve().await;

    let book = client
        .run(BookById::build(ById { id: Some(1) }))
        .await
        .data
        .unwrap()
        .book
        .unwrap();
    assert_eq!(book.name, "Harry Potter & The Sorcerer's Stone");

    let missing = client.run(BookById::build(ById { id: Some(999) })).await;
    assert!(missing.errors.is_none());
    assert!(missing.data.unwrap().book.is_none());

    let book = client
        .run(BookById::build(ById { id: Some(3) }))
        .await
        .data
        .unwrap()
        .book
        .unwrap();
    assert_eq!(book.author.unwrap().name, "J. R. R. Tolkien");

    let author = client
        .run(AuthorById::build(ById { id: Some(1) }))
        .await
        .data
        .unwrap()
        .author
        .unwrap();
    let ids: Vec<_> = author.books.iter().map(|b| b.id).collect();
    assert_eq!(ids, [1, 2]);
}

#[tokio::test]
async fn mutations_grow_the_tables() {
    let (_server, client) = serve().await;

    let author = client
        .run(AddAuthor::build(AddAuthorVariables {
            name: "New Author".into(),
        }))
        .await
        .data
        .unwrap()
        .add_author;
    assert_eq!(author.id, 4);
    assert_eq!(author.name, "New Author");

    let authors = client.run(AllAuthors::build(())).await.data.unwrap().authors;
    assert_eq!(authors.last(), Some(&author));

    let book = client
        .run(AddBook::build(AddBookVariables {
            name: "New Book".into(),
            author_id: 1,
        }))
        .await
        .data
        .unwrap()
        .add_book
        .unwrap();
    assert_eq!(book.id, 5);
    assert_eq!(book.author_id, 1);

    let author = client
        .run(AuthorById::build(ById { id: Some(1) }))
        .await
        .data
        .unwrap()
        .author
        .unwrap();
    assert_eq!(author.books.last(), Some(&book));
}

#[tokio::test]
async fn add_book_with_unknown_author_is_an_error() {
    let (_server, client) = serve().await;

    let res = client
        .run(AddBook::build(AddBookVariables {
            name: "Orphan".into(),
            author_id: 42,
        }))
        .await;

    let errors = res.errors.unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "author 42 does not exist");
    assert!(res.data.unwrap().add_book.is_none());

    let books = client.run(AllBooks::build(())).await.data.unwrap().books;
    assert_eq!(books.len(), 4);
}

#[tokio::test]
async fn serves_graphiql() {
    let (server, _client) = serve().await;

    let res = reqwest::get(server.endpoint(GRAPHQL_PATH)).await.unwrap();
    assert!(res.status().is_success());
    let body = res.text().await.unwrap();
    assert!(body.contains("graphiql"), "{body}");
}
