use cynic::http::ReqwestExt;
use cynic::serde;
use reqwest::Url;

pub struct Client {
    client: reqwest::Client,
    url: Url,
}

impl Client {
    pub fn new(url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    pub async fn run<Op, Input>(
        &self,
        op: cynic::Operation<Op, Input>,
    ) -> cynic::GraphQlResponse<Op>
    where
        Input: serde::Serialize,
        Op: serde::de::DeserializeOwned + 'static,
    {
        self.client
            .post(self.url.clone())
            .run_graphql(op)
            .await
            .unwrap()
    }
}

#[cynic::schema("library")]
mod schema {}

#[derive(cynic::QueryFragment, Debug, PartialEq)]
pub struct Book {
    pub id: i32,
    pub name: String,
    pub author_id: i32,
}

#[derive(cynic::QueryFragment, Debug, PartialEq)]
pub struct Author {
    pub id: i32,
    pub name: String,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Book")]
pub struct BookWithAuthor {
    pub name: String,
    pub author: Option<Author>,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Author")]
pub struct AuthorWithBooks {
    pub name: String,
    pub books: Vec<Book>,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Query")]
pub struct AllBooks {
    pub books: Vec<Book>,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Query")]
pub struct AllAuthors {
    pub authors: Vec<Author>,
}

#[derive(cynic::QueryVariables, Debug)]
pub struct ById {
    pub id: Option<i32>,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Query", variables = "ById")]
pub struct BookById {
    #[arguments(id: $id)]
    pub book: Option<BookWithAuthor>,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Query", variables = "ById")]
pub struct AuthorById {
    #[arguments(id: $id)]
    pub author: Option<AuthorWithBooks>,
}

#[derive(cynic::QueryVariables, Debug)]
pub struct AddAuthorVariables {
    pub name: String,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation", variables = "AddAuthorVariables")]
pub struct AddAuthor {
    #[arguments(name: $name)]
    pub add_author: Author,
}

#[derive(cynic::QueryVariables, Debug)]
pub struct AddBookVariables {
    pub name: String,
    pub author_id: i32,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation", variables = "AddBookVariables")]
pub struct AddBook {
    #[arguments(name: $name, authorId: $author_id)]
    pub add_book: Option<Book>,
}
