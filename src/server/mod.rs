use async_graphql::http::GraphiQLSource;
use async_graphql::{EmptySubscription, Request, Response, Schema};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::Router;
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use tracing::{Instrument, info_span, warn};

use crate::datamodel::SharedRepository;

mod dataloader;
mod loaders;
mod schema;

use dataloader::DataLoader;
use loaders::{LoadAuthors, LoadBooks};
use schema::{Mutation, Query};

pub const GRAPHQL_PATH: &str = "/graphql";

type LibrarySchema = Schema<Query, Mutation, EmptySubscription>;

/// The schema together with the repository its loaders read from.
#[derive(Clone)]
pub struct Library {
    schema: LibrarySchema,
    repository: SharedRepository,
}

impl Library {
    pub fn new(repository: SharedRepository) -> Self {
        let schema = Schema::build(Query, Mutation, EmptySubscription)
            .data(repository.clone())
            .finish();
        Self { schema, repository }
    }

    pub fn sdl(&self) -> String {
        self.schema.sdl()
    }

    /// Runs one request with a fresh set of loaders.
    pub async fn execute(&self, req: impl Into<Request>) -> Response {
        let load_authors = DataLoader::new(LoadAuthors::new(self.repository.clone()));
        let load_books = DataLoader::new(LoadBooks::new(self.repository.clone()));
        let req = req
            .into()
            .data(load_authors.clone())
            .data(load_books.clone());

        let span = info_span!("graphql", operation = req.operation_name.as_deref());
        let execute = self.schema.execute(req);
        let wrapped = load_books.wrap(load_authors.wrap(execute));
        let res = wrapped.instrument(span).await;

        if res.is_err() {
            warn!(errors = ?res.errors, "request finished with errors");
        }
        res
    }
}

async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint(GRAPHQL_PATH).finish())
}

#[axum::debug_handler]
async fn graphql_handler(State(library): State<Library>, req: GraphQLRequest) -> GraphQLResponse {
    library.execute(req.into_inner()).await.into()
}

pub fn make_app(repository: SharedRepository) -> Router {
    Router::new()
        .route(GRAPHQL_PATH, get(graphiql).post(graphql_handler))
        .with_state(Library::new(repository))
}
