use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use datamodel::{MemoryStore, SharedRepository};
use error::ServerError;
use server::{GRAPHQL_PATH, Library, make_app};

#[cfg(test)]
mod client;
mod config;
mod datamodel;
mod error;
mod server;

#[cfg(test)]
mod tests;

fn install_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let config = Config::parse();
    let repository: SharedRepository = Arc::new(MemoryStore::seeded());

    if config.print_schema {
        print!("{}", Library::new(repository).sdl());
        return Ok(());
    }

    install_tracing();

    let app = make_app(repository);
    let listener = TcpListener::bind(config.listen)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.listen,
            source,
        })?;
    info!("serving GraphQL on http://{}{GRAPHQL_PATH}", config.listen);

    axum::serve(listener, app).await?;
    Ok(())
}
