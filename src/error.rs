use std::io;
use std::net::SocketAddr;

use async_graphql::ErrorExtensions;
use thiserror::Error;

use crate::datamodel::AuthorId;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("author {0} does not exist")]
    InvalidReference(AuthorId),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::InvalidReference(_) => "INVALID_REFERENCE",
        }
    }
}

impl ErrorExtensions for StoreError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| e.set("code", self.code()))
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("server terminated: {0}")]
    Serve(#[from] io::Error),
}
