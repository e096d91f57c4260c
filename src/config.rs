use std::net::SocketAddr;

use clap::Parser;

/// GraphQL API over an in-memory library of authors and books.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Config {
    /// Address to serve `/graphql` on.
    #[arg(long, default_value = "0.0.0.0:8000")]
    pub listen: SocketAddr,

    /// Print the schema in SDL form and exit.
    #[arg(long)]
    pub print_schema: bool,
}
