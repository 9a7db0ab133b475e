use clap::Parser;
use zstore::config::Config;
use zstore::{server, Error};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::parse();

    server::run(config).await
}
