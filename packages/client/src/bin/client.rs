//! Hiroba terminal chat client.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-client -- --server http://127.0.0.1:8080 --username alice
//! ```

use clap::Parser;
use hiroba_client::cli::Cli;
use hiroba_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let (config, login) = match Cli::parse().resolve() {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = hiroba_client::run(config, login).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
