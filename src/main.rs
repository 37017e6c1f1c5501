//! Main `meeteval-der` program entry point.
//!
//! Simply delegates to the [`Cli`] dispatcher.

use meeteval_der::Cli;

/// Main program entry point.
#[tokio::main]
async fn main() -> meeteval_der::Result<()> {
    Cli::execute().await
}
