#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

//! Diarization error rate evaluation from the command line.
//!
//! The [`Cli`] type is the command dispatcher used by the `meeteval-der` binary. It exposes a
//! single evaluation command, [`md-eval-22`](command::Command::MdEval22), which scores
//! hypothesis speaker segments against reference segments following the semantics of NIST's
//! `md-eval-22` scoring tool.
//!
//! The scoring core can also be used directly through the [`der`] and [`format`] modules.

pub mod command;
pub mod der;
pub mod error;
pub mod format;
pub mod segment;

pub(crate) mod limiter;
pub(crate) mod task_pool;

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use tracing_subscriber::EnvFilter;

use crate::command::Command;
pub use crate::error::Error;
pub use crate::error::Result;

/// Command-line dispatcher for diarization evaluation.
#[derive(Debug, Parser)]
#[command(name = "meeteval-der", author, version, about, long_about = None, propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    /// Parses the process arguments and executes the selected [`Command`].
    pub async fn execute() -> Result<()> {
        let cli = Self::parse();
        cli.init_tracing();

        cli.command.execute().await
    }

    fn init_tracing(&self) {
        // `RUST_LOG` wins over -v/-q when it is set.
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(self.verbose.log_level_filter().to_string().to_lowercase())
        });

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }
}
