//! Definition of supported CLI commands.

pub mod md_eval;

use clap::Subcommand;

use crate::command::md_eval::args::MdEval22Args;
use crate::command::md_eval::MdEval22Command;
use crate::Result;

/// Possible commands supported by our CLI application.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute the diarization error rate (DER) like NIST's md-eval-22
    ///
    /// Hypothesis speaker segments are scored against reference speaker segments, session by
    /// session. Reference and hypothesis speakers are mapped one-to-one so that their common
    /// speaking time is maximal; the error rate is then the sum of missed speech, false alarm
    /// speech and speaker confusion, divided by the total reference speaker time.
    ///
    /// Segments can be read from RTTM (.rttm), STM (.stm) or SegLST (.json) files. Per-session
    /// and average results are written as JSON next to the first hypothesis file unless other
    /// paths are given.
    #[command(name = "md-eval-22", alias = "md_eval_22", disable_help_flag = true)]
    MdEval22(MdEval22Args),
}

impl Command {
    /// Execute this [`Command`].
    ///
    /// This method is provided explicitly in order to make it `async`.
    pub async fn execute(self) -> Result<()> {
        match self {
            Command::MdEval22(args) => {
                let md_eval_command = MdEval22Command::new(args);
                MdEval22Command::execute(md_eval_command).await
            },
        }
    }
}
