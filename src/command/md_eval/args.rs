//! Arguments that can be passed to the [`MdEval22`](crate::command::Command::MdEval22) command.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{ArgAction, Args};
use regex::Regex;

use crate::der::{Regions, ScoringOptions};

/// Default path template of the average result.
pub const DEFAULT_AVERAGE_OUT: &str = "{parent}/{stem}_md_eval_22.json";

/// Default path template of the per-session results.
pub const DEFAULT_PER_RECO_OUT: &str = "{parent}/{stem}_md_eval_22_per_reco.json";

/// Command-line arguments accepted by the [`MdEval22`](crate::command::Command::MdEval22) command.
///
/// `-h` is taken by `--hypothesis`, so help is only available through `--help`.
#[derive(Debug, Clone, Args)]
pub struct MdEval22Args {
    /// Reference file(s): .rttm, .stm or .json (SegLST)
    #[arg(short, long, required = true, num_args = 1..)]
    pub reference: Vec<PathBuf>,

    /// Hypothesis file(s): .rttm, .stm or .json (SegLST)
    #[arg(short = 'h', long, required = true, num_args = 1..)]
    pub hypothesis: Vec<PathBuf>,

    /// No-score collar around reference segment boundaries, in seconds
    #[arg(long, default_value_t = 0.0, value_parser = parse_collar)]
    pub collar: f64,

    /// Which regions to score
    #[arg(long, value_enum, default_value_t = Regions::All)]
    pub regions: Regions,

    /// UEM file(s) restricting the scored regions of each session
    #[arg(long, num_args = 1..)]
    pub uem: Vec<PathBuf>,

    /// Only score sessions whose id fully matches this regular expression
    #[arg(long, value_parser = parse_session_regex)]
    pub regex: Option<Regex>,

    /// Where to write the average result ({parent} and {stem} refer to the first hypothesis file; - for stdout)
    #[arg(long, default_value = DEFAULT_AVERAGE_OUT)]
    pub average_out: String,

    /// Where to write the per-session results ({parent} and {stem} refer to the first hypothesis file; - for stdout)
    #[arg(long, default_value = DEFAULT_PER_RECO_OUT)]
    pub per_reco_out: String,

    /// Maximum number of sessions scored concurrently
    #[arg(short = 'j', long, default_value = "4")]
    pub max_jobs: NonZeroUsize,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    #[allow(dead_code)]
    help: Option<bool>,
}

impl MdEval22Args {
    /// Scoring options selected by these arguments.
    pub fn scoring_options(&self) -> ScoringOptions {
        ScoringOptions { collar: self.collar, regions: self.regions }
    }
}

// Anchored so that the whole session id has to match.
fn parse_session_regex(value: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{value})$"))
}

fn parse_collar(value: &str) -> Result<f64, String> {
    let collar: f64 = value
        .parse()
        .map_err(|_| format!("{value:?} is not a number"))?;

    match collar.is_finite() && collar >= 0.0 {
        true => Ok(collar),
        false => Err(format!("collar must be a non-negative number of seconds, got {value}")),
    }
}
