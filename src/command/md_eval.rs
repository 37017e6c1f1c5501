//! Definition of the [`MdEval22`](crate::command::Command::MdEval22) command.

pub mod args;
pub mod output;

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use regex::Regex;
use tokio::task::spawn_blocking;
use tracing::{debug, info, instrument, trace, warn};

use crate::command::md_eval::args::MdEval22Args;
use crate::command::md_eval::output::OutputTarget;
use crate::der::interval::IntervalSet;
use crate::der::{score_session, DiaErrorRate, SessionResult};
use crate::format::read_sessions;
use crate::format::uem::{read_uem, Uem};
use crate::limiter::Limiter;
use crate::segment::{Segment, Sessions};
use crate::task_pool::TaskPool;
use crate::Result;

/// Command wrapper used for the [`MdEval22`](crate::command::Command::MdEval22) command.
///
/// # Notes
///
/// The [`new`](MdEval22Command::new) method returns a [`MdEval22Command`] wrapped in an [`Arc`],
/// because sessions are scored in concurrent tasks. To use:
///
/// ```no_run
/// # use meeteval_der::command::md_eval::args::MdEval22Args;
/// use meeteval_der::command::md_eval::MdEval22Command;
///
/// # async fn evaluate(args: MdEval22Args) -> meeteval_der::Result<()> {
/// let md_eval_command = MdEval22Command::new(args);
/// MdEval22Command::execute(md_eval_command).await
/// # }
/// ```
#[derive(Debug)]
pub struct MdEval22Command {
    args: MdEval22Args,
    limiter: Limiter,
}

/// One session ready to be scored.
#[derive(Debug)]
struct SessionInput {
    session_id: String,
    reference: Vec<Segment>,
    hypothesis: Vec<Segment>,
    uem: Option<IntervalSet>,
}

impl MdEval22Command {
    /// Creates a new [`MdEval22Command`] using the provided [`args`](MdEval22Args).
    pub fn new(args: MdEval22Args) -> Arc<Self> {
        let limiter = Limiter::new(args.max_jobs.get());

        Arc::new(Self { args, limiter })
    }

    /// Scores all sessions and writes the results.
    ///
    /// See [struct description](Self) for details on how to call this method.
    #[instrument(skip_all)]
    pub async fn execute(this: Arc<Self>) -> Result<()> {
        info!(
            "Scoring {} against {}",
            display_paths(&this.args.hypothesis),
            display_paths(&this.args.reference)
        );
        trace!(?this.args);

        let results = this.evaluate().await?;
        let average: DiaErrorRate = results.values().map(|result| &result.error_rate).sum();

        // Output paths are derived from the first hypothesis file.
        let first_hypothesis = this
            .args
            .hypothesis
            .first()
            .ok_or_else(|| anyhow!("no hypothesis file given"))?;

        OutputTarget::from_template(&this.args.per_reco_out, first_hypothesis)
            .write_json(&results)
            .await?;
        OutputTarget::from_template(&this.args.average_out, first_hypothesis)
            .write_json(&average)
            .await?;

        info!("{}", summary(&average, results.len()));
        Ok(())
    }

    /// Loads the input files and scores every session, without writing anything.
    #[instrument(skip_all)]
    pub async fn evaluate(self: &Arc<Self>) -> Result<BTreeMap<String, SessionResult>> {
        let mut reference = read_sessions(&self.args.reference).await?;
        let mut hypothesis = read_sessions(&self.args.hypothesis).await?;
        let uem = match self.args.uem.is_empty() {
            true => None,
            false => Some(read_uem(&self.args.uem).await?),
        };

        if let Some(regex) = &self.args.regex {
            filter_sessions(regex, &mut reference, &mut hypothesis)?;
        }

        let inputs = pair_sessions(reference, hypothesis, uem.as_ref())?;
        if inputs.is_empty() {
            warn!("No sessions to score");
        }
        debug!(sessions = inputs.len(), max_jobs = self.args.max_jobs.get(), "Sessions loaded");

        self.score_sessions(inputs).await
    }

    #[instrument(level = "debug", skip_all)]
    async fn score_sessions(
        self: &Arc<Self>,
        inputs: Vec<SessionInput>,
    ) -> Result<BTreeMap<String, SessionResult>> {
        let mut task_pool = TaskPool::new();

        for input in inputs {
            task_pool.spawn(Self::score_one_session(Arc::clone(self), input));
        }

        let results = task_pool
            .join(|| "errors detected while scoring sessions")
            .await?;

        Ok(results
            .into_iter()
            .map(|result| (result.session_id.clone(), result))
            .collect())
    }

    #[instrument(level = "debug", skip_all, fields(session_id = %input.session_id))]
    async fn score_one_session(this: Arc<Self>, input: SessionInput) -> Result<SessionResult> {
        let _permit = this.limiter.get_permit().await;
        let options = this.args.scoring_options();
        let session_id = input.session_id.clone();

        let result = spawn_blocking(move || {
            score_session(
                &input.session_id,
                &input.reference,
                &input.hypothesis,
                input.uem.as_ref(),
                &options,
            )
        })
        .await
        .with_context(|| format!("failed to score session {session_id}"))?;

        debug!(error_rate = ?result.error_rate.error_rate, "Session scored");
        trace!(?result);

        Ok(result)
    }
}

fn filter_sessions(
    regex: &Regex,
    reference: &mut Sessions,
    hypothesis: &mut Sessions,
) -> Result<()> {
    reference.retain(|session_id| regex.is_match(session_id));
    hypothesis.retain(|session_id| regex.is_match(session_id));

    match reference.is_empty() && hypothesis.is_empty() {
        true => Err(anyhow!("no session matches regex {regex}")),
        false => Ok(()),
    }
}

fn pair_sessions(
    mut reference: Sessions,
    mut hypothesis: Sessions,
    uem: Option<&Uem>,
) -> Result<Vec<SessionInput>> {
    let unknown: Vec<_> = hypothesis
        .session_ids()
        .filter(|session_id| !reference.contains(session_id))
        .collect();
    if !unknown.is_empty() {
        return Err(anyhow!(
            "hypothesis contains sessions missing from the reference: {}",
            unknown.join(", ")
        ));
    }

    if let Some(uem) = uem {
        let uncovered: Vec<_> = reference
            .session_ids()
            .filter(|session_id| uem.get(session_id).is_none())
            .collect();
        if !uncovered.is_empty() {
            return Err(anyhow!("no UEM entry for sessions: {}", uncovered.join(", ")));
        }
    }

    let session_ids: Vec<String> = reference.session_ids().map(String::from).collect();
    Ok(session_ids
        .into_iter()
        .map(|session_id| {
            if !hypothesis.contains(&session_id) {
                warn!("Session {session_id} has no hypothesis segments; scoring it as empty");
            }

            SessionInput {
                reference: reference.take(&session_id),
                hypothesis: hypothesis.take(&session_id),
                uem: uem.and_then(|uem| uem.get(&session_id)).cloned(),
                session_id,
            }
        })
        .collect())
}

fn summary(average: &DiaErrorRate, sessions: usize) -> String {
    let error_rate = average
        .error_rate
        .map_or_else(|| "n/a".to_string(), |rate| format!("{:.2}%", rate * 100.0));

    format!(
        "DER: {error_rate} over {sessions} session(s) (scored: {:.2}s, missed: {:.2}s, \
         false alarm: {:.2}s, speaker error: {:.2}s)",
        average.scored_speaker_time,
        average.missed_speaker_time,
        average.falarm_speaker_time,
        average.speaker_error_time,
    )
}

fn display_paths(paths: &[std::path::PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
