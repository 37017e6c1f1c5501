//! Result file destinations and writing.

use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use tokio::fs;
use tokio::io::{stdout, AsyncWriteExt};
use tracing::{info, instrument};

use crate::Result;

const STDOUT_MARKER: &str = "-";

/// Where a result is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Standard output
    Stdout,

    /// A file, created along with its parent directories if needed
    File(PathBuf),
}

impl OutputTarget {
    /// Resolves a path template against the first hypothesis file.
    ///
    /// `{parent}` is replaced by the directory of `hypothesis` (`.` when it has none) and
    /// `{stem}` by its file name without extension. `-` selects standard output.
    pub fn from_template(template: &str, hypothesis: &Path) -> Self {
        if template == STDOUT_MARKER {
            return Self::Stdout;
        }

        let parent = hypothesis
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let stem = hypothesis
            .file_stem()
            .map(|stem| stem.to_string_lossy())
            .unwrap_or_default();

        Self::File(PathBuf::from(
            template
                .replace("{parent}", &parent.to_string_lossy())
                .replace("{stem}", &stem),
        ))
    }

    /// Serializes `value` as pretty-printed JSON to this target.
    #[instrument(level = "debug", skip(value))]
    pub async fn write_json<T>(&self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let mut json = serde_json::to_string_pretty(value)
            .with_context(|| format!("failed to serialize results for {self}"))?;
        json.push('\n');

        match self {
            Self::Stdout => {
                let mut out = stdout();
                out.write_all(json.as_bytes())
                    .await
                    .with_context(|| "failed to write results to stdout")?;
                out.flush()
                    .await
                    .with_context(|| "failed to flush stdout")
            },
            Self::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).await.with_context(|| {
                        format!("failed to create output directory {}", parent.display())
                    })?;
                }
                fs::write(path, json)
                    .await
                    .with_context(|| format!("failed to write results to {}", path.display()))?;

                info!("Wrote: {}", path.display());
                Ok(())
            },
        }
    }
}

impl Display for OutputTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdout => write!(f, "stdout"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    mod output_target {
        mod from_template {
            use std::path::{Path, PathBuf};

            use crate::command::md_eval::args::{DEFAULT_AVERAGE_OUT, DEFAULT_PER_RECO_OUT};
            use crate::command::md_eval::output::OutputTarget;

            #[test]
            fn test_default_templates() {
                let hypothesis = Path::new("exp/system/hyp.rttm");

                assert_eq!(
                    OutputTarget::File(PathBuf::from("exp/system/hyp_md_eval_22.json")),
                    OutputTarget::from_template(DEFAULT_AVERAGE_OUT, hypothesis)
                );
                assert_eq!(
                    OutputTarget::File(PathBuf::from("exp/system/hyp_md_eval_22_per_reco.json")),
                    OutputTarget::from_template(DEFAULT_PER_RECO_OUT, hypothesis)
                );
            }

            #[test]
            fn test_no_parent() {
                assert_eq!(
                    OutputTarget::File(PathBuf::from("./hyp_md_eval_22.json")),
                    OutputTarget::from_template(DEFAULT_AVERAGE_OUT, Path::new("hyp.rttm"))
                );
            }

            #[test]
            fn test_stdout() {
                assert_eq!(
                    OutputTarget::Stdout,
                    OutputTarget::from_template("-", Path::new("hyp.rttm"))
                );
            }

            #[test]
            fn test_fixed_path() {
                assert_eq!(
                    OutputTarget::File(PathBuf::from("out/result.json")),
                    OutputTarget::from_template("out/result.json", Path::new("a/hyp.rttm"))
                );
            }
        }
    }
}
