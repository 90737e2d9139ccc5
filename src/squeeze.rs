//! Fans one PNG out across the strategies and keeps the smallest result.

use crate::artifact::Artifact;
use crate::config::{Config, PipelineConfig};
use crate::error::{SqueezeError, StrategyError};
use crate::runner::{ProcessRunner, ToolRunner};
use crate::strategy::{StrategyKind, StrategySet, ToolPaths};
use futures::future::join_all;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// A strategy output that was produced and measured.
#[derive(Debug)]
pub struct Candidate {
    pub strategy: StrategyKind,
    pub artifact: Artifact,
}

impl Candidate {
    pub fn size(&self) -> u64 {
        self.artifact.size().unwrap_or(u64::MAX)
    }
}

pub struct Squeezer<R = ProcessRunner> {
    strategies: StrategySet<R>,
    pipeline: PipelineConfig,
}

impl Squeezer<ProcessRunner> {
    pub fn from_config(config: &Config) -> Self {
        let tools = ToolPaths::resolve(&config.tools);
        let runner = ProcessRunner::new(config.pipeline.output_mode());
        Self::new(StrategySet::new(tools, runner), config.pipeline.clone())
    }
}

impl<R: ToolRunner> Squeezer<R> {
    pub fn new(strategies: StrategySet<R>, pipeline: PipelineConfig) -> Self {
        Self {
            strategies,
            pipeline,
        }
    }

    pub fn strategies(&self) -> &StrategySet<R> {
        &self.strategies
    }

    /// Runs every configured strategy on `input`.
    ///
    /// Outputs live in a scratch directory owned by the returned report. A
    /// result larger than the input still counts as a candidate; whether it is
    /// worth keeping is decided by [`SqueezeReport::persist`].
    pub async fn squeeze(&self, input: &Path) -> Result<SqueezeReport, SqueezeError> {
        if self.pipeline.strategies.is_empty() {
            return Err(SqueezeError::NoStrategies);
        }

        let source = Artifact::measured(input)
            .await
            .map_err(|source| SqueezeError::Source {
                path: input.to_path_buf(),
                source,
            })?;
        let source_size = source.size().unwrap_or_default();

        let scratch = match &self.pipeline.work_dir {
            Some(dir) => {
                tokio::fs::create_dir_all(dir).await?;
                tempfile::Builder::new().prefix("png-squeeze").tempdir_in(dir)?
            }
            None => tempfile::Builder::new().prefix("png-squeeze").tempdir()?,
        };

        info!(
            "Squeezing {} ({} bytes, {:?}) with {} strategies",
            input.display(),
            source_size,
            source.size_class(),
            self.pipeline.strategies.len()
        );

        // one destination per strategy, so a repeated entry runs once
        let mut jobs: Vec<(StrategyKind, Artifact)> = Vec::new();
        for &kind in &self.pipeline.strategies {
            if jobs.iter().all(|(queued, _)| *queued != kind) {
                let destination =
                    Artifact::new(scratch.path().join(format!("{kind}-candidate.png")));
                jobs.push((kind, destination));
            }
        }

        let results: Vec<(StrategyKind, Result<Artifact, StrategyError>)> = if self.pipeline.parallel
        {
            join_all(jobs.into_iter().map(|(kind, destination)| {
                let source = &source;
                async move { (kind, self.strategies.run(kind, source, destination).await) }
            }))
            .await
        } else {
            let mut results = Vec::with_capacity(jobs.len());
            for (kind, destination) in jobs {
                results.push((kind, self.strategies.run(kind, &source, destination).await));
            }
            results
        };

        let mut candidates = Vec::new();
        let mut failures = Vec::new();
        for (kind, result) in results {
            match result {
                Ok(artifact) => candidates.push(Candidate {
                    strategy: kind,
                    artifact,
                }),
                Err(e) => {
                    if e.is_cleanup_failure() {
                        warn!("{} left files behind: {}", kind, e);
                    }
                    failures.push(e);
                }
            }
        }

        let best = candidates
            .iter()
            .enumerate()
            .min_by_key(|(_, candidate)| candidate.size())
            .map(|(index, _)| index);

        if let Some(index) = best {
            let winner = &candidates[index];
            debug!("Best candidate: {} at {} bytes", winner.strategy, winner.size());
        }

        Ok(SqueezeReport {
            source: input.to_path_buf(),
            source_size,
            candidates,
            failures,
            best,
            _scratch: scratch,
        })
    }
}

/// Everything one squeeze produced. Candidate files are deleted when the
/// report is dropped.
#[derive(Debug)]
pub struct SqueezeReport {
    pub source: PathBuf,
    pub source_size: u64,
    pub candidates: Vec<Candidate>,
    pub failures: Vec<StrategyError>,
    best: Option<usize>,
    _scratch: TempDir,
}

impl SqueezeReport {
    /// The smallest candidate; the earlier strategy wins a tie.
    pub fn best(&self) -> Option<&Candidate> {
        self.best.map(|index| &self.candidates[index])
    }

    /// Bytes saved by the best candidate, if it is smaller than the source.
    pub fn savings(&self) -> Option<u64> {
        self.best()
            .map(Candidate::size)
            .filter(|&size| size < self.source_size)
            .map(|size| self.source_size - size)
    }

    /// Writes the result to `output`: the best candidate when it beats the
    /// source, otherwise a copy of the source. When `output` is the source
    /// itself and nothing won, the file is left untouched and `None` is
    /// returned; otherwise the written size is returned.
    pub async fn persist(&self, output: &Path) -> Result<Option<u64>, SqueezeError> {
        if let Some(best) = self.best().filter(|_| self.savings().is_some()) {
            stage_copy(best.artifact.path(), output).await?;
            info!(
                "Wrote {} via {} ({} -> {} bytes)",
                output.display(),
                best.strategy,
                self.source_size,
                best.size()
            );
            return Ok(Some(best.size()));
        }

        if same_file(&self.source, output).await {
            info!("No candidate beat {} bytes; leaving {} untouched", self.source_size, output.display());
            return Ok(None);
        }

        let written = stage_copy(&self.source, output).await?;
        info!(
            "No candidate beat {} bytes; copied source to {}",
            self.source_size,
            output.display()
        );
        Ok(Some(written))
    }

    pub fn summary(&self) -> SqueezeSummary {
        let mut outcomes: Vec<OutcomeSummary> = self
            .candidates
            .iter()
            .map(|candidate| OutcomeSummary {
                strategy: candidate.strategy,
                size: Some(candidate.size()),
                error: None,
            })
            .chain(self.failures.iter().map(|failure| OutcomeSummary {
                strategy: failure.strategy(),
                size: None,
                error: Some(failure.to_string()),
            }))
            .collect();
        outcomes.sort_by_key(|outcome| outcome.strategy);

        SqueezeSummary {
            source: self.source.clone(),
            source_size: self.source_size,
            best: self.best().map(|candidate| candidate.strategy),
            best_size: self.best().map(Candidate::size),
            saved_bytes: self.savings().unwrap_or(0),
            outcomes,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SqueezeSummary {
    pub source: PathBuf,
    pub source_size: u64,
    pub best: Option<StrategyKind>,
    pub best_size: Option<u64>,
    pub saved_bytes: u64,
    pub outcomes: Vec<OutcomeSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutcomeSummary {
    pub strategy: StrategyKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Copies `from` to a temp file next to `output`, then renames it into place
/// so the rename stays on one filesystem. The temp file never outlives a failure.
async fn stage_copy(from: &Path, output: &Path) -> Result<u64, SqueezeError> {
    let temp_path = output.with_extension("png-squeeze.tmp");
    let staged = async {
        let written = tokio::fs::copy(from, &temp_path).await?;
        tokio::fs::rename(&temp_path, output).await?;
        Ok::<_, std::io::Error>(written)
    };

    match staged.await {
        Ok(written) => Ok(written),
        Err(e) => {
            if let Err(cleanup) = tokio::fs::remove_file(&temp_path).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    warn!("Could not remove {}: {}", temp_path.display(), cleanup);
                }
            }
            Err(e.into())
        }
    }
}

async fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (tokio::fs::canonicalize(a).await, tokio::fs::canonicalize(b).await) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
