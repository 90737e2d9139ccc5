use crate::runner::InvocationError;
use crate::strategy::StrategyKind;
use std::path::PathBuf;
use thiserror::Error;

/// Why a single strategy did not produce a measured output.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("{strategy} failed: {source}")]
    Invocation {
        strategy: StrategyKind,
        #[source]
        source: InvocationError,
    },

    #[error("{strategy} could not measure source {path}: {source}", path = .path.display())]
    SourceSize {
        strategy: StrategyKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{strategy} finished but {path} could not be measured: {source}", path = .path.display())]
    Measure {
        strategy: StrategyKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{strategy} could not copy {from} to {to}: {source}", from = .from.display(), to = .to.display())]
    Duplicate {
        strategy: StrategyKind,
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cleanup of {path} failed ({source}) after: {failure}", path = .path.display())]
    Cleanup {
        strategy: StrategyKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
        failure: Box<StrategyError>,
    },
}

impl StrategyError {
    pub fn strategy(&self) -> StrategyKind {
        match self {
            StrategyError::Invocation { strategy, .. }
            | StrategyError::SourceSize { strategy, .. }
            | StrategyError::Measure { strategy, .. }
            | StrategyError::Duplicate { strategy, .. }
            | StrategyError::Cleanup { strategy, .. } => *strategy,
        }
    }

    /// True when the failure left the filesystem in an unexpected state.
    pub fn is_cleanup_failure(&self) -> bool {
        matches!(self, StrategyError::Cleanup { .. })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}", path = .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}", path = .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Error)]
pub enum SqueezeError {
    #[error("cannot read source {path}: {source}", path = .path.display())]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no strategies selected")]
    NoStrategies,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
