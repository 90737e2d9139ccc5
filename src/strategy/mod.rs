//! The five optimizers and the argument lists they are run with.

pub mod advpng;
pub mod optipng;
pub mod pngcrush;
pub mod pngout;
pub mod tools;
pub mod zopflipng;

pub use tools::ToolPaths;

use crate::artifact::Artifact;
use crate::error::StrategyError;
use crate::executor;
use crate::runner::{Invocation, ProcessRunner, ToolRunner};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Maximal reduction, exhaustive `-brute` search on small inputs.
    Pngcrush,
    /// Fixed `-o6` baseline.
    Optipng,
    /// Zopfli recompression bounded by a size-derived time limit.
    Zopflipng,
    /// Single pass whose search depth depends on whether the input is large.
    Pngout,
    /// In-place recompressor; the source is copied to the destination first.
    Advpng,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [
        StrategyKind::Pngcrush,
        StrategyKind::Optipng,
        StrategyKind::Zopflipng,
        StrategyKind::Pngout,
        StrategyKind::Advpng,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::Pngcrush => "pngcrush",
            StrategyKind::Optipng => "optipng",
            StrategyKind::Zopflipng => "zopflipng",
            StrategyKind::Pngout => "pngout",
            StrategyKind::Advpng => "advpng",
        }
    }

    /// Whether the tool can only rewrite a file in place.
    pub fn is_in_place(&self) -> bool {
        matches!(self, StrategyKind::Advpng)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "unknown strategy '{s}' (expected one of: {})",
                    StrategyKind::ALL.map(|k| k.name()).join(", ")
                )
            })
    }
}

/// The strategies bound to concrete tool locations and a way to run them.
#[derive(Debug, Clone)]
pub struct StrategySet<R = ProcessRunner> {
    tools: ToolPaths,
    runner: R,
}

impl<R: ToolRunner> StrategySet<R> {
    pub fn new(tools: ToolPaths, runner: R) -> Self {
        Self { tools, runner }
    }

    pub fn tools(&self) -> &ToolPaths {
        &self.tools
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Builds the command `kind` would run. Depends only on the paths and the
    /// source's size.
    pub fn invocation(
        &self,
        kind: StrategyKind,
        source: &Artifact,
        destination: &Artifact,
    ) -> Invocation {
        let program = self.tools.get(kind);
        match kind {
            StrategyKind::Pngcrush => pngcrush::invocation(program, source, destination),
            StrategyKind::Optipng => optipng::invocation(program, source, destination),
            StrategyKind::Zopflipng => zopflipng::invocation(program, source, destination),
            StrategyKind::Pngout => pngout::invocation(program, source, destination),
            StrategyKind::Advpng => advpng::invocation(program, destination),
        }
    }

    /// Runs one strategy from `source` into `destination`.
    ///
    /// On success the destination comes back with its measured size. On
    /// failure it is consumed and no longer exists on disk, unless the error is
    /// [`StrategyError::Cleanup`]. The source is never written to; if its size
    /// is not known yet it is measured on a copy of the handle.
    pub async fn run(
        &self,
        kind: StrategyKind,
        source: &Artifact,
        destination: Artifact,
    ) -> Result<Artifact, StrategyError> {
        // parameters depend on the size class, so an unmeasured source is measured first
        let mut measured = None;
        let source: &Artifact = if source.size().is_some() {
            source
        } else {
            let mut sized = source.clone();
            sized
                .load_size()
                .await
                .map_err(|e| StrategyError::SourceSize {
                    strategy: kind,
                    path: source.path().to_path_buf(),
                    source: e,
                })?;
            measured.insert(sized)
        };

        let invocation = self.invocation(kind, source, &destination);

        if kind.is_in_place() {
            let copied = source.copy_to(&destination).await.map_err(|e| {
                StrategyError::Duplicate {
                    strategy: kind,
                    from: source.path().to_path_buf(),
                    to: destination.path().to_path_buf(),
                    source: e,
                }
            })?;
            debug!(
                "{}: staged {} bytes at {}",
                kind,
                copied,
                destination.path().display()
            );
        }

        executor::execute(&self.runner, kind, &invocation, destination).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strategy_names() {
        assert_eq!("zopflipng".parse::<StrategyKind>(), Ok(StrategyKind::Zopflipng));
        assert_eq!("AdvPNG".parse::<StrategyKind>(), Ok(StrategyKind::Advpng));
        assert!("pngquant".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn test_only_advpng_is_in_place() {
        let in_place: Vec<_> = StrategyKind::ALL
            .into_iter()
            .filter(StrategyKind::is_in_place)
            .collect();
        assert_eq!(in_place, vec![StrategyKind::Advpng]);
    }

    #[test]
    fn test_invocation_is_deterministic() {
        let set = StrategySet::new(ToolPaths::from_base_dir("/opt/png"), ProcessRunner::default());
        let source = Artifact::with_size("in.png", 4096);
        let destination = Artifact::new("out.png");
        for kind in StrategyKind::ALL {
            assert_eq!(
                set.invocation(kind, &source, &destination),
                set.invocation(kind, &source, &destination)
            );
        }
    }
}
