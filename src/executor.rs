//! Runs one strategy's command and enforces the no-partial-output rule.

use crate::artifact::Artifact;
use crate::error::StrategyError;
use crate::runner::{Invocation, ToolRunner};
use crate::strategy::StrategyKind;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Runs `invocation` and measures `destination` afterwards.
///
/// Any failure removes a leftover destination before the failure is returned.
/// If that cleanup fails the result is [`StrategyError::Cleanup`], wrapping the
/// original failure.
pub async fn execute<R>(
    runner: &R,
    strategy: StrategyKind,
    invocation: &Invocation,
    mut destination: Artifact,
) -> Result<Artifact, StrategyError>
where
    R: ToolRunner + ?Sized,
{
    let start_time = Instant::now();
    debug!("{}: {}", strategy, invocation);

    if let Err(e) = runner.run(invocation).await {
        warn!("{} failed after {:?}: {}", strategy, start_time.elapsed(), e);
        let failure = StrategyError::Invocation {
            strategy,
            source: e,
        };
        return Err(discard(strategy, &destination, failure).await);
    }

    match destination.load_size().await {
        Ok(size) => {
            info!(
                "{} produced {} bytes in {:?}",
                strategy,
                size,
                start_time.elapsed()
            );
            Ok(destination)
        }
        Err(e) => {
            let failure = StrategyError::Measure {
                strategy,
                path: destination.path().to_path_buf(),
                source: e,
            };
            Err(discard(strategy, &destination, failure).await)
        }
    }
}

/// Removes whatever the failed run left at `destination` and hands back the
/// error the caller should see.
async fn discard(
    strategy: StrategyKind,
    destination: &Artifact,
    failure: StrategyError,
) -> StrategyError {
    let cleanup = async {
        if destination.exists().await? {
            debug!(
                "{}: removing partial output {}",
                strategy,
                destination.path().display()
            );
            destination.remove().await?;
        }
        Ok::<_, std::io::Error>(())
    };

    match cleanup.await {
        Ok(()) => failure,
        Err(e) => {
            warn!(
                "{}: could not clean up {}: {}",
                strategy,
                destination.path().display(),
                e
            );
            StrategyError::Cleanup {
                strategy,
                path: destination.path().to_path_buf(),
                source: e,
                failure: Box::new(failure),
            }
        }
    }
}
