use crate::artifact::{Artifact, SizeClass};
use crate::runner::Invocation;
use std::path::Path;

/// Ancillary chunks carried over from the source, covering standard PNG,
/// APNG animation and Fireworks editor chunks.
pub const KEEP_CHUNKS: [&str; 19] = [
    "tEXt", "zTXt", "iTXt", "gAMA", "sRGB", "iCCP", "bKGD", "pHYs", "sBIT", "tIME", "oFFs",
    "acTL", "fcTL", "fdAT", "prVW", "mkBF", "mkTS", "mkBS", "mkBT",
];

const BASE_TIME_LIMIT_SECS: u64 = 10;
const MAX_TIME_LIMIT_SECS: u64 = 60;
const BASE_ITERATIONS: u32 = 15;
const BASE_SPLITTING: u32 = 1;
const SMALL_SPLITTING: u32 = 3;

/// Search parameters derived from the source size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZopfliParams {
    pub time_limit_secs: u64,
    pub iterations: u32,
    pub splitting: u32,
}

impl ZopfliParams {
    pub fn for_source(source: &Artifact) -> Self {
        let size = source.size().unwrap_or(0);
        let mut params = Self {
            time_limit_secs: time_limit_secs(size),
            iterations: BASE_ITERATIONS,
            splitting: BASE_SPLITTING,
        };

        match source.size_class() {
            SizeClass::Large => params.iterations /= 2,
            SizeClass::Small => {
                params.iterations *= 2;
                params.splitting = SMALL_SPLITTING;
            }
            SizeClass::Medium => {}
        }

        params
    }
}

/// Ten seconds plus one per KiB, capped at a minute.
pub fn time_limit_secs(size: u64) -> u64 {
    BASE_TIME_LIMIT_SECS
        .saturating_add(size / 1024)
        .min(MAX_TIME_LIMIT_SECS)
}

pub fn invocation(program: &Path, source: &Artifact, destination: &Artifact) -> Invocation {
    let params = ZopfliParams::for_source(source);

    Invocation::new(program)
        .args(["--lossy_transparent", "-y", "--always_zopflify"])
        .arg(format!("--keepchunks={}", KEEP_CHUNKS.join(",")))
        .arg(format!("--splitting={}", params.splitting))
        .arg(format!("--iterations={}", params.iterations))
        .arg(format!("--timelimit={}", params.time_limit_secs))
        .arg(source.path())
        .arg(destination.path())
}
