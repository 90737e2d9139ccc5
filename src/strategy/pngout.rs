use crate::artifact::Artifact;
use crate::runner::Invocation;
use std::path::Path;

/// Thorough search, used unless the input is large.
pub const DEPTH_THOROUGH: &str = "-s0";
/// Quicker search for large inputs.
pub const DEPTH_FAST: &str = "-s1";

pub fn depth_flag(source: &Artifact) -> &'static str {
    if source.is_large() {
        DEPTH_FAST
    } else {
        DEPTH_THOROUGH
    }
}

/// `pngout` verbose, forced, non-interactive, keeping no ancillary chunks.
pub fn invocation(program: &Path, source: &Artifact, destination: &Artifact) -> Invocation {
    Invocation::new(program)
        .arg(source.path())
        .arg(destination.path())
        .arg(depth_flag(source))
        .args(["-k0", "-v", "-r", "-force", "-nil"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::LARGE_LIMIT;

    #[test]
    fn test_depth_selected_by_large_only() {
        let destination = Artifact::new("out.png");
        for (size, expected) in [
            (100, DEPTH_THOROUGH),
            (LARGE_LIMIT, DEPTH_THOROUGH),
            (LARGE_LIMIT + 1, DEPTH_FAST),
        ] {
            let args = invocation(
                Path::new("pngout"),
                &Artifact::with_size("in.png", size),
                &destination,
            )
            .args_lossy();
            assert_eq!(args[2], expected);
            let depth_flags = args
                .iter()
                .filter(|a| *a == DEPTH_FAST || *a == DEPTH_THOROUGH)
                .count();
            assert_eq!(depth_flags, 1);
        }
    }
}
