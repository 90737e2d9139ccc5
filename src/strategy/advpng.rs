use crate::artifact::Artifact;
use crate::runner::Invocation;
use std::path::Path;

/// `advpng -z -4` rewrites its argument in place, so it only ever sees the
/// destination. The caller stages the source bytes there first.
pub fn invocation(program: &Path, destination: &Artifact) -> Invocation {
    Invocation::new(program)
        .args(["-z", "-4", "-f"])
        .arg(destination.path())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets_destination_only() {
        let args = invocation(Path::new("advpng"), &Artifact::new("work/out.png")).args_lossy();
        assert_eq!(args, ["-z", "-4", "-f", "work/out.png"]);
    }
}
