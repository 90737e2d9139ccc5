use crate::artifact::Artifact;
use crate::runner::Invocation;
use std::path::Path;

pub const OPTIMIZATION_LEVEL: &str = "-o6";

/// `optipng -o6`, the same for every input.
pub fn invocation(program: &Path, source: &Artifact, destination: &Artifact) -> Invocation {
    Invocation::new(program)
        .args(["-force", OPTIMIZATION_LEVEL])
        .arg(source.path())
        .arg("-out")
        .arg(destination.path())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ignores_size() {
        let destination = Artifact::new("out.png");
        let small = invocation(Path::new("optipng"), &Artifact::with_size("in.png", 10), &destination);
        let large = invocation(
            Path::new("optipng"),
            &Artifact::with_size("in.png", 10 << 30),
            &destination,
        );
        assert_eq!(small, large);
        assert_eq!(
            small.args_lossy(),
            ["-force", "-o6", "in.png", "-out", "out.png"]
        );
    }
}
