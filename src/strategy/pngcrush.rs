use crate::artifact::Artifact;
use crate::runner::Invocation;
use std::path::Path;

pub const BRUTE_FLAG: &str = "-brute";

/// `pngcrush` with every reduction enabled; small inputs also get the
/// exhaustive filter/zlib search.
pub fn invocation(program: &Path, source: &Artifact, destination: &Artifact) -> Invocation {
    let invocation = Invocation::new(program).args([
        "-nofilecheck",
        "-bail",
        "-blacken",
        "-reduce",
        "-rem",
        "alla",
        "-force",
    ]);

    let invocation = if source.is_small() {
        invocation.arg(BRUTE_FLAG)
    } else {
        invocation
    };

    invocation.arg(source.path()).arg(destination.path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{LARGE_LIMIT, SMALL_LIMIT};

    fn args_for(size: u64) -> Vec<String> {
        let source = Artifact::with_size("in.png", size);
        invocation(Path::new("pngcrush"), &source, &Artifact::new("out.png")).args_lossy()
    }

    #[test]
    fn test_brute_only_for_small_inputs() {
        assert!(args_for(1024).contains(&BRUTE_FLAG.to_string()));
        assert!(!args_for(SMALL_LIMIT).contains(&BRUTE_FLAG.to_string()));
        assert!(!args_for(LARGE_LIMIT * 4).contains(&BRUTE_FLAG.to_string()));
    }

    #[test]
    fn test_paths_come_last() {
        let args = args_for(1024);
        assert_eq!(&args[args.len() - 2..], ["in.png", "out.png"]);
        assert_eq!(args[..4], ["-nofilecheck", "-bail", "-blacken", "-reduce"]);
    }
}
