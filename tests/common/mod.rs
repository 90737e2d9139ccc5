#![allow(dead_code)]

use async_trait::async_trait;
use png_squeeze::{Invocation, InvocationError, ToolRunner};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub enum SpyBehavior {
    /// Write these bytes to the target and exit zero.
    Succeed(Vec<u8>),
    /// Exit zero without touching the target.
    SucceedSilently,
    /// Write a truncated file to the target, then exit non-zero.
    FailAfterPartialWrite,
    /// Exit non-zero without writing anything.
    Fail,
}

/// Stands in for an optimizer binary. Writes to `target`, whatever the
/// invocation says, and remembers every call.
pub struct SpyRunner {
    target: PathBuf,
    behavior: SpyBehavior,
    calls: AtomicUsize,
    invocations: Mutex<Vec<Invocation>>,
    seen_target_bytes: Mutex<Vec<Option<Vec<u8>>>>,
}

impl SpyRunner {
    pub fn new(target: impl Into<PathBuf>, behavior: SpyBehavior) -> Self {
        Self {
            target: target.into(),
            behavior,
            calls: AtomicUsize::new(0),
            invocations: Mutex::new(Vec::new()),
            seen_target_bytes: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_invocation(&self) -> Option<Invocation> {
        self.invocations.lock().unwrap().last().cloned()
    }

    /// Contents of the target at the moment each call started.
    pub fn seen_target_bytes(&self) -> Vec<Option<Vec<u8>>> {
        self.seen_target_bytes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolRunner for SpyRunner {
    async fn run(&self, invocation: &Invocation) -> Result<(), InvocationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.invocations.lock().unwrap().push(invocation.clone());
        self.seen_target_bytes
            .lock()
            .unwrap()
            .push(std::fs::read(&self.target).ok());

        let fail = || InvocationError::Exit {
            program: invocation.program().to_path_buf(),
            code: Some(1),
            diagnostics: "spy failure".to_string(),
        };

        match &self.behavior {
            SpyBehavior::Succeed(bytes) => {
                std::fs::write(&self.target, bytes).unwrap();
                Ok(())
            }
            SpyBehavior::SucceedSilently => Ok(()),
            SpyBehavior::FailAfterPartialWrite => {
                std::fs::write(&self.target, b"\x89PNG\r\n").unwrap();
                Err(fail())
            }
            SpyBehavior::Fail => Err(fail()),
        }
    }
}

pub fn write_png(path: &Path, len: usize) {
    let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
    bytes.resize(len.max(bytes.len()), 0xAB);
    std::fs::write(path, bytes).unwrap();
}

/// A shell script standing in for every optimizer. It writes `bytes` into each
/// argument ending in `-candidate.png` and exits with `exit_code`.
#[cfg(unix)]
pub fn write_stand_in_tool(dir: &Path, bytes: usize, exit_code: i32) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(format!("stand-in-{bytes}-{exit_code}.sh"));
    let script = format!(
        "#!/bin/sh\n\
         for a in \"$@\"; do\n\
           case \"$a\" in\n\
             *-candidate.png) head -c {bytes} /dev/zero > \"$a\" ;;\n\
           esac\n\
         done\n\
         if [ {exit_code} -ne 0 ]; then echo \"stand-in failed\" >&2; fi\n\
         exit {exit_code}\n"
    );
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
