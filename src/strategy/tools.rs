use super::StrategyKind;
use crate::config::ToolsConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Where each optimizer binary lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pngcrush: PathBuf,
    optipng: PathBuf,
    zopflipng: PathBuf,
    pngout: PathBuf,
    advpng: PathBuf,
}

impl ToolPaths {
    /// Binaries laid out under `base` the way the bundled tool tree ships them.
    pub fn from_base_dir(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self::from_fn(|kind| base.join(install_subpath(kind)))
    }

    /// The same program for every strategy.
    pub fn uniform(program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        Self::from_fn(|_| program.clone())
    }

    /// Looks each binary up on `PATH`. Missing tools keep their bare name so
    /// only the strategies that need them fail.
    pub fn from_search_path() -> Self {
        Self::from_fn(|kind| match which::which(kind.name()) {
            Ok(path) => path,
            Err(e) => {
                warn!("{} not found on PATH: {}", kind, e);
                PathBuf::from(kind.name())
            }
        })
    }

    pub fn resolve(config: &ToolsConfig) -> Self {
        let mut tools = match &config.base_dir {
            Some(base) => Self::from_base_dir(base),
            None => Self::from_search_path(),
        };
        for (kind, path) in &config.overrides {
            tools = tools.with(*kind, path.clone());
        }
        debug!("Resolved tool paths: {:?}", tools);
        tools
    }

    pub fn with(mut self, kind: StrategyKind, path: impl Into<PathBuf>) -> Self {
        *self.slot(kind) = path.into();
        self
    }

    pub fn get(&self, kind: StrategyKind) -> &Path {
        match kind {
            StrategyKind::Pngcrush => &self.pngcrush,
            StrategyKind::Optipng => &self.optipng,
            StrategyKind::Zopflipng => &self.zopflipng,
            StrategyKind::Pngout => &self.pngout,
            StrategyKind::Advpng => &self.advpng,
        }
    }

    fn slot(&mut self, kind: StrategyKind) -> &mut PathBuf {
        match kind {
            StrategyKind::Pngcrush => &mut self.pngcrush,
            StrategyKind::Optipng => &mut self.optipng,
            StrategyKind::Zopflipng => &mut self.zopflipng,
            StrategyKind::Pngout => &mut self.pngout,
            StrategyKind::Advpng => &mut self.advpng,
        }
    }

    fn from_fn(mut f: impl FnMut(StrategyKind) -> PathBuf) -> Self {
        Self {
            pngcrush: f(StrategyKind::Pngcrush),
            optipng: f(StrategyKind::Optipng),
            zopflipng: f(StrategyKind::Zopflipng),
            pngout: f(StrategyKind::Pngout),
            advpng: f(StrategyKind::Advpng),
        }
    }
}

fn install_subpath(kind: StrategyKind) -> PathBuf {
    match kind {
        StrategyKind::Optipng | StrategyKind::Advpng => {
            [kind.name(), "bin", kind.name()].iter().collect()
        }
        _ => [kind.name(), kind.name()].iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_base_dir_layout() {
        let tools = ToolPaths::from_base_dir("/srv/compressors");
        assert_eq!(
            tools.get(StrategyKind::Pngcrush),
            Path::new("/srv/compressors/pngcrush/pngcrush")
        );
        assert_eq!(
            tools.get(StrategyKind::Optipng),
            Path::new("/srv/compressors/optipng/bin/optipng")
        );
        assert_eq!(
            tools.get(StrategyKind::Advpng),
            Path::new("/srv/compressors/advpng/bin/advpng")
        );
    }

    #[test]
    fn test_overrides_win_over_base_dir() {
        let config = ToolsConfig {
            base_dir: Some(PathBuf::from("/srv/compressors")),
            overrides: HashMap::from([(
                StrategyKind::Pngout,
                PathBuf::from("/usr/local/bin/pngout-static"),
            )]),
        };
        let tools = ToolPaths::resolve(&config);
        assert_eq!(
            tools.get(StrategyKind::Pngout),
            Path::new("/usr/local/bin/pngout-static")
        );
        assert_eq!(
            tools.get(StrategyKind::Zopflipng),
            Path::new("/srv/compressors/zopflipng/zopflipng")
        );
    }
}
