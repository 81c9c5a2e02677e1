use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::parse::ParseOptions;

pub const CONFIG_FILE: &str = "vireo.toml";

/// Project settings read from `vireo.toml`. Every key is optional; anything
/// left out keeps the parser's default.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct VireoConfig {
    #[serde(default)]
    pub parser: ParserConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ParserConfig {
    pub max_depth: Option<usize>,
}

impl VireoConfig {
    /// Loads `vireo.toml` from `dir`, or the default config if there is none.
    pub fn load(dir: &Path) -> Result<VireoConfig> {
        let p = dir.join(CONFIG_FILE);
        if !p.exists() {
            log::debug!("no {} in {}", CONFIG_FILE, dir.display());
            return Ok(VireoConfig::default());
        }
        VireoConfig::read_from(&p)
    }

    pub fn read_from(path: &Path) -> Result<VireoConfig> {
        let text =
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        VireoConfig::parse(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<VireoConfig> {
        let cfg: VireoConfig = toml::from_str(text)?;
        if cfg.parser.max_depth == Some(0) {
            anyhow::bail!("parser.max_depth must be at least 1");
        }
        Ok(cfg)
    }

    pub fn apply(&self, options: &mut ParseOptions) {
        if let Some(max_depth) = self.parser.max_depth {
            options.max_depth = max_depth;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::VireoConfig;
    use crate::parse::{ParseOptions, DEFAULT_MAX_DEPTH};

    #[test]
    fn empty_config_keeps_defaults() {
        let cfg = VireoConfig::parse("").expect("empty config parses");
        let mut options = ParseOptions::default();
        cfg.apply(&mut options);
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn parser_section_sets_depth() {
        let cfg = VireoConfig::parse("[parser]\nmax_depth = 32\n").expect("config parses");
        let mut options = ParseOptions::default();
        cfg.apply(&mut options);
        assert_eq!(options.max_depth, 32);
    }

    #[test]
    fn rejects_zero_depth_and_bad_types() {
        assert!(VireoConfig::parse("[parser]\nmax_depth = 0\n").is_err());
        assert!(VireoConfig::parse("[parser]\nmax_depth = \"deep\"\n").is_err());
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = std::env::temp_dir().join("vireo-config-test-missing");
        let cfg = VireoConfig::load(&dir).expect("missing config is fine");
        assert_eq!(cfg, VireoConfig::default());
    }
}
