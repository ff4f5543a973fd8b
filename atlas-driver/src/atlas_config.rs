// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use anyhow::Context;
use boolean_atlas::{OverflowPolicy, SubsetSize};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILENAME: &str = "atlas.toml";

/// Defaults read from the `[atlas]` table of an `atlas.toml` file. Command
/// line flags take precedence over every field here.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AtlasToolConfig {
    /// Subset size, 2 or 3.
    pub k: Option<usize>,

    /// Histogram counter width in bits.
    pub count_width: Option<u32>,

    /// Counter overflow behavior: "wrap" or "saturate".
    pub overflow: Option<OverflowPolicy>,

    /// Step budget for a single run before it is reported as hung.
    pub max_steps: Option<u64>,

    /// Seed for `sweep` stimulus.
    pub seed: Option<u64>,
}

#[derive(Deserialize)]
struct AtlasToml {
    atlas: AtlasToolConfig,
}

pub fn parse_config_text(text: &str) -> anyhow::Result<AtlasToolConfig> {
    let parsed: AtlasToml = toml::from_str(text).context("parse atlas config")?;
    Ok(parsed.atlas)
}

/// Loads the config named by `--config`, or `atlas.toml` in the current
/// directory when no flag is given and that file exists.
pub fn load_config(flag_path: Option<&str>) -> anyhow::Result<Option<AtlasToolConfig>> {
    let path: Option<PathBuf> = match flag_path {
        Some(p) => {
            let p = PathBuf::from(p);
            if !p.exists() {
                anyhow::bail!("config file does not exist: {}", p.display());
            }
            Some(p)
        }
        None => {
            let cwd_path = std::env::current_dir()?.join(DEFAULT_CONFIG_FILENAME);
            if cwd_path.exists() {
                log::info!(
                    "Using {} in current directory: {}",
                    DEFAULT_CONFIG_FILENAME,
                    cwd_path.display()
                );
                Some(cwd_path)
            } else {
                None
            }
        }
    };
    path.map(|p| read_config(&p)).transpose()
}

fn read_config(path: &Path) -> anyhow::Result<AtlasToolConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config file {}", path.display()))?;
    parse_config_text(&text).with_context(|| format!("in config file {}", path.display()))
}

/// Helper for picking the subset size from the flag, if given, or else the
/// config file, falling back to pairs.
pub fn get_k(flag: Option<usize>, config: &Option<AtlasToolConfig>) -> anyhow::Result<SubsetSize> {
    let k = flag
        .or_else(|| config.as_ref().and_then(|c| c.k))
        .unwrap_or(2);
    Ok(SubsetSize::try_from(k)?)
}

pub fn get_count_width(flag: Option<u32>, config: &Option<AtlasToolConfig>) -> Option<u32> {
    flag.or_else(|| config.as_ref().and_then(|c| c.count_width))
}

pub fn get_overflow(
    flag: Option<OverflowPolicy>,
    config: &Option<AtlasToolConfig>,
) -> OverflowPolicy {
    flag.or_else(|| config.as_ref().and_then(|c| c.overflow))
        .unwrap_or_default()
}

pub fn get_max_steps(flag: Option<u64>, config: &Option<AtlasToolConfig>) -> Option<u64> {
    flag.or_else(|| config.as_ref().and_then(|c| c.max_steps))
}

pub fn get_seed(flag: Option<u64>, config: &Option<AtlasToolConfig>) -> u64 {
    flag.or_else(|| config.as_ref().and_then(|c| c.seed))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_config_text() {
        let config = parse_config_text(
            r#"
[atlas]
k = 3
count_width = 20
overflow = "saturate"
"#,
        )
        .unwrap();
        assert_eq!(
            config,
            AtlasToolConfig {
                k: Some(3),
                count_width: Some(20),
                overflow: Some(OverflowPolicy::Saturate),
                max_steps: None,
                seed: None,
            }
        );
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(parse_config_text("[atlas]\nkk = 3\n").is_err());
    }

    #[test]
    fn test_flag_overrides_config() {
        let config = Some(AtlasToolConfig {
            k: Some(3),
            seed: Some(9),
            ..Default::default()
        });
        assert_eq!(get_k(None, &config).unwrap(), SubsetSize::Three);
        assert_eq!(get_k(Some(2), &config).unwrap(), SubsetSize::Two);
        assert_eq!(get_k(None, &None).unwrap(), SubsetSize::Two);
        assert!(get_k(Some(4), &None).is_err());
        assert_eq!(get_seed(None, &config), 9);
        assert_eq!(get_seed(Some(1), &config), 1);
        assert_eq!(get_overflow(None, &config), OverflowPolicy::Wrap);
    }
}
