use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::shortcut::Platform;

/// Which modifier names shortcut badges use.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelMode {
    Auto,
    Mac,
    Pc,
}

impl LabelMode {
    pub const fn platform(self) -> Platform {
        match self {
            Self::Auto => Platform::current(),
            Self::Mac => Platform::Mac,
            Self::Pc => Platform::Other,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Mac => "mac",
            Self::Pc => "pc",
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub no_history: bool,
    pub history_file: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub labels: Option<LabelMode>,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            no_history: self.no_history || other.no_history,
            history_file: other
                .history_file
                .clone()
                .or_else(|| self.history_file.clone()),
            log_file: other.log_file.clone().or_else(|| self.log_file.clone()),
            labels: other.labels.or(self.labels),
        }
    }

    /// Platform used for shortcut labels.
    pub fn label_platform(&self) -> Platform {
        self.labels.unwrap_or(LabelMode::Auto).platform()
    }
}

fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return Some(PathBuf::from(appdata).join("chemkey"));
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return Some(
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join("chemkey"),
            );
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg).join("chemkey"));
        }
        if let Some(home) = std::env::var_os("HOME") {
            return Some(PathBuf::from(home).join(".config").join("chemkey"));
        }
    }

    None
}

pub fn global_config_path() -> PathBuf {
    config_dir().map_or_else(local_override_path, |dir| dir.join("config"))
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".chemkeyrc")
}

/// Directory holding the history record when `--history-file` is not given.
pub fn default_history_dir() -> PathBuf {
    config_dir().unwrap_or_else(|| PathBuf::from("."))
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# chemkey defaults (saved with --save)".to_string()];
    if flags.no_history {
        lines.push("--no-history".to_string());
    }
    if let Some(history) = &flags.history_file {
        lines.push(format!("--history-file {}", history.display()));
    }
    if let Some(log) = &flags.log_file {
        lines.push(format!("--log-file {}", log.display()));
    }
    if let Some(labels) = flags.labels {
        lines.push(format!("--labels {}", labels.as_str()));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick the flags this crate knows out of a token list, ignoring the rest.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if token == "--no-history" {
            flags.no_history = true;
        } else if token == "--history-file" {
            if let Some(next) = tokens.get(i + 1) {
                flags.history_file = Some(PathBuf::from(next));
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--history-file=") {
            flags.history_file = Some(PathBuf::from(value));
        } else if token == "--log-file" {
            if let Some(next) = tokens.get(i + 1) {
                flags.log_file = Some(PathBuf::from(next));
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--log-file=") {
            flags.log_file = Some(PathBuf::from(value));
        } else if token == "--labels" {
            if let Some(next) = tokens.get(i + 1) {
                flags.labels = parse_labels(next);
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--labels=") {
            flags.labels = parse_labels(value);
        }
        i += 1;
    }
    flags
}

fn parse_labels(s: &str) -> Option<LabelMode> {
    match s {
        "auto" => Some(LabelMode::Auto),
        "mac" => Some(LabelMode::Mac),
        "pc" => Some(LabelMode::Pc),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let args = vec![
            "chemkey".to_string(),
            "--no-history".to_string(),
            "--history-file".to_string(),
            "hist.json".to_string(),
            "--labels=mac".to_string(),
            "--log-file".to_string(),
            "chemkey.log".to_string(),
            "answer.md".to_string(),
        ];
        let flags = parse_flag_tokens(&args);
        assert!(flags.no_history);
        assert_eq!(flags.history_file, Some(PathBuf::from("hist.json")));
        assert_eq!(flags.log_file, Some(PathBuf::from("chemkey.log")));
        assert_eq!(flags.labels, Some(LabelMode::Mac));
    }

    #[test]
    fn test_unknown_label_mode_is_ignored() {
        let flags = parse_flag_tokens(&["--labels".to_string(), "amiga".to_string()]);
        assert_eq!(flags.labels, None);
        assert_eq!(flags.label_platform(), Platform::current());
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            no_history: true,
            labels: Some(LabelMode::Pc),
            history_file: Some(PathBuf::from("a.json")),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            labels: Some(LabelMode::Mac),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.no_history);
        assert_eq!(merged.labels, Some(LabelMode::Mac));
        assert_eq!(merged.history_file, Some(PathBuf::from("a.json")));
        assert_eq!(merged.label_platform(), Platform::Mac);
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".chemkeyrc");
        let flags = ConfigFlags {
            no_history: true,
            history_file: Some(PathBuf::from("hist.json")),
            log_file: Some(PathBuf::from("chemkey.log")),
            labels: Some(LabelMode::Pc),
        };

        save_config_flags(&path, &flags).unwrap();
        assert_eq!(load_config_flags(&path).unwrap(), flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
        assert_eq!(load_config_flags(&path).unwrap(), ConfigFlags::default());
    }
}
