use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::warn;
use seekpad_search::{SearchConfig, SearchMode};

const DEFAULT_CONTEXT_CHARS: usize = 24;
const MAX_CONTEXT_CHARS: usize = 200;

const DEFAULT_CONFIG: &str = "# Search settings\n\
# Treat queries as regular expressions instead of plain text\n\
regex = false\n\
# Match letter case exactly\n\
case_sensitive = true\n\
# Characters of surrounding text shown on each side of a match (max 200)\n\
# context_chars = 24\n\
# After a search, start at the first match after the caret instead of the top\n\
# start_at_caret = false\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub regex: bool,
    pub case_sensitive: bool,
    pub context_chars: usize,
    pub start_at_caret: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            regex: false,
            case_sensitive: true,
            context_chars: DEFAULT_CONTEXT_CHARS,
            start_at_caret: false,
        }
    }
}

impl AppConfig {
    pub fn load_or_create() -> Self {
        let Some(path) = ensure_config_file() else {
            return Self::default();
        };

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{:#}", e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Ok(Self::from_contents(&contents))
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            case_sensitive: self.case_sensitive,
            mode: if self.regex {
                SearchMode::Pattern
            } else {
                SearchMode::Literal
            },
        }
    }

    fn from_contents(contents: &str) -> Self {
        let mut config = Self::default();
        for (line_number, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut parts = line.splitn(2, '=');
            let key = parts.next().unwrap_or("").trim();
            let value = parts.next().unwrap_or("").trim();
            let line_number = line_number + 1;

            if key.eq_ignore_ascii_case("regex") || key.eq_ignore_ascii_case("use_regex") {
                match parse_bool(value) {
                    Some(regex) => config.regex = regex,
                    None => warn_invalid(line_number, key, value),
                }
            } else if key.eq_ignore_ascii_case("case_sensitive") {
                match parse_bool(value) {
                    Some(case_sensitive) => config.case_sensitive = case_sensitive,
                    None => warn_invalid(line_number, key, value),
                }
            } else if key.eq_ignore_ascii_case("context_chars") {
                match value.parse::<usize>() {
                    Ok(chars) => config.context_chars = chars.min(MAX_CONTEXT_CHARS),
                    Err(_) => warn_invalid(line_number, key, value),
                }
            } else if key.eq_ignore_ascii_case("start_at_caret") {
                match parse_bool(value) {
                    Some(start_at_caret) => config.start_at_caret = start_at_caret,
                    None => warn_invalid(line_number, key, value),
                }
            } else {
                warn!("Config line {}: unknown key `{}`", line_number, key);
            }
        }

        config
    }
}

fn warn_invalid(line_number: usize, key: &str, value: &str) {
    warn!(
        "Config line {}: invalid value `{}` for `{}`",
        line_number, value, key
    );
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn ensure_config_file() -> Option<PathBuf> {
    let path = config_path()?;
    if !path.exists() {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let _ = fs::write(&path, DEFAULT_CONFIG);
    }
    Some(path)
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("seekpad").join("config.txt"))
}
