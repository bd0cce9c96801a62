use std::path::Path;

use log::LevelFilter;

pub struct Config {
    pub prompt: String,
    // Longest line we plan for; caps argv at half of it.
    pub max_line_len: usize,
    pub max_stages: usize,
    /// Echo the expanded line when `!!` is used.
    pub echo_history: bool,
    /// Collect finished background children instead of leaving zombies.
    pub reap_background: bool,
    pub log_level: LevelFilter,
}

/// Upper bounds applied by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_args: usize,
    pub max_stages: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Config::default().limits()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: "osh> ".to_string(),
            max_line_len: 1024,
            max_stages: 32,
            echo_history: true,
            reap_background: true,
            log_level: LevelFilter::Warn,
        }
    }
}

impl Config {
    /// Load config from YAML-style `key: value` file, then apply env overrides.
    pub fn load_from(path: &Path) -> Self {
        let mut cfg = Self::default();
        if let Ok(content) = std::fs::read_to_string(path) {
            for line in content.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once(':') {
                    cfg.apply(key.trim(), value.trim());
                }
            }
        }
        cfg.apply_env_overrides();
        cfg
    }

    /// Load config from env overrides only (no YAML file).
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.apply_env_overrides();
        cfg
    }

    /// Load from default config path (~/.config/osh/config.yaml) + env.
    pub fn load() -> Self {
        let config_path = expand_tilde("~/.config/osh/config.yaml");
        let path = Path::new(&config_path);
        if path.exists() {
            Self::load_from(path)
        } else {
            Self::from_env()
        }
    }

    pub fn limits(&self) -> Limits {
        Limits {
            max_args: (self.max_line_len / 2).max(1),
            max_stages: self.max_stages.max(1),
        }
    }

    fn apply(&mut self, key: &str, value: &str) {
        match key {
            "prompt" => self.prompt = unquote(value).to_string(),
            "max_line_len" => {
                if let Ok(n) = value.parse() {
                    self.max_line_len = n;
                }
            }
            "max_stages" => {
                if let Ok(n) = value.parse() {
                    self.max_stages = n;
                }
            }
            "echo_history" => self.echo_history = parse_bool(value),
            "reap_background" => self.reap_background = parse_bool(value),
            "log_level" => {
                if let Ok(level) = value.parse() {
                    self.log_level = level;
                }
            }
            _ => {} // Ignore unknown keys
        }
    }

    fn apply_env_overrides(&mut self) {
        for (var, key) in [
            ("OSH_PROMPT", "prompt"),
            ("OSH_MAX_LINE", "max_line_len"),
            ("OSH_MAX_STAGES", "max_stages"),
            ("OSH_ECHO_HISTORY", "echo_history"),
            ("OSH_REAP_BACKGROUND", "reap_background"),
            ("OSH_LOG", "log_level"),
        ] {
            if let Ok(v) = std::env::var(var) {
                self.apply(key, &v);
            }
        }
    }
}

fn parse_bool(value: &str) -> bool {
    !["0", "false", "no", "off"].contains(&value.to_lowercase().as_str())
}

/// Strip one pair of surrounding quotes so `prompt: "$ "` keeps its space.
fn unquote(value: &str) -> &str {
    for q in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(q) && value.ends_with(q) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Expand ~ to home directory. Simple replacement, no shellexpand dep needed.
fn expand_tilde(path: &str) -> String {
    if path.starts_with("~/") || path == "~" {
        if let Ok(home) = std::env::var("HOME") {
            return path.replacen('~', &home, 1);
        }
    }
    path.to_string()
}
