//! Session configuration
//!
//! Spawn parameters are resolved once at startup and threaded through the
//! session; nothing here is global or mutated after construction.

use std::env;
use std::path::PathBuf;

pub const DEFAULT_COLS: u16 = 120;
pub const DEFAULT_ROWS: u16 = 40;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub shell: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    /// The child's complete environment; the session does not inherit ours.
    pub env: Vec<(String, String)>,
    pub cols: u16,
    pub rows: u16,
}

impl SessionConfig {
    /// Resolve defaults from the host environment: the user's shell run as
    /// a login shell in their home directory, with an xterm-256color
    /// environment.
    pub fn host_defaults() -> Self {
        let shell = env::var("SHELL").unwrap_or_else(|_| "/bin/bash".to_string());
        let home = env::var("HOME").unwrap_or_else(|_| "/".to_string());
        let user = env::var("USER").unwrap_or_else(|_| "user".to_string());
        let path = env::var("PATH").unwrap_or_else(|_| "/usr/bin:/bin".to_string());
        let lang = env::var("LANG").unwrap_or_else(|_| "en_US.UTF-8".to_string());

        let env = vec![
            ("TERM".to_string(), "xterm-256color".to_string()),
            ("COLORTERM".to_string(), "truecolor".to_string()),
            ("HOME".to_string(), home.clone()),
            ("USER".to_string(), user),
            ("SHELL".to_string(), shell.clone()),
            ("PATH".to_string(), path),
            ("LANG".to_string(), lang.clone()),
            ("LC_ALL".to_string(), lang),
            ("COLUMNS".to_string(), DEFAULT_COLS.to_string()),
            ("LINES".to_string(), DEFAULT_ROWS.to_string()),
        ];

        Self {
            shell: PathBuf::from(shell),
            args: vec!["-l".to_string()],
            working_dir: PathBuf::from(home),
            env,
            cols: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
        }
    }

    pub fn shell(mut self, shell: impl Into<PathBuf>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// Add or override an environment variable for the child.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.env.retain(|(k, _)| *k != key);
        self.env.push((key, value.into()));
        self
    }

    /// Set the initial size, keeping the COLUMNS/LINES hints in step.
    pub fn dimensions(mut self, cols: u16, rows: u16) -> Self {
        self.cols = cols;
        self.rows = rows;
        self.env("COLUMNS", cols.to_string())
            .env("LINES", rows.to_string())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::host_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_defaults_set_terminal_environment() {
        let config = SessionConfig::host_defaults();
        assert!(config
            .env
            .iter()
            .any(|(k, v)| k == "TERM" && v == "xterm-256color"));
        assert_eq!(config.cols, DEFAULT_COLS);
        assert_eq!(config.rows, DEFAULT_ROWS);
    }

    #[test]
    fn dimensions_refresh_the_size_hints() {
        let config = SessionConfig::host_defaults().dimensions(80, 24);
        assert_eq!(config.cols, 80);
        assert_eq!(config.rows, 24);
        assert!(config.env.iter().any(|(k, v)| k == "COLUMNS" && v == "80"));
        assert!(config.env.iter().any(|(k, v)| k == "LINES" && v == "24"));
        let columns: Vec<_> = config.env.iter().filter(|(k, _)| k == "COLUMNS").collect();
        assert_eq!(columns.len(), 1);
    }

    #[test]
    fn env_override_replaces_existing_key() {
        let config = SessionConfig::host_defaults().env("TERM", "dumb");
        let terms: Vec<_> = config.env.iter().filter(|(k, _)| k == "TERM").collect();
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].1, "dumb");
    }
}
