// Configuration module
// Reads INI-style configuration files with environment variable overrides

use std::collections::HashMap;
use std::path::Path;

/// Configuration file parser
/// Supports INI-style files with environment variable override
#[derive(Debug, Clone, Default)]
pub struct Config {
    values: HashMap<String, String>,
    env_prefix: String,
}

impl Config {
    /// An empty configuration; lookups fall back to the environment, then defaults.
    /// env_prefix is used to check environment variables (e.g., "AIMesh_")
    pub fn new(env_prefix: &str) -> Self {
        Config {
            values: HashMap::new(),
            env_prefix: env_prefix.to_string(),
        }
    }

    /// Load configuration from a file
    pub fn load(path: &Path, env_prefix: &str) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::new(env_prefix);
        config.parse(&content);
        Ok(config)
    }

    /// Parse `key = value` lines into the configuration, replacing earlier values
    pub fn parse(&mut self, content: &str) {
        for line in content.lines() {
            let trimmed = line.trim();

            // Skip empty lines and comments
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            // Skip section headers [Section]
            if trimmed.starts_with('[') {
                continue;
            }

            if let Some((key, value)) = trimmed.split_once('=') {
                let value = value.trim();
                let value = value
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .unwrap_or(value);

                self.values.insert(key.trim().to_string(), value.to_string());
            }
        }
    }

    /// Get a string value with a default
    pub fn get_string_default(&self, key: &str, default: &str) -> String {
        self.get_env_or_config(key)
            .unwrap_or_else(|| default.to_string())
    }

    /// Get an integer value with a default
    pub fn get_int_default(&self, key: &str, default: i32) -> i32 {
        match self.get_env_or_config(key) {
            Some(val) => val.parse().unwrap_or(default),
            None => default,
        }
    }

    /// Get a float value with a default
    pub fn get_float_default(&self, key: &str, default: f32) -> f32 {
        match self.get_env_or_config(key) {
            Some(val) => val.parse().unwrap_or(default),
            None => default,
        }
    }

    /// Try environment variable first, then config file
    fn get_env_or_config(&self, key: &str) -> Option<String> {
        // Convert key to env var name: replace '.' with '_', add prefix
        if !self.env_prefix.is_empty() {
            let env_key = format!("{}{}", self.env_prefix, key.replace('.', "_"));
            if let Ok(val) = std::env::var(&env_key) {
                return Some(val);
            }
        }

        self.values.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new("");
        assert_eq!(config.get_int_default("nonexistent", 42), 42);
        assert_eq!(config.get_string_default("nonexistent", "hello"), "hello");
    }

    #[test]
    fn test_parse_ini() {
        let mut config = Config::new("");
        config.parse(
            "# grid settings\n\
             [Grid]\n\
             Grid.TextureSize = 512\n\
             ; comment\n\
             Grid.NoDataHeight=-1.5\n\
             Log.Dir = \"logs/aimesh\"\n\
             Rasterize.Threads = lots\n",
        );

        assert_eq!(config.get_int_default("Grid.TextureSize", 1024), 512);
        assert_eq!(config.get_float_default("Grid.NoDataHeight", 0.0), -1.5);
        assert_eq!(config.get_string_default("Log.Dir", ""), "logs/aimesh");
        // unparsable values fall back to the default
        assert_eq!(config.get_int_default("Rasterize.Threads", 1), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("aimesh-shared-config-does-not-exist.conf");
        assert!(Config::load(&path, "AIMesh_").is_err());
    }
}
