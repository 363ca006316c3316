use std::path::PathBuf;

use crate::db::Database;
use crate::filter::DEFAULT_PAGE_SIZE;

pub const DEFAULT_API_URL: &str = "https://dummyjson.com";
pub const DEFAULT_FETCH_LIMIT: usize = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub fetch_limit: usize,
    pub page_size: usize,
    pub db_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            fetch_limit: DEFAULT_FETCH_LIMIT,
            page_size: DEFAULT_PAGE_SIZE,
            db_path: Database::default_path(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from `STAFFDECK_*` variables, falling back to defaults
    /// for anything missing or unparseable.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("STAFFDECK_API_URL").filter(|v| !v.trim().is_empty()) {
            config.api_url = url.trim().to_string();
        }
        if let Some(limit) = parse_count(&lookup, "STAFFDECK_FETCH_LIMIT") {
            config.fetch_limit = limit;
        }
        if let Some(size) = parse_count(&lookup, "STAFFDECK_PAGE_SIZE") {
            config.page_size = size;
        }
        if let Some(path) = lookup("STAFFDECK_DB").filter(|v| !v.is_empty()) {
            config.db_path = PathBuf::from(expand_home(&path));
        }

        config
    }

    pub fn with_overrides(
        mut self,
        api_url: Option<String>,
        fetch_limit: Option<usize>,
        page_size: Option<usize>,
    ) -> Self {
        if let Some(url) = api_url {
            self.api_url = url;
        }
        if let Some(limit) = fetch_limit.filter(|n| *n > 0) {
            self.fetch_limit = limit;
        }
        if let Some(size) = page_size.filter(|n| *n > 0) {
            self.page_size = size;
        }
        self
    }
}

fn parse_count<F>(lookup: &F, key: &str) -> Option<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            log::warn!("Ignoring invalid {}={:?}", key, raw);
            None
        }
    }
}

fn expand_home(path: &str) -> String {
    // Expand ~ in path
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_default();
        format!("{}/{}", home, rest)
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.fetch_limit, 30);
        assert_eq!(config.page_size, 9);
    }

    #[test]
    fn test_env_values_applied() {
        let config = Config::from_lookup(lookup_from(&[
            ("STAFFDECK_API_URL", "http://localhost:8080"),
            ("STAFFDECK_FETCH_LIMIT", "12"),
            ("STAFFDECK_PAGE_SIZE", "4"),
            ("STAFFDECK_DB", "/tmp/sd.db"),
        ]));
        assert_eq!(config.api_url, "http://localhost:8080");
        assert_eq!(config.fetch_limit, 12);
        assert_eq!(config.page_size, 4);
        assert_eq!(config.db_path, PathBuf::from("/tmp/sd.db"));
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("STAFFDECK_FETCH_LIMIT", "lots"),
            ("STAFFDECK_PAGE_SIZE", "0"),
        ]));
        assert_eq!(config.fetch_limit, DEFAULT_FETCH_LIMIT);
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_cli_overrides_win() {
        let config = Config::from_lookup(lookup_from(&[("STAFFDECK_PAGE_SIZE", "4")]))
            .with_overrides(Some("http://mock".into()), None, Some(6));
        assert_eq!(config.api_url, "http://mock");
        assert_eq!(config.fetch_limit, DEFAULT_FETCH_LIMIT);
        assert_eq!(config.page_size, 6);
    }
}
