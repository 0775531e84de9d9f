//! INI file configuration adapter.
//!
//! Keys are case-insensitive; values are trimmed and an empty value reads
//! as absent, so `api_key =` behaves like a missing key.

use crate::domain::error::TraderError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    ini: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TraderError> {
        let path = path.as_ref();
        let mut ini = Ini::new();
        ini.load(path).map_err(|reason| TraderError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { ini })
    }

    pub fn from_string(content: &str) -> Result<Self, TraderError> {
        let mut ini = Ini::new();
        ini.read(content.to_string())
            .map_err(|reason| TraderError::ConfigParse {
                file: "<inline>".to_string(),
                reason,
            })?;
        Ok(Self { ini })
    }

    fn value(&self, section: &str, key: &str) -> Option<String> {
        self.ini
            .get(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.value(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.value(section, key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.value(section, key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[trader]
symbols = 2330,2317
short_window = 15

[notify]
webhook_url = https://discord.com/api/webhooks/1/abc
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("trader", "symbols"),
            Some("2330,2317".to_string())
        );
        assert_eq!(
            adapter.get_string("notify", "webhook_url"),
            Some("https://discord.com/api/webhooks/1/abc".to_string())
        );
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[trader]\nsymbols = 2330\n").unwrap();
        assert_eq!(adapter.get_string("trader", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_returns_value() {
        let adapter = FileConfigAdapter::from_string("[sizing]\nlot_size = 1000\n").unwrap();
        assert_eq!(adapter.get_int("sizing", "lot_size", 0), 1000);
    }

    #[test]
    fn get_int_returns_default_for_missing() {
        let adapter = FileConfigAdapter::from_string("[sizing]\n").unwrap();
        assert_eq!(adapter.get_int("sizing", "missing", 42), 42);
    }

    #[test]
    fn get_int_returns_default_for_non_numeric() {
        let adapter = FileConfigAdapter::from_string("[sizing]\nlot_size = abc\n").unwrap();
        assert_eq!(adapter.get_int("sizing", "lot_size", 42), 42);
    }

    #[test]
    fn get_double_returns_value() {
        let adapter = FileConfigAdapter::from_string("[broker]\ncash = 100000.5\n").unwrap();
        assert_eq!(adapter.get_double("broker", "cash", 0.0), 100000.5);
    }

    #[test]
    fn get_double_returns_default_for_non_numeric() {
        let adapter = FileConfigAdapter::from_string("[broker]\ncash = lots\n").unwrap();
        assert_eq!(adapter.get_double("broker", "cash", 99.9), 99.9);
    }


    #[test]
    fn from_file_reads_config() {
        let content = "[history]\ndata_dir = /var/lib/crosstrader\n";
        let file = create_temp_config(content);
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("history", "data_dir"),
            Some("/var/lib/crosstrader".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(matches!(result, Err(TraderError::ConfigParse { file, .. }) if file.contains("config.ini")));
    }

    #[test]
    fn empty_value_reads_as_missing() {
        let adapter = FileConfigAdapter::from_string("[history]\napi_key =\n").unwrap();
        assert_eq!(adapter.get_string("history", "api_key"), None);
    }

    #[test]
    fn keys_are_case_insensitive() {
        let adapter = FileConfigAdapter::from_string("[Trader]\nSymbols = 2330\n").unwrap();
        assert_eq!(adapter.get_string("trader", "symbols"), Some("2330".to_string()));
    }
}
