use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::warn;

pub const SETTINGS_FILE: &str = "certgen.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub download_dir: PathBuf,
    pub notice_ttl_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            download_dir: PathBuf::from("certificates"),
            notice_ttl_seconds: 5,
        }
    }
}

/// Keys accepted in the settings file; anything missing keeps its default.
#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    download_dir: Option<PathBuf>,
    notice_ttl_seconds: Option<TtlValue>,
}

/// `notice_ttl_seconds = 9` and `notice_ttl_seconds = "9"` both work.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TtlValue {
    Seconds(u64),
    Text(String),
}

impl TtlValue {
    fn seconds(&self) -> Option<u64> {
        match self {
            Self::Seconds(seconds) => Some(*seconds),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the flat settings file, then environment; later wins.
fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.server_url {
                    settings.server_url = v;
                }
                if let Some(v) = file_cfg.download_dir {
                    settings.download_dir = v;
                }
                match file_cfg.notice_ttl_seconds.as_ref().map(TtlValue::seconds) {
                    Some(Some(seconds)) => settings.notice_ttl_seconds = seconds,
                    Some(None) => {
                        warn!(path = %path.display(), "ignoring unparsable notice_ttl_seconds")
                    }
                    None => {}
                }
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "ignoring unreadable settings file")
            }
        }
    }

    if let Some(v) = env("CERTGEN_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = env("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = env("CERTGEN_DOWNLOAD_DIR") {
        settings.download_dir = PathBuf::from(v);
    }
    if let Some(v) = env("APP__DOWNLOAD_DIR") {
        settings.download_dir = PathBuf::from(v);
    }

    if let Some(v) = env("APP__NOTICE_TTL_SECONDS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.notice_ttl_seconds = parsed;
        }
    }

    settings
}

#[cfg(test)]
mod tests {
    use std::{
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn temp_settings_file(contents: &str) -> PathBuf {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = env::temp_dir().join(format!("certgen_settings_test_{suffix}.toml"));
        fs::write(&path, contents).expect("write settings");
        path
    }

    #[test]
    fn missing_file_keeps_defaults() {
        assert_eq!(
            load_settings_from(Path::new("/nonexistent/certgen.toml"), no_env),
            Settings::default()
        );
    }

    #[test]
    fn file_values_override_defaults() {
        let path = temp_settings_file(
            "server_url = \"http://certs.internal:8080\"\ndownload_dir = \"out\"\nnotice_ttl_seconds = \"9\"\n",
        );
        let settings = load_settings_from(&path, no_env);
        assert_eq!(settings.server_url, "http://certs.internal:8080");
        assert_eq!(settings.download_dir, PathBuf::from("out"));
        assert_eq!(settings.notice_ttl_seconds, 9);
        fs::remove_file(path).expect("cleanup");
    }

    #[test]
    fn native_toml_integers_are_accepted() {
        let path = temp_settings_file(
            "server_url = \"http://certs.internal:8080\"\nnotice_ttl_seconds = 9\n",
        );
        let settings = load_settings_from(&path, no_env);
        assert_eq!(settings.server_url, "http://certs.internal:8080");
        assert_eq!(settings.notice_ttl_seconds, 9);
        assert_eq!(settings.download_dir, PathBuf::from("certificates"));
        fs::remove_file(path).expect("cleanup");
    }

    #[test]
    fn bad_ttl_keeps_the_rest_of_the_file() {
        let path = temp_settings_file(
            "server_url = \"http://certs.internal:8080\"\nnotice_ttl_seconds = \"soon\"\n",
        );
        let settings = load_settings_from(&path, no_env);
        assert_eq!(settings.server_url, "http://certs.internal:8080");
        assert_eq!(settings.notice_ttl_seconds, 5);
        fs::remove_file(path).expect("cleanup");
    }

    #[test]
    fn app_prefixed_env_wins_over_file_and_short_names() {
        let path = temp_settings_file("server_url = \"http://from-file\"\n");
        let settings = load_settings_from(&path, |key| match key {
            "CERTGEN_SERVER_URL" => Some("http://from-short-env".to_string()),
            "APP__SERVER_URL" => Some("http://from-app-env".to_string()),
            "APP__NOTICE_TTL_SECONDS" => Some("not-a-number".to_string()),
            _ => None,
        });
        assert_eq!(settings.server_url, "http://from-app-env");
        assert_eq!(settings.notice_ttl_seconds, 5);
        fs::remove_file(path).expect("cleanup");
    }
}
