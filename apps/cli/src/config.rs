use std::{collections::HashMap, fs, path::PathBuf};

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_url: String,
    pub session_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8001".into(),
            session_file: None,
        }
    }
}

/// Defaults, overridden by `client.toml`, overridden by environment
/// variables. Command-line flags win over all of these in `main`.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("client.toml") {
        apply_file_overrides(&mut settings, &raw);
    }

    if let Ok(v) = std::env::var("INTERVIEW_SERVER_URL") {
        settings.server_url = v;
    }
    if let Ok(v) = std::env::var("INTERVIEW_SESSION_FILE") {
        settings.session_file = Some(PathBuf::from(v));
    }

    settings
}

fn apply_file_overrides(settings: &mut Settings, raw: &str) {
    if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) {
        if let Some(v) = file_cfg.get("server_url") {
            settings.server_url = v.clone();
        }
        if let Some(v) = file_cfg.get("session_file") {
            settings.session_file = Some(PathBuf::from(v));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_overrides_replace_defaults() {
        let mut settings = Settings::default();
        apply_file_overrides(
            &mut settings,
            "server_url = \"https://interviews.example.com\"\nsession_file = \"/tmp/s.json\"\n",
        );
        assert_eq!(settings.server_url, "https://interviews.example.com");
        assert_eq!(settings.session_file, Some(PathBuf::from("/tmp/s.json")));
    }

    #[test]
    fn malformed_file_leaves_defaults_in_place() {
        let mut settings = Settings::default();
        apply_file_overrides(&mut settings, "not valid toml ===");
        assert_eq!(settings.server_url, Settings::default().server_url);
    }
}
