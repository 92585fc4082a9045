use std::path::{Path, PathBuf};

/// Client home directory (`~/.insuredocs`)
pub fn insuredocs_dir() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
        .join(".insuredocs")
}

pub fn config_json_path() -> PathBuf {
    insuredocs_dir().join("config.json")
}

/// Default location of the persisted session entries
pub fn session_dir() -> PathBuf {
    insuredocs_dir().join("session")
}

/// Load a JSON config file
pub fn load_config_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    if !path.exists() {
        return Err(format!("Config file not found: {}", path.display()));
    }
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read config: {e}"))?;
    serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_dir_lives_under_home_dir() {
        assert!(session_dir().starts_with(insuredocs_dir()));
        assert!(config_json_path().ends_with(".insuredocs/config.json"));
    }

    #[test]
    fn load_config_json_reports_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_config_json::<serde_json::Value>(&dir.path().join("nope.json"))
            .expect_err("missing file");
        assert!(err.starts_with("Config file not found"));
    }
}
