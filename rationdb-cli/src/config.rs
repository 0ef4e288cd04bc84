use anyhow::Result;
use rationdb_core::StoreConfig;
use std::path::Path;

/// Load the store configuration and apply command-line overrides
pub fn load_config(path: &Path, verbose: bool, json_logs: bool) -> Result<StoreConfig> {
    let mut config = StoreConfig::load(path)?;

    if verbose {
        config.logging.level = "DEBUG".to_string();
    }
    if json_logs {
        config.logging.json_format = true;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rationdb.toml");
        std::fs::write(&path, "id_field = \"_id\"\n[logging]\nlevel = \"WARN\"\n").unwrap();

        let config = load_config(&path, false, false).unwrap();
        assert_eq!(config.id_field, "_id");
        assert_eq!(config.logging.level, "WARN");

        let config = load_config(&path, true, true).unwrap();
        assert_eq!(config.logging.level, "DEBUG");
        assert!(config.logging.json_format);
    }
}
