use super::types::EngineConfig;
use super::ConfigError;
use std::path::Path;
use tokio::fs;

/// Read the engine configuration file.
///
/// Returns `Ok(None)` when the file does not exist; callers fall back to
/// [`EngineConfig::default`].
pub async fn read_config(config_path: &Path) -> Result<Option<EngineConfig>, ConfigError> {
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(config_path).await?;
    let config: EngineConfig = serde_json::from_str(&content)?;
    Ok(Some(config))
}

/// Write the engine configuration file.
pub async fn write_config(config_path: &Path, config: &EngineConfig) -> Result<(), ConfigError> {
    let content = serde_json::to_string_pretty(config)?;
    fs::write(config_path, content).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        assert!(read_config(&path).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");

        let config = EngineConfig {
            lock_timeout_minutes: 45,
        };
        write_config(&path, &config).await.unwrap();

        let loaded = read_config(&path).await.unwrap().unwrap();
        assert_eq!(loaded.lock_timeout_minutes, 45);
    }

    #[tokio::test]
    async fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        fs::write(&path, "not json").await.unwrap();

        assert!(read_config(&path).await.is_err());
    }
}
