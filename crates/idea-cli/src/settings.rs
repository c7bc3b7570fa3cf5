use anyhow::bail;
use idea_core::config::{Config, DEFAULT_CONFIG_FILE};
use std::path::{Path, PathBuf};

/// Config file location: the explicit path if given, else `idea.yaml` in
/// the working directory.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Build the process-wide configuration once. An explicitly named file must
/// exist; the default file is optional.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<Config> {
    let path = config_path(explicit);
    if explicit.is_some() && !path.exists() {
        bail!("config file not found: {}", path.display());
    }
    let config = Config::load(&path)?;
    tracing::debug!(path = %path.display(), api_url = %config.github.api_url, "configuration loaded");
    Ok(config)
}
