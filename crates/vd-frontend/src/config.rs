//! Viewer configuration loading

use std::path::Path;

use vd_core::{VoodooConfig, VoodooError};

/// Environment variable naming a RON session config
pub const CONFIG_ENV: &str = "VD_CONFIG";

/// Load the session config named by `VD_CONFIG`, or the defaults when unset
pub fn load_config() -> Result<VoodooConfig, VoodooError> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => load_from(Path::new(&path)),
        None => Ok(VoodooConfig::default()),
    }
}

/// Load and validate `path`. Failures are logged and returned.
pub fn load_from(path: &Path) -> Result<VoodooConfig, VoodooError> {
    VoodooConfig::load(path)
        .inspect_err(|e| tracing::error!("Failed to load config {:?}: {}", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_an_error() {
        let result = load_from(Path::new("/nonexistent/voodoo.ron"));
        assert!(matches!(result, Err(VoodooError::Io(_))));
    }

    #[test]
    fn test_invalid_values_are_an_error() {
        let path = std::env::temp_dir().join(format!("vd-config-{}.ron", std::process::id()));
        std::fs::write(&path, "(basket: (spread: -1.0))").unwrap();
        let result = load_from(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(VoodooError::InvalidConfig(_))));
    }

    #[test]
    fn test_valid_file_loads() {
        let path = std::env::temp_dir().join(format!("vd-config-ok-{}.ron", std::process::id()));
        std::fs::write(&path, "(interaction: (depth_limit: 2.0))").unwrap();
        let result = load_from(&path);
        std::fs::remove_file(&path).unwrap();
        let config = result.unwrap();
        assert!((config.interaction.depth_limit - 2.0).abs() < 1e-6);
    }
}
