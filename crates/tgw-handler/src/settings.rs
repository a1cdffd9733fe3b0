//! Configuration assembly for the handler.

use std::path::Path;

use tgw_core::{ConfigResult, ControllerConfig};

/// Load the optional config file and overlay explicit values on it.
pub fn load(path: Option<&Path>, overrides: ControllerConfig) -> ConfigResult<ControllerConfig> {
    let base = match path {
        Some(path) => ControllerConfig::from_file(path)?,
        None => ControllerConfig::default(),
    };
    Ok(base.merge(overrides))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn explicit_values_override_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[route_tables]
workload = "rtb-from-file"
inspection = "rtb-inspection"

[polling]
interval = "5s"
"#
        )
        .unwrap();

        let mut overrides = ControllerConfig::default();
        overrides.route_tables.workload = Some("rtb-from-env".to_string());
        overrides.polling.max_attempts = Some(10);

        let config = load(Some(file.path()), overrides).unwrap();
        let tables = config.route_tables().unwrap();
        assert_eq!(tables.workload, "rtb-from-env");
        assert_eq!(tables.inspection, "rtb-inspection");
        assert_eq!(config.poll_interval().unwrap(), Duration::from_secs(5));
        assert_eq!(config.polling.max_attempts, Some(10));
    }

    #[test]
    fn no_file_means_overrides_only() {
        let config = load(None, ControllerConfig::default()).unwrap();
        assert!(!config.has_route_tables());
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(Some(&dir.path().join("missing.toml")), ControllerConfig::default()).is_err());
    }
}
