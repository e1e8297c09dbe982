use anf_sample::config::{load_config, Config};
use anf_sample::error::AnfError;
use std::io::Write;
use tempfile::NamedTempFile;

fn config_file(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[cfg(test)]
mod config_file_tests {
    use super::*;

    #[test]
    fn test_toml_file_overrides_defaults() {
        let file = config_file(
            ".toml",
            r#"
location = "eastus"
account_name = "acct-from-file"
service_level = "Premium"
poll_max_attempts = 10
"#,
        );

        let config = tokio_test::block_on(load_config(Some(file.path()))).unwrap();

        assert_eq!(config.account_name, "acct-from-file");
        assert_eq!(config.service_level, "Premium");
        assert_eq!(config.poll_max_attempts, 10);
        // Unset fields keep their defaults
        assert_eq!(config.pool_name, "Pool01");
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_json_file_is_accepted() {
        let file = config_file(
            ".json",
            r#"{ "pool_name": "PoolJson", "should_cleanup": true }"#,
        );

        let config = load_config(Some(file.path())).await.unwrap();
        assert_eq!(config.pool_name, "PoolJson");
        assert!(config.should_cleanup);
    }

    #[tokio::test]
    async fn test_unparseable_file_is_config_error() {
        let file = config_file(".toml", "location = [unterminated");
        let result = load_config(Some(file.path())).await;
        assert!(matches!(result, Err(AnfError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_missing_explicit_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(Some(&dir.path().join("absent.toml"))).await;
        assert!(matches!(result, Err(AnfError::ConfigError(_))));
    }

    #[test]
    fn test_config_path_location() {
        let path = Config::get_config_path().unwrap();
        assert!(path.ends_with("anf-sample/anf-sample.toml"));
    }
}
