#[cfg(test)]
mod tests {
    use crate::config::{self, AppConfig};
    use uuid::Uuid;

    #[test]
    fn test_valid_config_does_not_error() {
        let result = config::load();
        assert!(result.is_ok());
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.url, "sqlite://data/lagerwald.db");
        assert_eq!(config.pagination.default_limit, 100);
        assert_eq!(config.pagination.max_limit, 500);
        assert_eq!(config.clone.name_suffix, " (Cloned)");
    }

    #[test]
    fn test_invalid_server_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        let result = config::validate(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("invalid server.port"));
    }

    #[test]
    fn test_invalid_pagination() {
        let mut config = AppConfig::default();
        config.pagination.default_limit = 0;
        assert!(config::validate(&config).is_err());

        let mut config = AppConfig::default();
        config.pagination.max_limit = config.pagination.default_limit - 1;
        assert!(config::validate(&config).is_err());
    }

    #[test]
    fn test_empty_clone_suffix_rejected() {
        let mut config = AppConfig::default();
        config.clone.name_suffix = String::new();
        assert!(config::validate(&config).is_err());
    }

    #[test]
    fn test_ensure_sqlite_parent_dir() {
        let base = std::env::temp_dir().join(format!("lagerwald_test_cfg_{}", Uuid::new_v4()));
        let db_path = base.join("nested").join("test.db");
        let url = format!("sqlite://{}", db_path.to_string_lossy());

        // Cleanup just in case
        let _ = std::fs::remove_dir_all(&base);
        assert!(!db_path.parent().unwrap().exists());

        config::ensure_sqlite_parent_dir(&url).unwrap();
        assert!(db_path.parent().unwrap().exists());

        let _ = std::fs::remove_dir_all(&base);
    }

    #[test]
    fn test_non_sqlite_url_is_left_alone() {
        // No sqlite:// prefix, nothing to create
        config::ensure_sqlite_parent_dir("postgres://localhost/db").unwrap();
    }
}
