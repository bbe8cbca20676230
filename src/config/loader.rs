//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{DatabaseConfig, TableShuttleConfig};
use super::secret_string;
use crate::domain::errors::ShuttleError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Prefix of environment variables that override file values
pub const ENV_PREFIX: &str = "TABLESHUTTLE";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into TableShuttleConfig
/// 4. Applies environment variable overrides (TABLESHUTTLE_* prefix)
/// 5. Validates the direction-independent settings
///
/// Direction-specific requirements (`[source]` for export, `[target]` for
/// import) are checked by [`TableShuttleConfig::validate_for`].
///
/// # Errors
///
/// Returns a configuration error if the file is missing or unreadable, a
/// referenced environment variable is unset, a required key is absent, or a
/// value is invalid.
///
/// # Examples
///
/// ```no_run
/// use tableshuttle::config::loader::load_config;
///
/// let config = load_config("tableshuttle.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<TableShuttleConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ShuttleError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ShuttleError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: TableShuttleConfig = toml::from_str(&contents)
        .map_err(|e| ShuttleError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        ShuttleError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    tracing::debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| ShuttleError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(ShuttleError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn env_override(section: &str, key: &str) -> Option<String> {
    std::env::var(format!(
        "{ENV_PREFIX}_{}_{}",
        section.to_uppercase(),
        key.to_uppercase()
    ))
    .ok()
}

/// Applies environment variable overrides
///
/// Variables follow the pattern TABLESHUTTLE_<SECTION>_<KEY>, for example
/// TABLESHUTTLE_SOURCE_PASSWORD or TABLESHUTTLE_PIPELINE_WORK_DIR. Database
/// overrides only apply to sections present in the file.
fn apply_env_overrides(config: &mut TableShuttleConfig) {
    if let Some(val) = env_override("application", "log_level") {
        config.application.log_level = val;
    }

    for (section, db) in [
        ("source", config.source.as_mut()),
        ("target", config.target.as_mut()),
    ] {
        if let Some(db) = db {
            apply_database_overrides(section, db);
        }
    }

    if let Some(val) = env_override("storage", "account_name") {
        config.storage.account_name = val;
    }
    if let Some(val) = env_override("storage", "auth_mode") {
        config.storage.auth_mode = val;
    }

    if let Some(val) = env_override("identity", "login_if_missing") {
        config.identity.login_if_missing = val.parse().unwrap_or(true);
    }
    if let Some(val) = env_override("identity", "login_timeout_seconds") {
        if let Ok(secs) = val.parse() {
            config.identity.login_timeout_seconds = secs;
        }
    }

    if let Some(val) = env_override("tools", "az") {
        config.tools.az = val;
    }
    if let Some(val) = env_override("tools", "bcp") {
        config.tools.bcp = val;
    }
    if let Some(val) = env_override("tools", "sqlcmd") {
        config.tools.sqlcmd = val;
    }

    if let Some(val) = env_override("pipeline", "work_dir") {
        config.pipeline.work_dir = val.into();
    }
    if let Some(val) = env_override("pipeline", "retain_on_failure") {
        config.pipeline.retain_on_failure = val.parse().unwrap_or(true);
    }
}

fn apply_database_overrides(section: &str, db: &mut DatabaseConfig) {
    if let Some(val) = env_override(section, "host") {
        db.host = val;
    }
    if let Some(val) = env_override(section, "port") {
        db.port = val.parse().ok();
    }
    if let Some(val) = env_override(section, "database") {
        db.database = val;
    }
    if let Some(val) = env_override(section, "username") {
        db.username = val;
    }
    if let Some(val) = env_override(section, "password") {
        db.password = secret_string(val);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("TS_LOADER_TEST_VAR", "test_value");
        let input = "password = \"${TS_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "password = \"test_value\"");
        std::env::remove_var("TS_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("TS_LOADER_MISSING_VAR");
        let input = "password = \"${TS_LOADER_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("TS_LOADER_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        let input = "# password = \"${TS_LOADER_NEVER_SET}\"\nkey = 1";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, input);
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(matches!(result, Err(ShuttleError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[source]
host = "sql.example.com"
database = "sales"
username = "exporter"
password = "pw"

[storage]
account_name = "acct"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.storage.account_name, "acct");
        assert_eq!(config.source.as_ref().unwrap().database, "sales");
        assert!(config.target.is_none());
        assert!(config.pipeline.retain_on_failure);
    }

    #[test]
    fn test_load_config_missing_required_key() {
        let toml_content = r#"
[source]
host = "sql.example.com"
database = "sales"
username = "exporter"

[storage]
account_name = "acct"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let err = load_config(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("password"));
    }
}
