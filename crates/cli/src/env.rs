use crate::error::CliError;
use connectors::adapter::Driver;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const DATABASE_URL: &str = "QUERYGATE_DATABASE_URL";
pub const DRIVER: &str = "QUERYGATE_DRIVER";

/// Environment variable manager that loads from system and .env files
#[derive(Debug, Clone)]
pub struct EnvManager {
    vars: HashMap<String, String>,
}

impl EnvManager {
    pub fn new() -> Self {
        EnvManager {
            vars: std::env::vars().collect(),
        }
    }

    /// Load variables from a .env file. Entries override the process
    /// environment.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), CliError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read env file {}: {}", path.display(), e))
        })?;

        self.parse_env_content(&content)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Picks the connection string and driver, preferring explicit flags.
    /// Without a driver flag or `QUERYGATE_DRIVER`, the driver is taken
    /// from the URL scheme.
    pub fn connection(
        &self,
        conn_str: Option<String>,
        driver: Option<String>,
    ) -> Result<(Driver, String), CliError> {
        let conn_str = conn_str
            .or_else(|| self.get(DATABASE_URL).map(str::to_string))
            .ok_or_else(|| {
                CliError::Config(format!("No connection string: pass --conn-str or set {DATABASE_URL}"))
            })?;

        let driver = match driver.or_else(|| self.get(DRIVER).map(str::to_string)) {
            Some(name) => name.parse::<Driver>()?,
            None => Driver::from_url(&conn_str).ok_or_else(|| {
                CliError::Config(format!(
                    "Cannot tell the driver from the connection string: pass --driver or set {DRIVER}"
                ))
            })?,
        };

        Ok((driver, conn_str))
    }

    fn parse_env_content(&mut self, content: &str) -> Result<(), CliError> {
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid env file: malformed line {} (expected KEY=VALUE)",
                    line_num + 1
                )));
            };

            let key = key.trim().trim_start_matches("export ").trim();
            if key.is_empty() {
                return Err(CliError::Config(format!(
                    "Invalid env file: empty key at line {}",
                    line_num + 1
                )));
            }

            self.vars.insert(key.to_string(), Self::unquote_value(value));
        }

        Ok(())
    }

    fn unquote_value(value: &str) -> String {
        let value = value.trim();

        for quote in ['"', '\''] {
            if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
                return value[1..value.len() - 1].to_string();
            }
        }

        value.to_string()
    }
}

impl Default for EnvManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty() -> EnvManager {
        EnvManager {
            vars: HashMap::new(),
        }
    }

    #[test]
    fn test_parse_basic_env() {
        let mut env = empty();
        let content = r#"
# Comment
KEY1=value1
export KEY2=value2
        "#;

        env.parse_env_content(content).unwrap();
        assert_eq!(env.get("KEY1"), Some("value1"));
        assert_eq!(env.get("KEY2"), Some("value2"));
    }

    #[test]
    fn test_parse_quoted_values() {
        let mut env = empty();
        let content = r#"
QUOTED="value with spaces"
SINGLE='single quoted'
URL=postgres://u:p@host/db?sslmode=prefer
        "#;

        env.parse_env_content(content).unwrap();
        assert_eq!(env.get("QUOTED"), Some("value with spaces"));
        assert_eq!(env.get("SINGLE"), Some("single quoted"));
        assert_eq!(env.get("URL"), Some("postgres://u:p@host/db?sslmode=prefer"));
    }

    #[test]
    fn test_invalid_env_format() {
        let mut env = empty();
        assert!(env.parse_env_content("INVALID LINE WITHOUT EQUALS").is_err());
        assert!(env.parse_env_content("=value").is_err());
    }

    #[test]
    fn test_flags_win_over_env() {
        let mut env = empty();
        env.parse_env_content("QUERYGATE_DATABASE_URL=mysql://root@localhost/db")
            .unwrap();

        let (driver, url) = env
            .connection(Some("postgres://u@localhost/db".into()), None)
            .unwrap();
        assert_eq!(driver, Driver::Postgres);
        assert_eq!(url, "postgres://u@localhost/db");
    }

    #[test]
    fn test_connection_from_env() {
        let mut env = empty();
        env.parse_env_content(
            "QUERYGATE_DATABASE_URL=mysql://root@localhost/db\nQUERYGATE_DRIVER=mariadb",
        )
        .unwrap();

        let (driver, url) = env.connection(None, None).unwrap();
        assert_eq!(driver, Driver::MySql);
        assert_eq!(url, "mysql://root@localhost/db");
    }

    #[test]
    fn test_missing_connection() {
        assert!(matches!(
            empty().connection(None, None),
            Err(CliError::Config(_))
        ));
        assert!(matches!(
            empty().connection(Some("localhost:5432".into()), None),
            Err(CliError::Config(_))
        ));
        assert!(matches!(
            empty().connection(Some("localhost:5432".into()), Some("sqlite".into())),
            Err(CliError::Adapter(_))
        ));
    }
}
