use std::env;
use std::io;

pub const DEFAULT_DATABASE_PATH: &str = "order_management.db";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SQLite file, or `:memory:` for a throwaway database.
    pub database_path: String,
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Reads `DATABASE_PATH`, `SERVICE_HOST` and `SERVICE_PORT`, after loading `.env` if present.
    pub fn from_env() -> io::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_vars(
            env::var("DATABASE_PATH").ok(),
            env::var("SERVICE_HOST").ok(),
            env::var("SERVICE_PORT").ok(),
        )
    }

    fn from_vars(
        database_path: Option<String>,
        host: Option<String>,
        port: Option<String>,
    ) -> io::Result<Self> {
        let port = match port {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("SERVICE_PORT must be a port number, got {:?}: {}", raw, e),
                )
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Config {
            database_path: database_path.unwrap_or_else(|| DEFAULT_DATABASE_PATH.into()),
            host: host.unwrap_or_else(|| DEFAULT_HOST.into()),
            port,
        })
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_vars(None, None, None).unwrap();
        assert_eq!(config.database_path, DEFAULT_DATABASE_PATH);
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_vars(
            Some(":memory:".into()),
            Some("0.0.0.0".into()),
            Some("3003".into()),
        )
        .unwrap();
        assert_eq!(config.database_path, ":memory:");
        assert_eq!(config.bind_address(), ("0.0.0.0".to_string(), 3003));
    }

    #[test]
    fn rejects_bad_port() {
        assert!(Config::from_vars(None, None, Some("eighty".into())).is_err());
    }
}
