use anyhow::{bail, Context, Result};
use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }

    pub fn is_prod(&self) -> bool {
        matches!(self, Self::Prod)
    }
}

/// Which key-value backend holds the records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Postgres,
}

impl StoreBackend {
    fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "mem" => Ok(Self::Memory),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            other => bail!("Unknown STORE_BACKEND '{}'", other),
        }
    }
}

/// Log line rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(s: &str, env: &Environment) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "pretty" | "text" => Self::Pretty,
            _ if env.is_prod() => Self::Json,
            _ => Self::Pretty,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    pub server_addr: String,
    pub log_format: LogFormat,

    // Store
    pub store_backend: StoreBackend,
    pub table_name: String,
    pub database_url: Option<String>,
    pub database_max_connections: u32,

    // Redis (optional profile cache)
    pub redis_url: Option<String>,
    pub redis_cache_ttl_seconds: u64,

    // CORS
    pub cors_allow_origins: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            env: Environment::Dev,
            server_addr: "0.0.0.0:8080".to_string(),
            log_format: LogFormat::Pretty,
            store_backend: StoreBackend::Memory,
            table_name: "data_table".to_string(),
            database_url: None,
            database_max_connections: 10,
            redis_url: None,
            redis_cache_ttl_seconds: 3600,
            cors_allow_origins: vec!["*".to_string()],
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let defaults = Settings::default();

        let env = Environment::from_str(&env::var("ENV").unwrap_or_else(|_| "dev".to_string()));
        let server_addr = env::var("SERVER_ADDR").unwrap_or(defaults.server_addr);
        let log_format = LogFormat::parse(&env::var("LOG_FORMAT").unwrap_or_default(), &env);

        // Store
        let database_url = env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());
        let store_backend = match env::var("STORE_BACKEND") {
            Ok(raw) => StoreBackend::parse(&raw)?,
            Err(_) if database_url.is_some() => StoreBackend::Postgres,
            Err(_) => StoreBackend::Memory,
        };
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL must be set when STORE_BACKEND=postgres");
        }
        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.database_max_connections);

        let table_name = env::var("TABLE_NAME").unwrap_or(defaults.table_name);
        validate_table_name(&table_name).context("Invalid TABLE_NAME")?;

        // Redis
        let redis_url = env::var("REDIS_URL").ok().filter(|s| !s.is_empty());
        let redis_cache_ttl_seconds = env::var("REDIS_CACHE_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.redis_cache_ttl_seconds);

        // CORS
        let cors_allow_origins = parse_origins(
            &env::var("CORS_ALLOW_ORIGINS").unwrap_or_else(|_| "*".to_string()),
        );

        Ok(Settings {
            env,
            server_addr,
            log_format,
            store_backend,
            table_name,
            database_url,
            database_max_connections,
            redis_url,
            redis_cache_ttl_seconds,
            cors_allow_origins,
        })
    }

    /// True when any origin may call the API
    pub fn cors_allows_any(&self) -> bool {
        self.cors_allow_origins.is_empty() || self.cors_allow_origins.iter().any(|o| o == "*")
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// The table name is interpolated into SQL, so only plain identifiers pass.
fn validate_table_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        bail!("table name is empty");
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        bail!("table name '{}' must start with a letter or underscore", name);
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        bail!("table name '{}' may only contain letters, digits and underscores", name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parsing_falls_back_to_dev() {
        assert_eq!(Environment::from_str("production"), Environment::Prod);
        assert_eq!(Environment::from_str("STAGING"), Environment::Staging);
        assert_eq!(Environment::from_str("whatever"), Environment::Dev);
    }

    #[test]
    fn log_format_defaults_follow_environment() {
        assert_eq!(LogFormat::parse("", &Environment::Prod), LogFormat::Json);
        assert_eq!(LogFormat::parse("", &Environment::Dev), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("pretty", &Environment::Prod), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("JSON", &Environment::Staging), LogFormat::Json);
    }

    #[test]
    fn store_backend_parsing() {
        assert_eq!(StoreBackend::parse("pg").unwrap(), StoreBackend::Postgres);
        assert_eq!(StoreBackend::parse("Memory").unwrap(), StoreBackend::Memory);
        assert!(StoreBackend::parse("dynamo").is_err());
    }

    #[test]
    fn table_names_must_be_identifiers() {
        assert!(validate_table_name("data_table").is_ok());
        assert!(validate_table_name("_t1").is_ok());
        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("1table").is_err());
        assert!(validate_table_name("drop table; --").is_err());
    }

    #[test]
    fn origins_are_trimmed_and_wildcard_detected() {
        let mut settings = Settings::default();
        settings.cors_allow_origins = parse_origins(" http://a.test , ,http://b.test");
        assert_eq!(settings.cors_allow_origins, vec!["http://a.test", "http://b.test"]);
        assert!(!settings.cors_allows_any());

        settings.cors_allow_origins = parse_origins("*");
        assert!(settings.cors_allows_any());
    }
}
