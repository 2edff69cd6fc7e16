use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Which reconciler backs the operation endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationStoreKind {
    /// Operations and bindings in separate tables, reconciled by binding id.
    Relational,
    /// Bindings embedded in the operation document, replaced wholesale.
    Document,
}

impl FromStr for OperationStoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relational" => Ok(Self::Relational),
            "document" => Ok(Self::Document),
            other => Err(format!(
                "unknown operation store '{other}' (expected 'relational' or 'document')"
            )),
        }
    }
}

impl fmt::Display for OperationStoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relational => f.write_str("relational"),
            Self::Document => f.write_str("document"),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound on draining in-flight requests at shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Reconciler selection (default: `relational`).
    pub operation_store: OperationStoreKind,
    /// Command catalog definition file (default: `data/commands.json`).
    pub commands_json_path: PathBuf,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    /// | `OPERATION_STORE`      | `relational`               |
    /// | `COMMANDS_JSON_PATH`   | `data/commands.json`       |
    ///
    /// Panics on unparsable values so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let operation_store: OperationStoreKind = std::env::var("OPERATION_STORE")
            .unwrap_or_else(|_| "relational".into())
            .parse()
            .unwrap_or_else(|e| panic!("OPERATION_STORE: {e}"));

        let commands_json_path = std::env::var("COMMANDS_JSON_PATH")
            .unwrap_or_else(|_| "data/commands.json".into())
            .into();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            operation_store,
            commands_json_path,
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
