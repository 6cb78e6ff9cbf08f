use std::time::Duration;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables. The callback URL is
/// process-wide and fixed at startup; it is never chosen per request.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8084`).
    pub port: u16,
    /// Job manager endpoint that receives outcome callbacks.
    pub callback_url: String,
    /// HTTP request timeout in seconds (default: `30`). Applies to the
    /// accepting path only, never to a running solve.
    pub request_timeout_secs: u64,
    /// Optional wall-clock budget for a single solve, in seconds.
    /// `None` (the default) lets the engine run arbitrarily long.
    pub solver_timeout_secs: Option<u64>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                                        |
    /// |------------------------|------------------------------------------------|
    /// | `HOST`                 | `0.0.0.0`                                      |
    /// | `PORT`                 | `8084`                                         |
    /// | `CALLBACK_URL`         | `http://localhost:8083/updateBatteryResults`   |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                                           |
    /// | `SOLVER_TIMEOUT_SECS`  | unset (no timeout; `0` also means no timeout)  |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8084".into())
            .parse()
            .expect("PORT must be a valid u16");

        let callback_url = std::env::var("CALLBACK_URL")
            .unwrap_or_else(|_| "http://localhost:8083/updateBatteryResults".into());

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let solver_timeout_secs: Option<u64> = std::env::var("SOLVER_TIMEOUT_SECS")
            .ok()
            .map(|v| v.parse().expect("SOLVER_TIMEOUT_SECS must be a valid u64"))
            .filter(|&secs| secs > 0);

        Self {
            host,
            port,
            callback_url,
            request_timeout_secs,
            solver_timeout_secs,
        }
    }

    /// Solver timeout as a [`Duration`], if one is configured.
    pub fn solver_timeout(&self) -> Option<Duration> {
        self.solver_timeout_secs.map(Duration::from_secs)
    }
}
