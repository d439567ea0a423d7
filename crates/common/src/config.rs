/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// PostgreSQL connection string. When absent the in-memory document store is used.
    pub database_url: Option<String>,

    /// Maximum number of PostgreSQL connections in the pool (default: 20)
    pub db_max_connections: u32,

    /// Port the HTTP server binds to (default: 8000)
    pub api_port: u16,

    /// Firebase project id used to build the FCM send URL
    pub fcm_project_id: Option<String>,

    /// OAuth2 access token for the FCM HTTP v1 API
    pub fcm_access_token: Option<String>,

    /// Base URL of the FCM API (overridable for emulators)
    pub fcm_endpoint: String,

    /// Maximum number of recipients processed concurrently per message (default: 8)
    pub fanout_concurrency: usize,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable source.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let non_empty = |name: &str| var(name).filter(|v| !v.trim().is_empty());

        let fanout_concurrency: usize = var("FANOUT_CONCURRENCY")
            .unwrap_or_else(|| "8".to_string())
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("FANOUT_CONCURRENCY must be a valid usize"))?;
        if fanout_concurrency == 0 {
            anyhow::bail!("FANOUT_CONCURRENCY must be at least 1");
        }

        Ok(Self {
            database_url: non_empty("DATABASE_URL"),
            db_max_connections: var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| "20".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DB_MAX_CONNECTIONS must be a valid u32"))?,
            api_port: var("API_PORT")
                .unwrap_or_else(|| "8000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("API_PORT must be a valid u16"))?,
            fcm_project_id: non_empty("FCM_PROJECT_ID"),
            fcm_access_token: non_empty("FCM_ACCESS_TOKEN"),
            fcm_endpoint: var("FCM_ENDPOINT")
                .unwrap_or_else(|| "https://fcm.googleapis.com".to_string()),
            fanout_concurrency,
        })
    }

    /// FCM credentials, if both the project id and access token are configured.
    pub fn fcm_credentials(&self) -> Option<(&str, &str)> {
        match (&self.fcm_project_id, &self.fcm_access_token) {
            (Some(project), Some(token)) => Some((project.as_str(), token.as_str())),
            _ => None,
        }
    }
}
