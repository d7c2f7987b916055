#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    /// Base URL of the product persistence API, e.g. `"https://api.example.com/v1/"`.
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub log_level: String,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    /// Stock carried by the single default variant of a product without attributes.
    pub default_stock: u32,
    /// Drop parent-stock entries whose value left the parent axis.
    pub prune_stale_stock: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("api_base_url", &self.api_base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[redacted]"))
            .field("log_level", &self.log_level)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("default_stock", &self.default_stock)
            .field("prune_stale_stock", &self.prune_stale_stock)
            .finish()
    }
}
