use std::env;

/// Runtime configuration collected from the environment
///
/// Every field has a development default so the portal starts without any
/// setup; deployments override through environment variables.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Address the web server binds to
    pub bind_addr: String,

    /// Directory holding the JSON collections
    pub database_dir: String,

    /// Deployment environment label ("development", "production", ...)
    pub environment: String,

    /// SMTP relay for credential mail; empty disables mail delivery
    pub smtp_server: String,

    /// SMTP relay port
    pub smtp_port: u16,

    /// SMTP account username
    pub smtp_username: String,

    /// SMTP account password
    pub smtp_password: String,
}

impl Settings {
    /// Read settings from the environment, falling back to development
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        Settings {
            bind_addr: env_or("PORTAL_BIND_ADDR", "127.0.0.1:8000"),
            database_dir: env_or("PORTAL_DATABASE_DIR", "database"),
            environment: env_or("PORTAL_ENVIRONMENT", "development"),
            smtp_server: env_or("PORTAL_SMTP_SERVER", ""),
            smtp_port: env_or("PORTAL_SMTP_PORT", "465").parse().unwrap_or(465),
            smtp_username: env_or("PORTAL_SMTP_USERNAME", ""),
            smtp_password: env_or("PORTAL_SMTP_PASSWORD", ""),
        }
    }

    /// Whether credential mail can be sent at all.
    pub fn mail_configured(&self) -> bool {
        !self.smtp_server.is_empty() && !self.smtp_username.is_empty()
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
