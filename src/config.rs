use std::env;
use std::fmt;

use crate::auth::DeactivationAuth;

#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub audit_database_path: String,
    /// Shared secret for admin operations. `None` disables them entirely.
    pub admin_secret: Option<String>,
    pub license_key_prefix: String,
    pub deactivate_auth: DeactivationAuth,
    pub verification_log_enabled: bool,
    /// Days to keep verification log entries (0 = never purge)
    pub verification_log_retention_days: i64,
    pub dev_mode: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("LICENSE_SERVER_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5001);

        // Blank counts as unset so a stray `ADMIN_SECRET=` never opens the admin surface
        let admin_secret = env::var("ADMIN_SECRET")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let deactivate_auth = match env::var("DEACTIVATE_AUTH") {
            Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(
                    "Unknown DEACTIVATE_AUTH value {:?}, falling back to admin",
                    raw
                );
                DeactivationAuth::Admin
            }),
            Err(_) => DeactivationAuth::Admin,
        };

        Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "licenses.db".to_string()),
            audit_database_path: env::var("AUDIT_DATABASE_PATH")
                .unwrap_or_else(|_| "licenses_audit.db".to_string()),
            admin_secret,
            license_key_prefix: env::var("LICENSE_KEY_PREFIX")
                .ok()
                .map(|p| p.trim().to_uppercase())
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| "LIC".to_string()),
            deactivate_auth,
            verification_log_enabled: env::var("VERIFICATION_LOG_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            verification_log_retention_days: env::var("VERIFICATION_LOG_RETENTION_DAYS")
                .ok()
                .and_then(|d| d.parse().ok())
                .unwrap_or(90),
            dev_mode,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_path", &self.database_path)
            .field("audit_database_path", &self.audit_database_path)
            .field(
                "admin_secret",
                &self.admin_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("license_key_prefix", &self.license_key_prefix)
            .field("deactivate_auth", &self.deactivate_auth)
            .field("verification_log_enabled", &self.verification_log_enabled)
            .field(
                "verification_log_retention_days",
                &self.verification_log_retention_days,
            )
            .field("dev_mode", &self.dev_mode)
            .finish()
    }
}
