use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Process-wide settings, built once at startup and handed to
/// `Application::build`. Nothing reads the environment after that.
#[derive(Debug, Clone)]
pub struct NewsConfig {
    pub common: core_config::Config,
    pub production: bool,
    pub secret_hash: Secret<String>,
    pub otlp_endpoint: Option<String>,
    pub database: DatabaseConfig,
    pub site: SiteConfig,
    /// `None` when SMTP is not enabled; email-backed routes answer 503.
    pub smtp: Option<SmtpConfig>,
    /// `None` when FCM is not enabled; push broadcast answers 503.
    pub fcm: Option<FcmConfig>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Networked database connection string. Selects PostgreSQL when set.
    pub url: Option<Secret<String>>,
    /// Embedded SQLite file used when `url` is absent.
    pub path: String,
    pub pool_size: u32,
}

#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Link attached to every broadcast push notification.
    pub notification_url: String,
    /// Public base URL, used to build unsubscribe links.
    pub base_url: String,
    /// Recipient of internal notifications (new feedback, new news, push reports).
    pub admin_email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Secret<String>,
    pub from_email: String,
    pub from_name: String,
}

#[derive(Debug, Clone)]
pub struct FcmConfig {
    pub project_id: String,
    pub access_token: Secret<String>,
}

impl NewsConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let smtp = if flag("SMTP_ENABLED") {
            Some(SmtpConfig {
                host: get_env("SMTP_HOST", Some("smtp.gmail.com"), is_prod)?,
                port: get_env("SMTP_PORT", Some("587"), is_prod)?
                    .parse()
                    .unwrap_or(587),
                user: get_env("SMTP_USER", None, is_prod)?,
                password: Secret::new(get_env("SMTP_PASSWORD", None, is_prod)?),
                from_email: get_env("SMTP_FROM_EMAIL", None, is_prod)?,
                from_name: get_env("SMTP_FROM_NAME", Some("News"), is_prod)?,
            })
        } else {
            None
        };

        let fcm = if flag("FCM_ENABLED") {
            Some(FcmConfig {
                project_id: get_env("FCM_PROJECT_ID", None, is_prod)?,
                access_token: Secret::new(get_env("FCM_ACCESS_TOKEN", None, is_prod)?),
            })
        } else {
            None
        };

        Ok(NewsConfig {
            common: common_config,
            production: is_prod,
            secret_hash: Secret::new(get_env("SECRET_HASH", Some("dev-secret"), is_prod)?),
            otlp_endpoint: optional_env("OTLP_ENDPOINT"),
            database: DatabaseConfig {
                url: optional_env("DATABASE_URL").map(Secret::new),
                path: get_env("DATABASE_PATH", Some("news.db"), false)?,
                pool_size: get_env("DATABASE_POOL_SIZE", Some("4"), false)?
                    .parse()
                    .map_err(|e| {
                        AppError::ConfigError(anyhow::anyhow!(
                            "DATABASE_POOL_SIZE must be a positive integer: {}",
                            e
                        ))
                    })?,
            },
            site: SiteConfig {
                notification_url: get_env(
                    "NOTIFICATION_URL",
                    Some("http://localhost:8080/"),
                    is_prod,
                )?,
                base_url: get_env("SITE_URL", Some("http://localhost:8080"), is_prod)?,
                admin_email: optional_env("ADMIN_EMAIL"),
            },
            smtp,
            fcm,
        })
    }
}

/// Blank values count as unset, so `DATABASE_URL=` still selects SQLite.
fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn flag(key: &str) -> bool {
    env::var(key)
        .unwrap_or_else(|_| "false".to_string())
        .parse()
        .unwrap_or(false)
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match optional_env(key) {
        Some(val) => Ok(val),
        None => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
