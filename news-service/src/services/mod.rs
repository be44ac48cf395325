pub mod database;
pub mod metrics;
pub mod providers;

pub use database::{connect, DatabaseRepository, PostgresDatabase, SqliteDatabase};
pub use metrics::{get_metrics, init_metrics, record_outbound};
pub use providers::{
    EmailRepository, FcmNotificationRepository, MockEmailRepository, MockNotificationRepository,
    NotificationRepository, ProviderError, PushReport, SentEmail, SentPush, SmtpEmailRepository,
};
