pub mod config;
pub mod logging;
pub mod notifications;

pub use config::{FaucetConfig, WalletEndpoint, validate_url};
pub use notifications::{AppNotification, NotificationLink, NotificationStore, NotificationType};
