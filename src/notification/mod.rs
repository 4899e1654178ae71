pub mod email_service;
pub mod notification_channel;

pub use email_service::EmailService;
pub use notification_channel::{DeliveryError, LoggingChannel, NotificationChannel};
