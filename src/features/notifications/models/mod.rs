mod notification;

pub use notification::{NewNotification, Notification, NotificationKind, NOTIFICATION_COLUMNS};
