//! Broadcasting of user-visible events.
//!
//! Presentation layers subscribe here instead of being called back by the core.

pub mod notification;

pub use notification::{Annotation, Notification, NotificationKind, Notifier};
