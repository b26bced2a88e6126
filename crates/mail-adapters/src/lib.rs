//! # mail-adapters
//!
//! Implementations of the `Notifier` port.

pub mod log;
pub mod mailgun;
pub mod template;

pub use log::LogNotifier;
pub use mailgun::MailgunNotifier;
