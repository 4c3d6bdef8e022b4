//! reportgen-notify
//!
//! Report email delivery via Amazon SES.

pub mod error;
pub mod notifier;
pub mod ses;

pub use crate::notifier::Notifier;
pub use crate::ses::{SesConfig, SesNotifier};
