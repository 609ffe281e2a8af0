//! # ChiParts
//!
//! Order intake for a spare-parts shop.
//!
//! Orders submitted from the web form are validated, announced to one or more
//! Telegram chats and appended to a local text log. A stats endpoint counts the
//! orders recorded in that log.
//!
//! ## Architecture
//!
//! - **Notify**: concurrent fan-out to Telegram chats through the Bot API
//! - **Audit**: append-only order log, also used for the order count
//! - **Intake**: validation, message rendering, delivery and logging of an order
//! - **API**: REST endpoints and the front-end fallback
//!
//! ## Quick Start
//!
//! ```bash
//! BOT_TOKEN=123:abc ADMIN_CHAT_IDS=-100123,-100456 chiparts serve
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod api;
pub mod audit;
pub mod config;
pub mod error;
pub mod intake;
pub mod models;
pub mod notify;

pub use config::Config;
pub use error::{Error, Result};

/// Re-exports for convenience
pub mod prelude {
    pub use crate::audit::AuditLog;
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::intake::OrderIntake;
    pub use crate::models::*;
    pub use crate::notify::{Notifier, TelegramNotifier};
}
