//! Order data model

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Stored in place of an absent comment
pub const COMMENT_PLACEHOLDER: &str = "Без комментария";

/// Shown in the notification in place of an absent car brand or model
pub const UNSPECIFIED_PLACEHOLDER: &str = "Не указано";

/// Where an order came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderSource {
    /// Submitted through the web form
    Website,
    /// Anything else, the Telegram bot being the only other client
    #[default]
    Bot,
}

impl OrderSource {
    /// Classify the raw `source` field of a request
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some("website") => Self::Website,
            _ => Self::Bot,
        }
    }

    /// Display label used in the notification header
    pub fn label(self) -> &'static str {
        match self {
            Self::Website => "🌐 Сайт",
            Self::Bot => "📱 Telegram-бот",
        }
    }
}

/// Order submission as received from the front end
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub car_brand: Option<String>,
    pub car_model: Option<String>,
    pub part_name: Option<String>,
    pub comment: Option<String>,
    pub source: Option<String>,
}

impl OrderRequest {
    /// Check required fields and normalize the submission.
    ///
    /// `name`, `phone` and `partName` must be present and not blank. Text
    /// fields are kept exactly as submitted; only the phone is normalized.
    pub fn validate(self, received_at: DateTime<Local>) -> Result<ValidatedOrder> {
        let (Some(name), Some(phone), Some(part_name)) = (
            required(self.name),
            required(self.phone),
            required(self.part_name),
        ) else {
            return Err(Error::validation(
                "Необходимо заполнить все обязательные поля",
            ));
        };

        Ok(ValidatedOrder {
            timestamp: format_timestamp(received_at),
            name,
            phone: format!("+{}", normalize_phone(&phone)),
            car_brand: non_empty(self.car_brand),
            car_model: non_empty(self.car_model),
            part_name,
            comment: non_empty(self.comment).unwrap_or_else(|| COMMENT_PLACEHOLDER.to_string()),
            source_kind: OrderSource::from_raw(self.source.as_deref()),
            source: self.source,
        })
    }
}

/// An order that passed validation but has not been delivered yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedOrder {
    pub timestamp: String,
    pub name: String,
    /// `+` followed by the digits of the submitted number
    pub phone: String,
    pub car_brand: Option<String>,
    pub car_model: Option<String>,
    pub part_name: String,
    pub comment: String,
    pub source: Option<String>,
    pub source_kind: OrderSource,
}

impl ValidatedOrder {
    /// Finish the record once the number of accepting destinations is known
    pub fn into_order(self, sent_to: usize) -> Order {
        Order {
            timestamp: self.timestamp,
            name: self.name,
            phone: self.phone,
            car_brand: self.car_brand,
            car_model: self.car_model,
            part_name: self.part_name,
            comment: self.comment,
            source: self.source,
            sent_to,
        }
    }
}

/// The persisted record of one order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Local time the request was received
    pub timestamp: String,

    pub name: String,

    /// Normalized phone, `+` and digits only
    pub phone: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car_brand: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car_model: Option<String>,

    pub part_name: String,

    pub comment: String,

    /// Raw source field as submitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Number of destinations that accepted the notification
    pub sent_to: usize,
}

/// Strip every non-digit character
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Human-readable timestamp, `DD.MM.YYYY, HH:MM:SS`
pub fn format_timestamp(at: DateTime<Local>) -> String {
    at.format("%d.%m.%Y, %H:%M:%S").to_string()
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
