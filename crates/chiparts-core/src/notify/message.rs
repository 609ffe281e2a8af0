//! Notification text rendering
//!
//! Messages are sent with Telegram's HTML parse mode, so every user supplied
//! value goes through [`escape_html`] before it is embedded.

use crate::models::{ValidatedOrder, UNSPECIFIED_PLACEHOLDER};

/// Literal that opens every order notification and every audit entry.
/// The stats endpoint counts its occurrences.
pub const ORDER_MARKER: &str = "НОВАЯ ЗАЯВКА";

/// Render the notification sent for a new order
pub fn order_message(order: &ValidatedOrder) -> String {
    let brand = order.car_brand.as_deref().unwrap_or(UNSPECIFIED_PLACEHOLDER);
    let model = order.car_model.as_deref().unwrap_or(UNSPECIFIED_PLACEHOLDER);
    let phone = escape_html(&order.phone);

    format!(
        "🆕 <b>{marker} {label}</b> 🆕\n\
         \n\
         ⏰ <b>Время:</b> {timestamp}\n\
         \n\
         👤 <b>Имя:</b> {name}\n\
         📱 <b>Телефон:</b> {phone}\n\
         🚗 <b>Марка:</b> {brand}\n\
         🚘 <b>Модель:</b> {model}\n\
         🔧 <b>Деталь:</b> {part}\n\
         💬 <b>Комментарий:</b> {comment}\n\
         \n\
         ━━━━━━━━━━━━━━━━━━━━━━━━━━\n\
         📞 <i>Для связи: {phone}</i>",
        marker = ORDER_MARKER,
        label = order.source_kind.label(),
        timestamp = escape_html(&order.timestamp),
        name = escape_html(&order.name),
        brand = escape_html(brand),
        model = escape_html(model),
        part = escape_html(&order.part_name),
        comment = escape_html(&order.comment),
    )
}

/// Render the message announcing that the server is up
pub fn startup_message(started_at: &str, port: u16, public_url: &str) -> String {
    format!(
        "✅ <b>Сервер ChiParts запущен!</b>\n\
         \n\
         Статус: ✅ Работает нормально\n\
         Время запуска: {started_at}\n\
         Порт: {port}\n\
         URL: {url}\n\
         \n\
         Сервер готов принимать заявки с сайта.",
        started_at = escape_html(started_at),
        url = escape_html(&external_url(public_url)),
    )
}

/// Prefix a bare host with `https://`
fn external_url(public_url: &str) -> String {
    if public_url.starts_with("http://") || public_url.starts_with("https://") {
        public_url.to_string()
    } else {
        format!("https://{public_url}")
    }
}

/// Escape the characters Telegram's HTML parser treats specially
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
