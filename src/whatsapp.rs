//! WhatsApp checkout handoff.
//!
//! The cart becomes a plain-text order summary sent to a distributor through
//! a `wa.me` link. The message layout is consumed by people reading it on a
//! phone, so line order and wording are fixed.

use chrono::{Datelike, NaiveDate};
use crate::domain::aggregates::Session;
use crate::domain::value_objects::{format_price, total_of, Role};
use crate::pricing;
use crate::store::Store;

const HEADER: &str = "🛒 *PEDIDO H&B IMPORTACIONES*";
const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━";
const CLOSING: &str = "Por favor confirma la disponibilidad y el tiempo de entrega. ¡Gracias!";

/// `None` when no cart line resolves to a product.
pub fn checkout_url(store: &Store, session: Option<&Session>, date: NaiveDate, fallback_phone: &str) -> Option<String> {
    let message = order_message(store, session, date)?;
    let phone = distributor_phone(store).unwrap_or_else(|| fallback_phone.to_string());
    Some(format!("https://wa.me/{phone}?text={}", encode_component(&message)))
}

pub fn order_message(store: &Store, session: Option<&Session>, date: NaiveDate) -> Option<String> {
    let role = session.map(|s| s.role);
    let lines = pricing::price_lines(&store.cart(), &store.products(), role);
    if lines.is_empty() {
        return None;
    }

    let mut out = vec![HEADER.to_string(), RULE.to_string(), String::new()];
    for line in &lines {
        out.push(format!("• *{}*", line.product.name));
        out.push(format!("  Cantidad: {}", line.quantity));
        out.push(format!("  Precio unitario: {}", format_price(line.unit_price)));
        out.push(format!("  Subtotal: {}", format_price(line.subtotal)));
        out.push(String::new());
    }
    let total = total_of(lines.iter().map(|l| l.subtotal));
    out.push(format!("💰 *TOTAL: {}*", format_price(total)));
    out.push(String::new());
    if let Some(session) = session {
        out.push(format!("👤 Cliente: {}", session.name));
        out.push(format!("📧 Email: {}", session.email));
    }
    out.push(format!("📅 Fecha: {}", short_date(date)));
    out.push(String::new());
    out.push(CLOSING.to_string());
    Some(out.join("\n"))
}

/// Number of the first active distributor, reduced to `+` and digits.
/// A distributor without a number yields `None`.
fn distributor_phone(store: &Store) -> Option<String> {
    let users = store.users();
    let distributor = users.iter().find(|u| u.role == Role::Distributor && u.active)?;
    let phone = distributor.whatsapp.as_deref()?;
    Some(phone.chars().filter(|c| *c == '+' || c.is_ascii_digit()).collect())
}

/// `d/m/yyyy`, no zero padding.
fn short_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.day(), date.month(), date.year())
}

/// Percent-encodes like `encodeURIComponent`, which also leaves
/// `! * ' ( )` untouched.
fn encode_component(text: &str) -> String {
    urlencoding::encode(text)
        .replace("%21", "!")
        .replace("%2A", "*")
        .replace("%27", "'")
        .replace("%28", "(")
        .replace("%29", ")")
}
