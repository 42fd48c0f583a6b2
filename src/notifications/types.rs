//! Types for notifications

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::push::PushMessage;
use crate::wire;

/// Prefix of ids synthesized on the client before the backend knows the notification
pub const TEMP_ID_PREFIX: &str = "temp-";

const DEFAULT_TITLE: &str = "Nueva notificación";

const MONTHS: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
];

/// A notification about reservation activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(deserialize_with = "wire::id")]
    pub id: String,

    #[serde(rename = "titulo")]
    pub title: String,

    #[serde(rename = "mensaje", default)]
    pub message: String,

    /// Payload, may carry `reservaId`
    #[serde(rename = "datos", default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    #[serde(rename = "fechaCreacion", deserialize_with = "wire::timestamp")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "leida", default)]
    pub read: bool,
}

impl Notification {
    /// Build a temporary, unread entry from a push message
    pub fn from_push(message: &PushMessage, now: DateTime<Utc>) -> Self {
        let data = if message.data.is_empty() {
            None
        } else {
            serde_json::to_value(&message.data).ok()
        };
        Self {
            id: format!("{}{}", TEMP_ID_PREFIX, Uuid::new_v4()),
            title: message.title().unwrap_or(DEFAULT_TITLE).to_string(),
            message: message.body().unwrap_or_default().to_string(),
            data,
            created_at: now,
            read: false,
        }
    }

    /// True for entries synthesized locally that have no backend counterpart yet
    pub fn is_temporary(&self) -> bool {
        is_temporary_id(&self.id)
    }

    /// Reservation this notification refers to
    pub fn reservation_id(&self) -> Option<String> {
        match self.data.as_ref()?.get("reservaId")? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Page showing the referenced reservation
    pub fn reservation_link(&self) -> Option<String> {
        self.reservation_id().map(|id| format!("/reservas?id={}", id))
    }
}

pub fn is_temporary_id(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

/// Body of `POST /notificaciones/login`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceRegistration {
    pub token: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "rol")]
    pub role: String,
}

/// Age of a notification the way the list shows it
pub fn format_relative(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - created_at).num_minutes();
    if minutes < 1 {
        "Ahora".to_string()
    } else if minutes < 60 {
        format!("Hace {} min", minutes)
    } else if minutes < 1440 {
        format!("Hace {} h", minutes / 60)
    } else {
        format!(
            "{:02} {}, {:02}:{:02}",
            created_at.day(),
            MONTHS[created_at.month0() as usize],
            created_at.hour(),
            created_at.minute()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    #[test]
    fn decodes_backend_notification() {
        let n: Notification = serde_json::from_value(json!({
            "id": 42,
            "titulo": "Nueva reserva",
            "mensaje": "Ana",
            "datos": { "reservaId": "r-1" },
            "fechaCreacion": "2026-10-17T10:00:00.000Z",
            "leida": false
        }))
        .unwrap();
        assert_eq!(n.id, "42");
        assert!(!n.is_temporary());
        assert_eq!(n.reservation_link().as_deref(), Some("/reservas?id=r-1"));
    }

    #[test]
    fn push_becomes_unread_temporary_entry() {
        let now = Utc::now();
        let a = Notification::from_push(&PushMessage::default(), now);
        let b = Notification::from_push(&PushMessage::new("Reserva", "Juan"), now);
        assert!(a.is_temporary() && b.is_temporary());
        assert_ne!(a.id, b.id);
        assert_eq!(a.title, "Nueva notificación");
        assert_eq!(a.message, "");
        assert!(!a.read);
        assert_eq!(b.title, "Reserva");
    }

    #[test]
    fn relative_ages() {
        let now = Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap();
        assert_eq!(format_relative(now - Duration::seconds(20), now), "Ahora");
        assert_eq!(format_relative(now - Duration::minutes(5), now), "Hace 5 min");
        assert_eq!(format_relative(now - Duration::minutes(150), now), "Hace 2 h");
        assert_eq!(
            format_relative(Utc.with_ymd_and_hms(2026, 10, 3, 8, 5, 0).unwrap(), now),
            "03 oct, 08:05"
        );
    }
}
