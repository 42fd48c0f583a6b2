//! Types for reservations

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::wire;

/// Lifecycle of a reservation. Only accept/reject move it out of `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReservationStatus {
    #[serde(rename = "PENDIENTE")]
    Pending,
    #[serde(rename = "CONFIRMADA")]
    Confirmed,
    #[serde(rename = "RECHAZADA")]
    Rejected,
}

impl ReservationStatus {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "PENDIENTE",
            ReservationStatus::Confirmed => "CONFIRMADA",
            ReservationStatus::Rejected => "RECHAZADA",
        }
    }
}

impl Default for ReservationStatus {
    fn default() -> Self {
        ReservationStatus::Pending
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PENDIENTE" => Ok(ReservationStatus::Pending),
            "CONFIRMADA" => Ok(ReservationStatus::Confirmed),
            "RECHAZADA" => Ok(ReservationStatus::Rejected),
            other => Err(Error::validation(format!("Estado desconocido: {}", other))),
        }
    }
}

/// A transport reservation as the backend returns it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    #[serde(deserialize_with = "wire::id")]
    pub id: String,

    #[serde(rename = "nombre")]
    pub name: String,

    #[serde(rename = "telefono", default)]
    pub phone: String,

    #[serde(rename = "correoElectronico", default)]
    pub email: String,

    #[serde(rename = "fechaHoraServicio", deserialize_with = "wire::timestamp")]
    pub service_at: DateTime<Utc>,

    #[serde(rename = "lugarRecogida", default)]
    pub pickup: String,

    #[serde(rename = "destino", default)]
    pub destination: String,

    #[serde(rename = "cantidadPersonas", default)]
    pub passengers: u32,

    #[serde(rename = "estado", default)]
    pub status: ReservationStatus,

    #[serde(
        rename = "fechaCreacion",
        default,
        deserialize_with = "wire::timestamp_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(rename = "vuelo", default, skip_serializing_if = "Option::is_none")]
    pub flight: Option<String>,

    #[serde(rename = "monto", default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,

    #[serde(rename = "comision", default, skip_serializing_if = "Option::is_none")]
    pub commission: Option<f64>,

    #[serde(rename = "chofer", default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,

    /// Customer's free-text message
    #[serde(rename = "mensaje", default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Reservation {
    /// Flight number, treating an empty string as absent
    pub fn flight(&self) -> Option<&str> {
        non_blank(self.flight.as_deref())
    }

    pub fn driver(&self) -> Option<&str> {
        non_blank(self.driver.as_deref())
    }

    pub fn message(&self) -> Option<&str> {
        non_blank(self.message.as_deref())
    }

    pub fn is_pending(&self) -> bool {
        self.status == ReservationStatus::Pending
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Editable operational fields, sent as `PATCH /reservas/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReservationPatch {
    #[serde(rename = "monto", skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,

    #[serde(rename = "comision", skip_serializing_if = "Option::is_none")]
    pub commission: Option<f64>,

    #[serde(rename = "chofer", skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,

    #[serde(rename = "vuelo", skip_serializing_if = "Option::is_none")]
    pub flight: Option<String>,
}

impl ReservationPatch {
    /// Draft pre-filled with the reservation's current values
    pub fn from_reservation(reservation: &Reservation) -> Self {
        Self {
            amount: reservation.amount,
            commission: reservation.commission,
            driver: reservation.driver.clone(),
            flight: reservation.flight.clone(),
        }
    }

    pub fn with_amount(mut self, value: f64) -> Self {
        self.amount = Some(value);
        self
    }

    pub fn with_commission(mut self, value: f64) -> Self {
        self.commission = Some(value);
        self
    }

    pub fn with_driver(mut self, value: &str) -> Self {
        self.driver = Some(value.to_string());
        self
    }

    pub fn with_flight(mut self, value: &str) -> Self {
        self.flight = Some(value.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.commission.is_none()
            && self.driver.is_none()
            && self.flight.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_backend_reservation() {
        let r: Reservation = serde_json::from_value(json!({
            "id": "r-1",
            "nombre": "Ana Mora",
            "telefono": "8888-0000",
            "correoElectronico": "ana@example.com",
            "fechaHoraServicio": "2026-10-20T13:00:00.000Z",
            "lugarRecogida": "Hotel Central",
            "destino": "Aeropuerto SJO",
            "cantidadPersonas": 3,
            "estado": "CONFIRMADA",
            "fechaCreacion": "2026-10-17T09:00:00.000Z",
            "vuelo": "",
            "monto": 150.5
        }))
        .unwrap();
        assert_eq!(r.status, ReservationStatus::Confirmed);
        assert_eq!(r.passengers, 3);
        assert_eq!(r.flight(), None);
        assert_eq!(r.amount, Some(150.5));
        assert!(r.commission.is_none());
    }

    #[test]
    fn patch_omits_unset_fields() {
        let patch = ReservationPatch::default().with_amount(80.0).with_driver("Luis");
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({ "monto": 80.0, "chofer": "Luis" })
        );
        assert!(ReservationPatch::default().is_empty());
    }

    #[test]
    fn status_parsing() {
        assert_eq!("confirmada".parse::<ReservationStatus>().unwrap(), ReservationStatus::Confirmed);
        assert!(matches!("CANCELADA".parse::<ReservationStatus>(), Err(Error::Validation(_))));
    }
}
