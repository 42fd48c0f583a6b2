//! New reservations entered from the admin panel

use serde::Serialize;

use crate::error::Error;

/// Reservation typed in by an operator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewReservation {
    #[serde(rename = "nombre")]
    pub name: String,

    #[serde(rename = "telefono")]
    pub phone: String,

    #[serde(rename = "correoElectronico")]
    pub email: String,

    /// Local date and time as entered, e.g. `2026-10-20T08:30`
    #[serde(rename = "fechaHoraServicio")]
    pub service_at: String,

    #[serde(rename = "lugarRecogida")]
    pub pickup: String,

    #[serde(rename = "destino")]
    pub destination: String,

    #[serde(rename = "cantidadPersonas")]
    pub passengers: u32,
}

impl Default for NewReservation {
    fn default() -> Self {
        Self {
            name: String::new(),
            phone: String::new(),
            email: String::new(),
            service_at: String::new(),
            pickup: String::new(),
            destination: String::new(),
            passengers: 1,
        }
    }
}

/// Body of `POST /reservas`
#[derive(Serialize)]
pub(crate) struct CreateReservation<'a> {
    #[serde(flatten)]
    pub reservation: &'a NewReservation,
    #[serde(rename = "desdeAdmin")]
    pub from_admin: bool,
}

impl NewReservation {
    /// Check required fields in form order. The first failure wins.
    pub fn validate(&self) -> Result<(), Error> {
        let required = [
            (&self.name, "El nombre es requerido"),
            (&self.phone, "El teléfono es requerido"),
            (&self.email, "El correo electrónico es requerido"),
            (&self.service_at, "La fecha y hora del servicio es requerida"),
            (&self.pickup, "El lugar de recogida es requerido"),
            (&self.destination, "El destino es requerido"),
        ];
        if let Some((_, message)) = required.iter().find(|(value, _)| value.trim().is_empty()) {
            return Err(Error::validation(message));
        }
        if self.passengers < 1 {
            return Err(Error::validation("La cantidad de personas debe ser al menos 1"));
        }
        Ok(())
    }
}
