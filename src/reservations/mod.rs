//! Reservations: listing, review, operational edits and creation

mod calendar;
mod form;
mod query;
mod table;
mod types;

use log::info;

use crate::error::Error;
use crate::fetch::ApiClient;

pub use calendar::*;
pub use form::NewReservation;
pub use query::*;
pub use table::*;
pub use types::*;

/// Client for the reservation endpoints
///
/// Mutations never touch any cached list; callers reload afterwards.
#[derive(Clone)]
pub struct ReservationsClient {
    api: ApiClient,
}

impl ReservationsClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// List reservations for the reservation page
    pub async fn list(&self, query: &ReservationQuery) -> Result<Vec<Reservation>, Error> {
        if let Some(id) = query.get_id() {
            return Ok(vec![self.get(id).await?]);
        }
        let mut request = self.api.get("/reservas");
        for (key, value) in query.params() {
            request = request.query(key, &value);
        }
        request.execute().await
    }

    /// Every reservation, unfiltered
    pub async fn list_all(&self) -> Result<Vec<Reservation>, Error> {
        self.api.get("/reservas").execute().await
    }

    pub async fn get(&self, id: &str) -> Result<Reservation, Error> {
        self.api.get(&format!("/reservas/{}", id)).execute().await
    }

    /// Confirm a pending reservation
    pub async fn accept(&self, id: &str) -> Result<(), Error> {
        self.api
            .patch(&format!("/reservas/{}/aceptar", id))
            .execute_empty()
            .await?;
        info!("Reservation {} accepted", id);
        Ok(())
    }

    /// Reject a pending reservation
    pub async fn reject(&self, id: &str) -> Result<(), Error> {
        self.api
            .patch(&format!("/reservas/{}/rechazar", id))
            .execute_empty()
            .await?;
        info!("Reservation {} rejected", id);
        Ok(())
    }

    /// Update amount, commission, driver or flight
    pub async fn update(&self, id: &str, patch: &ReservationPatch) -> Result<(), Error> {
        self.api
            .patch(&format!("/reservas/{}", id))
            .json(patch)?
            .execute_empty()
            .await
    }

    /// Create a reservation on behalf of a customer. Nothing is sent if the
    /// form does not validate.
    pub async fn create(&self, reservation: &NewReservation) -> Result<(), Error> {
        reservation.validate()?;
        self.api
            .post("/reservas")
            .json(&form::CreateReservation {
                reservation,
                from_admin: true,
            })?
            .execute_empty()
            .await?;
        info!("Reservation for {} created", reservation.name);
        Ok(())
    }
}
