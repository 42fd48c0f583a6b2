//! Filters for the reservation list

use url::form_urlencoded;

use super::{Reservation, ReservationStatus};
use crate::error::Error;

/// Filter for the reservation list page.
///
/// A search term wins over the status filter. Without either, only pending
/// reservations are listed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReservationQuery {
    status: Option<ReservationStatus>,
    search: Option<String>,
    id: Option<String>,
}

impl ReservationQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by status
    pub fn status(mut self, status: ReservationStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Free-text search; blank terms are ignored
    pub fn search(mut self, term: &str) -> Self {
        let term = term.trim();
        self.search = if term.is_empty() {
            None
        } else {
            Some(term.to_string())
        };
        self
    }

    /// Deep link to a single reservation
    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string()).filter(|id| !id.is_empty());
        self
    }

    /// Parse the page's query string (`estado`, `buscar`, `id`)
    pub fn from_query_string(query: &str) -> Result<Self, Error> {
        let mut result = Self::new();
        for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            match key.as_ref() {
                "estado" if !value.is_empty() => result = result.status(value.parse()?),
                "buscar" => result = result.search(&value),
                "id" => result = result.id(&value),
                _ => {}
            }
        }
        Ok(result)
    }

    pub fn get_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn get_search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Status filter actually applied, if any
    pub fn effective_status(&self) -> Option<ReservationStatus> {
        if self.search.is_some() {
            None
        } else {
            Some(self.status.unwrap_or(ReservationStatus::Pending))
        }
    }

    /// Query parameters for `GET /reservas`
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(search) = &self.search {
            params.push(("buscar", search.clone()));
        }
        if let Some(status) = self.effective_status() {
            params.push(("estado", status.as_str().to_string()));
        }
        params
    }

    /// Apply the same filter to an already loaded list
    pub fn matches(&self, reservation: &Reservation) -> bool {
        if let Some(id) = &self.id {
            return &reservation.id == id;
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            return [
                Some(reservation.name.as_str()),
                Some(reservation.phone.as_str()),
                Some(reservation.email.as_str()),
                Some(reservation.pickup.as_str()),
                Some(reservation.destination.as_str()),
                reservation.flight(),
                reservation.driver(),
            ]
            .iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle));
        }
        self.effective_status() == Some(reservation.status)
    }

    /// Filter a loaded list, keeping its order
    pub fn apply<'a>(&self, reservations: &'a [Reservation]) -> Vec<&'a Reservation> {
        reservations.iter().filter(|r| self.matches(r)).collect()
    }
}
