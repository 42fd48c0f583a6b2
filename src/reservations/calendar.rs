//! Calendar of reservations with periodic refresh

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, TimeZone, Utc};
use log::{debug, error};
use tokio::sync::RwLock;

use super::{Reservation, ReservationStatus, ReservationsClient};
use crate::error::Error;
use crate::poll::PollHandle;

/// Calendar layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarView {
    Day,
    /// Monday to Sunday
    Week,
    Month,
}

impl CalendarView {
    /// Half-open date range `[start, end)` shown around `anchor`
    pub fn range(&self, anchor: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            CalendarView::Day => (anchor, anchor + Days::new(1)),
            CalendarView::Week => {
                let start = anchor - Days::new(anchor.weekday().num_days_from_monday() as u64);
                (start, start + Days::new(7))
            }
            CalendarView::Month => {
                let start = anchor.with_day(1).unwrap_or(anchor);
                (start, start + Months::new(1))
            }
        }
    }
}

/// Fill and border colour of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventColors {
    pub background: &'static str,
    pub border: &'static str,
}

impl ReservationStatus {
    pub fn colors(&self) -> EventColors {
        match self {
            ReservationStatus::Confirmed => EventColors {
                background: "#8BC34A",
                border: "#7CB342",
            },
            ReservationStatus::Rejected => EventColors {
                background: "#EF4444",
                border: "#DC2626",
            },
            ReservationStatus::Pending => EventColors {
                background: "#FFA500",
                border: "#FF8C00",
            },
        }
    }
}

/// A reservation placed on the calendar
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub status: ReservationStatus,
    pub colors: EventColors,
}

impl From<&Reservation> for CalendarEvent {
    fn from(reservation: &Reservation) -> Self {
        Self {
            id: reservation.id.clone(),
            title: format!(
                "{} - {} → {}",
                reservation.name, reservation.pickup, reservation.destination
            ),
            start: reservation.service_at,
            status: reservation.status,
            colors: reservation.status.colors(),
        }
    }
}

/// Reservation calendar state
#[derive(Clone)]
pub struct Calendar {
    client: ReservationsClient,
    reservations: Arc<RwLock<Vec<Reservation>>>,
}

impl Calendar {
    pub fn new(client: ReservationsClient) -> Self {
        Self {
            client,
            reservations: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Reload every reservation. On failure the loaded list is kept.
    pub async fn load(&self) -> Result<usize, Error> {
        let reservations = self.client.list_all().await?;
        let count = reservations.len();
        *self.reservations.write().await = reservations;
        debug!("Calendar loaded {} reservations", count);
        Ok(count)
    }

    pub async fn reservations(&self) -> Vec<Reservation> {
        self.reservations.read().await.clone()
    }

    pub async fn find(&self, id: &str) -> Option<Reservation> {
        self.reservations.read().await.iter().find(|r| r.id == id).cloned()
    }

    pub async fn events(&self) -> Vec<CalendarEvent> {
        self.reservations.read().await.iter().map(CalendarEvent::from).collect()
    }

    /// Events whose local start date falls in the view around `anchor`
    pub async fn events_in_view<Tz: TimeZone>(
        &self,
        view: CalendarView,
        anchor: NaiveDate,
        tz: &Tz,
    ) -> Vec<CalendarEvent> {
        let (start, end) = view.range(anchor);
        let mut events: Vec<_> = self
            .events()
            .await
            .into_iter()
            .filter(|event| {
                let day = event.start.with_timezone(tz).date_naive();
                day >= start && day < end
            })
            .collect();
        events.sort_by_key(|event| event.start);
        events
    }

    /// Accept, then reload the calendar
    pub async fn accept(&self, id: &str) -> Result<(), Error> {
        self.client.accept(id).await?;
        self.reload_after_change().await;
        Ok(())
    }

    /// Reject, then reload the calendar
    pub async fn reject(&self, id: &str) -> Result<(), Error> {
        self.client.reject(id).await?;
        self.reload_after_change().await;
        Ok(())
    }

    async fn reload_after_change(&self) {
        if let Err(e) = self.load().await {
            error!("Could not reload reservations: {}", e);
        }
    }

    /// Load now and then every `period` until the handle is dropped
    pub fn spawn_refresh(&self, period: Duration) -> PollHandle {
        let calendar = self.clone();
        PollHandle::spawn(period, move || {
            let calendar = calendar.clone();
            async move {
                if let Err(e) = calendar.load().await {
                    error!("Could not load reservations: {}", e);
                }
            }
        })
    }

    /// `count` consecutive days starting at `today`, for the day strip
    pub fn upcoming_days(today: NaiveDate, count: usize) -> Vec<NaiveDate> {
        today.iter_days().take(count).collect()
    }
}
