//! Editable reservation table with selection and export

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDate, TimeZone};
use log::{error, info};
use tokio::sync::RwLock;

use super::{Reservation, ReservationPatch, ReservationsClient};
use crate::error::Error;
use crate::export;

#[derive(Debug, Default)]
struct TableState {
    rows: Vec<Reservation>,
    loading: bool,
    editing: Option<(String, ReservationPatch)>,
    selection_mode: bool,
    selected: Vec<String>,
}

/// Full reservation table
#[derive(Clone)]
pub struct ReservationTable {
    client: ReservationsClient,
    state: Arc<RwLock<TableState>>,
}

impl ReservationTable {
    pub fn new(client: ReservationsClient) -> Self {
        Self {
            client,
            state: Arc::new(RwLock::new(TableState {
                loading: true,
                ..TableState::default()
            })),
        }
    }

    /// Reload all rows. On failure the current rows are kept.
    pub async fn load(&self) -> Result<usize, Error> {
        let result = self.client.list_all().await;
        let mut state = self.state.write().await;
        state.loading = false;
        match result {
            Ok(rows) => {
                state.rows = rows;
                Ok(state.rows.len())
            }
            Err(e) => {
                error!("Could not load reservations: {}", e);
                Err(e)
            }
        }
    }

    pub async fn rows(&self) -> Vec<Reservation> {
        self.state.read().await.rows.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    /// Start editing a row; the draft holds its current operational fields
    pub async fn begin_edit(&self, id: &str) -> Option<ReservationPatch> {
        let mut state = self.state.write().await;
        let draft = state
            .rows
            .iter()
            .find(|r| r.id == id)
            .map(ReservationPatch::from_reservation)?;
        state.editing = Some((id.to_string(), draft.clone()));
        Some(draft)
    }

    /// Row being edited and its draft
    pub async fn editing(&self) -> Option<(String, ReservationPatch)> {
        self.state.read().await.editing.clone()
    }

    /// Replace the draft of the row being edited
    pub async fn set_draft(&self, draft: ReservationPatch) -> bool {
        match self.state.write().await.editing.as_mut() {
            Some((_, current)) => {
                *current = draft;
                true
            }
            None => false,
        }
    }

    pub async fn cancel_edit(&self) {
        self.state.write().await.editing = None;
    }

    /// Send the draft and reload. The edit stays open if the update fails.
    pub async fn save(&self) -> Result<(), Error> {
        let (id, draft) = self
            .editing()
            .await
            .ok_or_else(|| Error::general("no reservation is being edited"))?;
        self.client.update(&id, &draft).await?;
        self.state.write().await.editing = None;
        if let Err(e) = self.load().await {
            error!("Could not reload reservations: {}", e);
        }
        Ok(())
    }

    pub async fn set_selection_mode(&self, enabled: bool) {
        let mut state = self.state.write().await;
        state.selection_mode = enabled;
        if !enabled {
            state.selected.clear();
        }
    }

    pub async fn is_selection_mode(&self) -> bool {
        self.state.read().await.selection_mode
    }

    /// Select or deselect one row. Returns whether it is now selected.
    pub async fn toggle(&self, id: &str) -> bool {
        let mut state = self.state.write().await;
        if let Some(pos) = state.selected.iter().position(|s| s == id) {
            state.selected.remove(pos);
            false
        } else {
            state.selected.push(id.to_string());
            true
        }
    }

    /// Select every row, or clear the selection if all are already selected
    pub async fn toggle_all(&self) {
        let mut state = self.state.write().await;
        let all_selected = !state.rows.is_empty()
            && state.rows.iter().all(|r| state.selected.contains(&r.id));
        let selected = if all_selected {
            Vec::new()
        } else {
            state.rows.iter().map(|r| r.id.clone()).collect()
        };
        state.selected = selected;
    }

    pub async fn clear_selection(&self) {
        self.state.write().await.selected.clear();
    }

    pub async fn selected(&self) -> Vec<String> {
        self.state.read().await.selected.clone()
    }

    /// Write the selected rows (every row when nothing is selected) to
    /// `Reservas_<date>.xlsx` inside `dir`.
    pub async fn export<Tz>(&self, dir: &Path, today: NaiveDate, tz: &Tz) -> Result<PathBuf, Error>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let state = self.state.read().await;
        let selection = if state.selection_mode {
            Some(state.selected.as_slice())
        } else {
            None
        };
        let rows = export::export_rows(&state.rows, selection, tz);
        let path = dir.join(export::export_file_name(today));
        export::write_workbook(&rows, &path)?;
        info!("Exported {} reservations to {}", rows.len(), path.display());
        Ok(path)
    }
}
