//! Spreadsheet export of reservations

use std::fmt::Display;
use std::path::Path;

use chrono::{NaiveDate, TimeZone};
use log::debug;
use rust_xlsxwriter::{Format, Workbook};

use crate::error::Error;
use crate::reservations::Reservation;

/// Sheet name of the exported workbook
pub const SHEET_NAME: &str = "Reservas";

/// Column headers, in order
pub const HEADERS: [&str; 11] = [
    "Fecha",
    "Hora",
    "Cliente",
    "Teléfono",
    "Destino",
    "Vuelo",
    "Pasajeros",
    "Monto",
    "Comisión",
    "Estado",
    "Chofer",
];

const MISSING: &str = "-";

enum Cell<'a> {
    Text(&'a str),
    Number(f64),
}

/// One exported line
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub date: String,
    pub time: String,
    pub client: String,
    pub phone: String,
    pub destination: String,
    pub flight: String,
    pub passengers: u32,
    pub amount: String,
    pub commission: String,
    pub status: String,
    pub driver: String,
}

impl ExportRow {
    /// Render a reservation with dates in `tz`
    pub fn from_reservation<Tz>(reservation: &Reservation, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let local = reservation.service_at.with_timezone(tz);
        Self {
            date: local.format("%d/%m/%Y").to_string(),
            time: local.format("%H:%M").to_string(),
            client: reservation.name.clone(),
            phone: reservation.phone.clone(),
            destination: reservation.destination.clone(),
            flight: reservation.flight().unwrap_or(MISSING).to_string(),
            passengers: reservation.passengers,
            amount: format_currency(reservation.amount),
            commission: format_currency(reservation.commission),
            status: reservation.status.to_string(),
            driver: reservation.driver().unwrap_or(MISSING).to_string(),
        }
    }

    fn cells(&self) -> [Cell<'_>; 11] {
        [
            Cell::Text(&self.date),
            Cell::Text(&self.time),
            Cell::Text(&self.client),
            Cell::Text(&self.phone),
            Cell::Text(&self.destination),
            Cell::Text(&self.flight),
            Cell::Number(self.passengers as f64),
            Cell::Text(&self.amount),
            Cell::Text(&self.commission),
            Cell::Text(&self.status),
            Cell::Text(&self.driver),
        ]
    }
}

/// Rows to export.
///
/// Without a selection (or with an empty one) every reservation is exported
/// in list order. Otherwise exactly the selected ids, still in list order.
pub fn export_rows<Tz>(
    reservations: &[Reservation],
    selection: Option<&[String]>,
    tz: &Tz,
) -> Vec<ExportRow>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let selection = selection.filter(|ids| !ids.is_empty());
    reservations
        .iter()
        .filter(|r| selection.map_or(true, |ids| ids.contains(&r.id)))
        .map(|r| ExportRow::from_reservation(r, tz))
        .collect()
}

/// `$1,234.50`, or `-` when there is no amount
pub fn format_currency(value: Option<f64>) -> String {
    let value = match value {
        Some(v) if v.is_finite() => v,
        _ => return MISSING.to_string(),
    };
    let cents = (value.abs() * 100.0).round() as u64;
    let digits = (cents / 100).to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

/// `Reservas_<d-m-Y>.xlsx`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("Reservas_{}.xlsx", date.format("%-d-%-m-%Y"))
}

/// Write `rows` to a single-sheet workbook at `path`
pub fn write_workbook(rows: &[ExportRow], path: &Path) -> Result<(), Error> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, title) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &header)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let line = (i + 1) as u32;
        for (col, cell) in row.cells().iter().enumerate() {
            match cell {
                Cell::Text(text) => sheet.write_string(line, col as u16, *text)?,
                Cell::Number(value) => sheet.write_number(line, col as u16, *value)?,
            };
        }
    }

    workbook.save(path)?;
    debug!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}
