//! The three collections managed from the admin console, plus the field
//! checks their drafts share.

pub mod cursos;
pub mod docentes;
pub mod ofertas;

use chrono::NaiveDate;
use validator::ValidationError;

pub use cursos::{CursoDraft, CursoPayload, COURSE_TYPES};
pub use docentes::{DocenteDraft, DocentePayload};
pub use ofertas::{OfertaDraft, OfertaPayload};

/// Format of every date field, as produced by `<input type="date">`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

pub fn positive_integer(value: &str) -> Result<(), ValidationError> {
    match parse_positive(value) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("positive_integer")),
    }
}

pub fn date(value: &str) -> Result<(), ValidationError> {
    match parse_date(value) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("date")),
    }
}

/// Empty is fine; anything else must be a date
pub fn optional_date(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Ok(());
    }
    date(value)
}

pub fn parse_positive(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok().filter(|n| *n > 0)
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time part the backend
/// may append (`2025-03-01T00:00:00.000Z`).
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let day = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(day, DATE_FORMAT).ok()
}

/// Date as a form input value
pub fn date_input(value: &str) -> String {
    match parse_date(value) {
        Some(day) => day.format(DATE_FORMAT).to_string(),
        None => value.to_string(),
    }
}
