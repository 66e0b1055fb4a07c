//! Attendee list export (CSV).

use csv::{QuoteStyle, WriterBuilder};
use thiserror::Error;

use crate::Rsvp;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";
const MISSING: &str = "N/A";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("csv buffer flush failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv output was not utf-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Render RSVPs as CSV, every field quoted, in the order given.
pub fn attendee_csv(rsvps: &[Rsvp]) -> Result<String, ExportError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(Vec::new());

    writer.write_record(["Name", "Email", "RSVP Date"])?;
    for rsvp in rsvps {
        let date = rsvp.timestamp.format(DATE_FORMAT).to_string();
        writer.write_record([
            or_missing(&rsvp.attendee_name),
            or_missing(&rsvp.attendee_email),
            date.as_str(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    tracing::debug!(rows = rsvps.len(), bytes = bytes.len(), "attendee csv rendered");
    Ok(String::from_utf8(bytes)?)
}

fn or_missing(value: &str) -> &str {
    if value.trim().is_empty() { MISSING } else { value }
}

/// Download file name derived from the event title.
pub fn export_filename(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    format!("{stem}_attendees.csv")
}
