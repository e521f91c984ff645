//! CSV export of qualified businesses
//!
//! Column set is fixed; callers pick a subset (all columns by default):
//! Name, Address, Phone, Website, Website Accessible, Grade Score,
//! Distance (km), Google Maps URL, Place ID

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::GradedBusiness;

/// Rendered in place of a missing phone number or website
pub const ABSENT: &str = "N/A";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("At least one CSV column must be selected")]
    NoColumns,

    #[error("Unknown CSV column: {0}")]
    UnknownColumn(String),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to flush CSV: {0}")]
    Io(#[from] std::io::Error),
}

/// A selectable CSV column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExportColumn {
    Name,
    Address,
    Phone,
    Website,
    WebsiteAccessible,
    GradeScore,
    DistanceKm,
    GoogleMapsUrl,
    PlaceId,
}

impl ExportColumn {
    /// Every column, in export order
    pub const ALL: [ExportColumn; 9] = [
        ExportColumn::Name,
        ExportColumn::Address,
        ExportColumn::Phone,
        ExportColumn::Website,
        ExportColumn::WebsiteAccessible,
        ExportColumn::GradeScore,
        ExportColumn::DistanceKm,
        ExportColumn::GoogleMapsUrl,
        ExportColumn::PlaceId,
    ];

    /// Header text for this column
    pub fn label(self) -> &'static str {
        match self {
            ExportColumn::Name => "Name",
            ExportColumn::Address => "Address",
            ExportColumn::Phone => "Phone",
            ExportColumn::Website => "Website",
            ExportColumn::WebsiteAccessible => "Website Accessible",
            ExportColumn::GradeScore => "Grade Score",
            ExportColumn::DistanceKm => "Distance (km)",
            ExportColumn::GoogleMapsUrl => "Google Maps URL",
            ExportColumn::PlaceId => "Place ID",
        }
    }

    fn render(self, row: &GradedBusiness) -> String {
        match self {
            ExportColumn::Name => row.name.clone(),
            ExportColumn::Address => row.address.clone(),
            ExportColumn::Phone => row.details.phone.clone().unwrap_or_else(|| ABSENT.to_string()),
            ExportColumn::Website => row.details.website.clone().unwrap_or_else(|| ABSENT.to_string()),
            ExportColumn::WebsiteAccessible => {
                let accessible = if row.website_accessible { "Yes" } else { "No" };
                accessible.to_string()
            }
            ExportColumn::GradeScore => row.score.to_string(),
            ExportColumn::DistanceKm => format!("{:.2}", row.distance_km),
            ExportColumn::GoogleMapsUrl => row.maps_url(),
            ExportColumn::PlaceId => row.place_id.clone(),
        }
    }
}

impl fmt::Display for ExportColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExportColumn {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ExportColumn::ALL
            .into_iter()
            .find(|column| column.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ExportError::UnknownColumn(wanted.to_string()))
    }
}

/// Parse a column selection; `None` selects every column
///
/// Columns keep the order given. An explicitly empty list is an error.
pub fn parse_columns(labels: Option<&[String]>) -> Result<Vec<ExportColumn>, ExportError> {
    let Some(labels) = labels else {
        return Ok(ExportColumn::ALL.to_vec());
    };
    if labels.is_empty() {
        return Err(ExportError::NoColumns);
    }
    labels.iter().map(|label| label.parse()).collect()
}

/// Write rows as CSV with a header line of the selected columns
pub fn write_csv<W: Write>(
    rows: &[GradedBusiness],
    columns: &[ExportColumn],
    writer: W,
) -> Result<(), ExportError> {
    if columns.is_empty() {
        return Err(ExportError::NoColumns);
    }

    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(columns.iter().map(|column| column.label()))?;

    for row in rows {
        wtr.write_record(columns.iter().map(|column| column.render(row)))?;
    }

    wtr.flush()?;
    Ok(())
}

/// Convenience wrapper returning the CSV document as a string
pub fn to_csv_string(rows: &[GradedBusiness], columns: &[ExportColumn]) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_csv(rows, columns, &mut buffer)?;
    // csv only writes the UTF-8 text it was given
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
