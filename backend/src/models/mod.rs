//! Domain models for the petmap pipeline.
//!
//! - [`TradeRecord`] - one validated row of the trade statistics sheet
//! - [`TradeFlow`] - Export or Import, seen from the reporting country
//! - [`PartnerAggregate`] - merged import/export totals for one partner
//! - [`Direction`] - sign of the trade balance
//! - [`Selection`] - non-empty set of reporting countries picked by the user
//! - [`PlottablePoint`] / [`HomeMarker`] - what the renderer draws

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Trade Flow
// =============================================================================

/// Direction of goods movement from the reporting country's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeFlow {
    Export,
    Import,
}

impl TradeFlow {
    /// Parse the raw `TradeFlow` cell. Only the exact labels are accepted;
    /// "Re-Export", "export", " Export " and friends are not trade flows we
    /// aggregate.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Export" => Some(TradeFlow::Export),
            "Import" => Some(TradeFlow::Import),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TradeFlow::Export => "Export",
            TradeFlow::Import => "Import",
        }
    }
}

impl fmt::Display for TradeFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Trade Record
// =============================================================================

/// One row of the input sheet that survived load-time filtering.
///
/// `country` is the sheet's `Reporter` column under its canonical name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    pub country: String,
    pub partner: String,
    pub trade_flow: TradeFlow,
    /// Physical quantity, in Kg for this dataset.
    pub quantity: Decimal,
    /// Monetary value in thousands of USD.
    pub trade_value: Decimal,
}

// =============================================================================
// Balance Direction
// =============================================================================

/// Sign of a partner's trade balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    ExportSurplus,
    ImportSurplus,
    Balanced,
}

impl Direction {
    /// Classify a balance. Exactly zero is `Balanced`; there is no tolerance.
    pub fn from_balance(balance: Decimal) -> Self {
        if balance > Decimal::ZERO {
            Direction::ExportSurplus
        } else if balance < Decimal::ZERO {
            Direction::ImportSurplus
        } else {
            Direction::Balanced
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Direction::ExportSurplus => "Export Surplus",
            Direction::ImportSurplus => "Import Surplus",
            Direction::Balanced => "Balanced",
        }
    }

    /// Marker color used by the map.
    pub fn color(&self) -> &'static str {
        match self {
            Direction::ExportSurplus => "green",
            Direction::ImportSurplus => "red",
            Direction::Balanced => "gray",
        }
    }
}

// =============================================================================
// Partner Aggregate
// =============================================================================

/// Import and export totals for one (country, partner) pair.
///
/// Sides with no records are zero, never absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerAggregate {
    pub country: String,
    pub partner: String,
    pub import_quantity: Decimal,
    pub import_value: Decimal,
    pub export_quantity: Decimal,
    pub export_value: Decimal,
    /// `export_quantity - import_quantity`
    pub balance: Decimal,
    pub direction: Direction,
    /// `export_quantity + import_quantity`
    pub total_trade: Decimal,
    /// `sqrt(total_trade) / 100`, a visual scale only.
    pub marker_size: f64,
}

// =============================================================================
// Selection
// =============================================================================

/// Reporting countries picked by the user, in pick order, without duplicates.
///
/// Cannot be empty: an empty pick is the "awaiting selection" state and never
/// reaches aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection(Vec<String>);

impl Selection {
    /// Build a selection, returning `None` when nothing was picked.
    pub fn new<I, S>(countries: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut picked: Vec<String> = Vec::new();
        for country in countries {
            let country = country.into();
            if !picked.contains(&country) {
                picked.push(country);
            }
        }

        if picked.is_empty() {
            None
        } else {
            Some(Self(picked))
        }
    }

    pub fn countries(&self) -> &[String] {
        &self.0
    }

    pub fn contains(&self, country: &str) -> bool {
        self.0.iter().any(|c| c == country)
    }

    /// Countries joined for display, e.g. in the map title.
    pub fn joined(&self) -> String {
        self.0.join(", ")
    }
}

// =============================================================================
// Geography
// =============================================================================

/// Latitude/longitude in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// A partner marker ready for the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlottablePoint {
    pub country: String,
    pub partner: String,
    pub lat: f64,
    pub lon: f64,
    /// Hover label, lines separated by `<br>`.
    pub text: String,
    pub color: String,
    pub size: f64,
    pub direction: Direction,
}

/// Marker at a selected reporting country's own location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeMarker {
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}
