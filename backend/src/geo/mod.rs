//! Place aggregates on the map.
//!
//! Coordinates come from a fixed table of European countries. Partners
//! outside the table are dropped here and only here: they still count in the
//! aggregates, they just have nowhere to be drawn.

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::models::{Coordinate, HomeMarker, PartnerAggregate, PlottablePoint, Selection};

/// Country centroids, (name, latitude, longitude).
pub const COUNTRY_COORDS: [(&str, f64, f64); 26] = [
    ("Austria", 47.5162, 14.5501),
    ("Germany", 51.1657, 10.4515),
    ("France", 46.6034, 1.8883),
    ("Italy", 41.8719, 12.5674),
    ("Poland", 51.9194, 19.1451),
    ("Slovenia", 46.1512, 14.9955),
    ("Czech Republic", 49.8175, 15.4730),
    ("Hungary", 47.1625, 19.5033),
    ("Netherlands", 52.1326, 5.2913),
    ("Belgium", 50.5039, 4.4699),
    ("Switzerland", 46.8182, 8.2275),
    ("Spain", 40.4637, -3.7492),
    ("Slovakia", 48.6690, 19.6990),
    ("Croatia", 45.1000, 15.2000),
    ("Romania", 45.9432, 24.9668),
    ("Bulgaria", 42.7339, 25.4858),
    ("Sweden", 60.1282, 18.6435),
    ("Denmark", 56.2639, 9.5018),
    ("Greece", 39.0742, 21.8243),
    ("Portugal", 39.3999, -8.2245),
    ("Finland", 61.9241, 25.7482),
    ("Norway", 60.4720, 8.4689),
    ("Ireland", 53.4129, -8.2439),
    ("Estonia", 58.5953, 25.0136),
    ("Latvia", 56.8796, 24.6032),
    ("Lithuania", 55.1694, 23.8813),
];

static COORDINATES: Lazy<HashMap<&'static str, Coordinate>> = Lazy::new(|| {
    COUNTRY_COORDS
        .iter()
        .map(|&(name, lat, lon)| (name, Coordinate { lat, lon }))
        .collect()
});

/// Coordinate of a country, if it is in the table. Exact, case-sensitive.
pub fn lookup(country: &str) -> Option<Coordinate> {
    COORDINATES.get(country).copied()
}

/// Partner markers for every aggregate whose partner has a coordinate.
pub fn enrich(aggregates: &[PartnerAggregate]) -> Vec<PlottablePoint> {
    aggregates
        .iter()
        .filter_map(|aggregate| {
            let coord = lookup(&aggregate.partner)?;
            Some(PlottablePoint {
                country: aggregate.country.clone(),
                partner: aggregate.partner.clone(),
                lat: coord.lat,
                lon: coord.lon,
                text: hover_text(aggregate),
                color: aggregate.direction.color().to_string(),
                size: aggregate.marker_size,
                direction: aggregate.direction,
            })
        })
        .collect()
}

/// Distinct partners that [`enrich`] could not place, sorted.
pub fn unplotted_partners(aggregates: &[PartnerAggregate]) -> Vec<String> {
    let mut partners: Vec<String> = aggregates
        .iter()
        .filter(|a| lookup(&a.partner).is_none())
        .map(|a| a.partner.clone())
        .collect();
    partners.sort();
    partners.dedup();
    partners
}

/// Home coordinate of a reporting country.
pub fn lookup_home_marker(country: &str) -> Option<Coordinate> {
    lookup(country)
}

/// One marker per selected country that has a coordinate, in selection order.
pub fn home_markers(selection: &Selection) -> Vec<HomeMarker> {
    selection
        .countries()
        .iter()
        .filter_map(|country| {
            lookup_home_marker(country).map(|coord| HomeMarker {
                country: country.clone(),
                lat: coord.lat,
                lon: coord.lon,
            })
        })
        .collect()
}

/// `Partner<br>Export: 1,000 Kg<br>Import: 400 Kg<br>Balance: 600 Kg`
pub fn hover_text(aggregate: &PartnerAggregate) -> String {
    format!(
        "{}<br>Export: {} Kg<br>Import: {} Kg<br>Balance: {} Kg",
        aggregate.partner,
        format_thousands(aggregate.export_quantity),
        format_thousands(aggregate.import_quantity),
        format_thousands(aggregate.balance),
    )
}

/// Whole number with `,` thousands separators. Halves round to even.
pub fn format_thousands(value: Decimal) -> String {
    let rounded = value.round_dp(0);
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
