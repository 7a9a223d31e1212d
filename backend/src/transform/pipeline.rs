//! One selection change, end to end.
//!
//! ```text
//! countries ──▶ Selection ──▶ validate ──▶ aggregate ──▶ enrich ──▶ BalanceMap
//!     │            (empty)
//!     └──────────────┴──▶ AwaitingSelection (prompt + available countries)
//! ```
//!
//! Nothing here is cached: the dataset is the only shared state and every
//! view is rebuilt from it.
//!
//! # Example
//!
//! ```rust,ignore
//! use petmap::cache::DatasetCache;
//! use petmap::loader::DataSource;
//! use petmap::transform::pipeline::{build_map_cached, MapView};
//!
//! let cache = DatasetCache::new(DataSource::new("Allcountries_export_WITS.xlsx", "By-HS6Product"));
//! if let MapView::Ready(map) = build_map_cached(&cache, &["Austria"])? {
//!     println!("{} partners, {} on the map", map.aggregates.len(), map.points.len());
//! }
//! ```

use serde::Serialize;
use serde_json::Value;

use crate::api::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::cache::DatasetCache;
use crate::error::PipelineResult;
use crate::geo;
use crate::loader::Dataset;
use crate::models::{HomeMarker, PartnerAggregate, PlottablePoint, Selection};
use crate::render;
use crate::transform::aggregator::aggregate;

/// What the dashboard shows for a given pick of countries.
#[derive(Debug, Clone, PartialEq)]
pub enum MapView {
    /// Nothing picked yet. Not an error.
    AwaitingSelection {
        prompt: &'static str,
        countries: Vec<String>,
    },
    Ready(BalanceMap),
}

/// Everything needed to draw one map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceMap {
    pub title: String,
    pub selection: Selection,
    /// Every partner, including ones the map cannot place.
    pub aggregates: Vec<PartnerAggregate>,
    pub points: Vec<PlottablePoint>,
    pub home_markers: Vec<HomeMarker>,
    /// Partners missing from the coordinate table.
    pub unplotted: Vec<String>,
}

impl BalanceMap {
    pub fn figure(&self) -> Value {
        render::figure(&self.title, &self.points, &self.home_markers)
    }
}

/// Build the view for the picked countries.
///
/// Unknown countries are rejected; an empty pick yields
/// [`MapView::AwaitingSelection`].
pub fn build_map<S: AsRef<str>>(dataset: &Dataset, countries: &[S]) -> PipelineResult<MapView> {
    let Some(selection) = Selection::new(countries.iter().map(|c| c.as_ref().to_string())) else {
        log_info("No countries selected");
        return Ok(MapView::AwaitingSelection {
            prompt: render::SELECTION_PROMPT,
            countries: dataset.countries().to_vec(),
        });
    };

    dataset.validate_selection(&selection)?;
    log_info(format!("🌍 Selected: {}", selection.joined()));

    let aggregates = aggregate(dataset.records(), &selection)?;
    log_success(format!("{} partner aggregates", aggregates.len()));

    let points = geo::enrich(&aggregates);
    let unplotted = geo::unplotted_partners(&aggregates);
    log_success(format!("{} partners placed on the map", points.len()));
    if !unplotted.is_empty() {
        log_warning(format!("{} partners have no coordinates", unplotted.len()));
        for partner in &unplotted {
            log_info_indent(partner.as_str(), 1);
        }
    }

    let home_markers = geo::home_markers(&selection);

    Ok(MapView::Ready(BalanceMap {
        title: render::map_title(&selection),
        selection,
        aggregates,
        points,
        home_markers,
        unplotted,
    }))
}

/// Same as [`build_map`], loading the dataset on first use.
pub fn build_map_cached<S: AsRef<str>>(cache: &DatasetCache, countries: &[S]) -> PipelineResult<MapView> {
    let dataset = cache.get()?;
    build_map(&dataset, countries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LoadError, PipelineError, SelectionError};
    use crate::models::{Direction, TradeFlow, TradeRecord};
    use rust_decimal::Decimal;

    fn record(country: &str, partner: &str, flow: TradeFlow, quantity: i64) -> TradeRecord {
        TradeRecord {
            country: country.into(),
            partner: partner.into(),
            trade_flow: flow,
            quantity: Decimal::from(quantity),
            trade_value: Decimal::ONE,
        }
    }

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            record("Austria", "Germany", TradeFlow::Export, 1000),
            record("Austria", "Germany", TradeFlow::Import, 400),
            record("Austria", "China", TradeFlow::Import, 70),
            record("Slovenia", "Italy", TradeFlow::Export, 5),
        ])
    }

    #[test]
    fn test_empty_selection_awaits() {
        let view = build_map::<&str>(&dataset(), &[]).unwrap();

        match view {
            MapView::AwaitingSelection { prompt, countries } => {
                assert_eq!(prompt, "Select one or more countries to analyze");
                assert_eq!(countries, vec!["Austria", "Slovenia"]);
            }
            MapView::Ready(_) => panic!("expected awaiting selection"),
        }
    }

    #[test]
    fn test_ready_view() {
        let MapView::Ready(map) = build_map(&dataset(), &["Austria"]).unwrap() else {
            panic!("expected a map");
        };

        assert_eq!(map.title, "PET Trade Balance – Austria");
        assert_eq!(map.aggregates.len(), 2);
        assert_eq!(map.points.len(), 1);
        assert_eq!(map.points[0].partner, "Germany");
        assert_eq!(map.points[0].direction, Direction::ExportSurplus);
        assert_eq!(map.unplotted, vec!["China"]);
        assert_eq!(map.home_markers.len(), 1);

        let figure = map.figure();
        assert_eq!(figure["data"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_unknown_country_rejected() {
        let err = build_map(&dataset(), &["Atlantis"]).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Selection(SelectionError::UnknownCountry(ref c)) if c == "Atlantis"
        ));
    }

    #[test]
    fn test_load_failure_propagates() {
        let cache = DatasetCache::with_loader(|| Err(LoadError::MissingColumn("TradeFlow".into())));
        let err = build_map_cached(&cache, &["Austria"]).unwrap_err();
        assert!(matches!(err, PipelineError::Load(LoadError::MissingColumn(_))));
    }
}
