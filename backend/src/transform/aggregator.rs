//! Per-partner trade balance for the selected reporting countries.
//!
//! ```text
//! records (selected countries)
//!   ├── Export rows ── group by (Country, Partner) ──┐
//!   │                                                ├── full outer merge ── derive
//!   └── Import rows ── group by (Country, Partner) ──┘     (zero fill)      balance,
//!                                                                           direction,
//!                                                                           total, size
//! ```
//!
//! Grouping keys are ordered, so the output is sorted by (Country, Partner)
//! and independent of input row order. Sums are exact decimals, which keeps
//! the `Balanced` boundary an exact comparison.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{AggregateError, AggregateResult};
use crate::models::{Direction, PartnerAggregate, Selection, TradeFlow, TradeRecord};

/// (Country, Partner)
pub type PairKey = (String, String);

/// Summed quantity and value for one flow of one pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlowTotals {
    pub quantity: Decimal,
    pub value: Decimal,
}

/// Aggregate the records of the selected countries into one row per partner.
pub fn aggregate(
    records: &[TradeRecord],
    selection: &Selection,
) -> AggregateResult<Vec<PartnerAggregate>> {
    let selected: Vec<&TradeRecord> = records
        .iter()
        .filter(|r| selection.contains(&r.country))
        .collect();

    let exports = group_flow(selected.iter().copied(), TradeFlow::Export)?;
    let imports = group_flow(selected.iter().copied(), TradeFlow::Import)?;

    merge_outer(&exports, &imports)
}

/// Sum quantity and value per (Country, Partner) for one trade flow.
pub fn group_flow<'a, I>(
    records: I,
    flow: TradeFlow,
) -> AggregateResult<BTreeMap<PairKey, FlowTotals>>
where
    I: IntoIterator<Item = &'a TradeRecord>,
{
    let mut groups: BTreeMap<PairKey, FlowTotals> = BTreeMap::new();

    for record in records.into_iter().filter(|r| r.trade_flow == flow) {
        let totals = groups
            .entry((record.country.clone(), record.partner.clone()))
            .or_default();
        let (country, partner) = (&record.country, &record.partner);
        totals.quantity = checked(totals.quantity.checked_add(record.quantity), country, partner)?;
        totals.value = checked(totals.value.checked_add(record.trade_value), country, partner)?;
    }

    Ok(groups)
}

fn checked(sum: Option<Decimal>, country: &str, partner: &str) -> AggregateResult<Decimal> {
    sum.ok_or_else(|| AggregateError::Overflow {
        country: country.to_string(),
        partner: partner.to_string(),
    })
}

/// Full outer merge of the export and import groups.
///
/// Every key of either side appears exactly once; the absent side is zero.
pub fn merge_outer(
    exports: &BTreeMap<PairKey, FlowTotals>,
    imports: &BTreeMap<PairKey, FlowTotals>,
) -> AggregateResult<Vec<PartnerAggregate>> {
    let keys: BTreeSet<&PairKey> = exports.keys().chain(imports.keys()).collect();

    keys.into_iter()
        .map(|key| {
            let export = exports.get(key).copied().unwrap_or_default();
            let import = imports.get(key).copied().unwrap_or_default();
            derive(&key.0, &key.1, export, import)
        })
        .collect()
}

/// Build the aggregate row and its derived columns.
pub fn derive(
    country: &str,
    partner: &str,
    export: FlowTotals,
    import: FlowTotals,
) -> AggregateResult<PartnerAggregate> {
    let balance = checked(export.quantity.checked_sub(import.quantity), country, partner)?;
    let total_trade = checked(export.quantity.checked_add(import.quantity), country, partner)?;

    Ok(PartnerAggregate {
        country: country.to_string(),
        partner: partner.to_string(),
        import_quantity: import.quantity,
        import_value: import.value,
        export_quantity: export.quantity,
        export_value: export.value,
        balance,
        direction: Direction::from_balance(balance),
        total_trade,
        marker_size: marker_size(total_trade),
    })
}

/// `sqrt(total) / 100`. Negative totals (only possible with negative input
/// quantities) size as zero.
pub fn marker_size(total_trade: Decimal) -> f64 {
    total_trade
        .to_f64()
        .map(|t| t.max(0.0).sqrt() / 100.0)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn record(country: &str, partner: &str, flow: TradeFlow, quantity: &str, value: &str) -> TradeRecord {
        TradeRecord {
            country: country.into(),
            partner: partner.into(),
            trade_flow: flow,
            quantity: dec(quantity),
            trade_value: dec(value),
        }
    }

    fn austria() -> Selection {
        Selection::new(["Austria"]).unwrap()
    }

    #[test]
    fn test_export_surplus_scenario() {
        let records = vec![
            record("Austria", "Germany", TradeFlow::Export, "1000", "20"),
            record("Austria", "Germany", TradeFlow::Import, "400", "8"),
        ];

        let rows = aggregate(&records, &austria()).unwrap();

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.export_quantity, dec("1000"));
        assert_eq!(row.import_quantity, dec("400"));
        assert_eq!(row.export_value, dec("20"));
        assert_eq!(row.import_value, dec("8"));
        assert_eq!(row.balance, dec("600"));
        assert_eq!(row.total_trade, dec("1400"));
        assert_eq!(row.direction, Direction::ExportSurplus);
    }

    #[test]
    fn test_balanced_scenario() {
        let records = vec![
            record("Austria", "Germany", TradeFlow::Export, "400", "1"),
            record("Austria", "Germany", TradeFlow::Import, "400", "1"),
        ];

        let rows = aggregate(&records, &austria()).unwrap();

        assert_eq!(rows[0].balance, Decimal::ZERO);
        assert_eq!(rows[0].direction, Direction::Balanced);
    }

    #[test]
    fn test_decimal_sums_cancel_exactly() {
        // 0.1 + 0.2 == 0.3 holds for decimals, not for f64
        let records = vec![
            record("Austria", "Italy", TradeFlow::Export, "0.1", "0"),
            record("Austria", "Italy", TradeFlow::Export, "0.2", "0"),
            record("Austria", "Italy", TradeFlow::Import, "0.3", "0"),
        ];

        let rows = aggregate(&records, &austria()).unwrap();
        assert_eq!(rows[0].direction, Direction::Balanced);
    }

    #[test]
    fn test_import_surplus_and_sums() {
        let records = vec![
            record("Austria", "France", TradeFlow::Import, "250", "5"),
            record("Austria", "France", TradeFlow::Import, "250", "5"),
            record("Austria", "France", TradeFlow::Export, "100", "2"),
        ];

        let row = &aggregate(&records, &austria()).unwrap()[0];
        assert_eq!(row.import_quantity, dec("500"));
        assert_eq!(row.import_value, dec("10"));
        assert_eq!(row.balance, dec("-400"));
        assert_eq!(row.direction, Direction::ImportSurplus);
    }

    #[test]
    fn test_one_sided_pairs_zero_filled() {
        let records = vec![
            record("Austria", "Germany", TradeFlow::Export, "10", "1"),
            record("Austria", "Japan", TradeFlow::Import, "30", "3"),
        ];

        let rows = aggregate(&records, &austria()).unwrap();
        assert_eq!(rows.len(), 2);

        let germany = rows.iter().find(|r| r.partner == "Germany").unwrap();
        assert_eq!(germany.import_quantity, Decimal::ZERO);
        assert_eq!(germany.import_value, Decimal::ZERO);
        assert_eq!(germany.direction, Direction::ExportSurplus);

        let japan = rows.iter().find(|r| r.partner == "Japan").unwrap();
        assert_eq!(japan.export_quantity, Decimal::ZERO);
        assert_eq!(japan.export_value, Decimal::ZERO);
        assert_eq!(japan.direction, Direction::ImportSurplus);
    }

    #[test]
    fn test_merge_completeness() {
        let records = vec![
            record("Austria", "Germany", TradeFlow::Export, "1", "1"),
            record("Austria", "Italy", TradeFlow::Export, "1", "1"),
            record("Austria", "Italy", TradeFlow::Import, "1", "1"),
            record("Austria", "Spain", TradeFlow::Import, "1", "1"),
        ];

        let exports = group_flow(&records, TradeFlow::Export).unwrap();
        let imports = group_flow(&records, TradeFlow::Import).unwrap();
        let merged = merge_outer(&exports, &imports).unwrap();

        let expected: BTreeSet<PairKey> = exports.keys().chain(imports.keys()).cloned().collect();
        let actual: Vec<PairKey> = merged
            .iter()
            .map(|r| (r.country.clone(), r.partner.clone()))
            .collect();

        assert_eq!(actual.len(), expected.len());
        assert_eq!(actual.into_iter().collect::<BTreeSet<_>>(), expected);
    }

    #[test]
    fn test_unselected_countries_ignored() {
        let records = vec![
            record("Austria", "Germany", TradeFlow::Export, "10", "1"),
            record("Slovenia", "Germany", TradeFlow::Export, "99", "9"),
        ];

        let rows = aggregate(&records, &austria()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].export_quantity, dec("10"));
    }

    #[test]
    fn test_multiple_countries_keep_separate_pairs() {
        let records = vec![
            record("Slovenia", "Germany", TradeFlow::Export, "5", "1"),
            record("Austria", "Germany", TradeFlow::Export, "10", "1"),
        ];
        let selection = Selection::new(["Slovenia", "Austria"]).unwrap();

        let rows = aggregate(&records, &selection).unwrap();
        let keys: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.country.as_str(), r.partner.as_str()))
            .collect();

        assert_eq!(keys, vec![("Austria", "Germany"), ("Slovenia", "Germany")]);
    }

    #[test]
    fn test_order_independent() {
        let records = vec![
            record("Austria", "Germany", TradeFlow::Export, "1000.5", "1"),
            record("Austria", "Italy", TradeFlow::Import, "12", "2"),
            record("Austria", "Germany", TradeFlow::Import, "0.25", "3"),
            record("Austria", "Germany", TradeFlow::Export, "7", "4"),
            record("Austria", "Poland", TradeFlow::Export, "3.3", "5"),
        ];
        let mut reversed = records.clone();
        reversed.reverse();
        let mut rotated = records.clone();
        rotated.rotate_left(2);

        let expected = aggregate(&records, &austria()).unwrap();
        assert_eq!(aggregate(&reversed, &austria()).unwrap(), expected);
        assert_eq!(aggregate(&rotated, &austria()).unwrap(), expected);
    }

    #[test]
    fn test_totals_and_direction_invariants() {
        let records = vec![
            record("Austria", "Germany", TradeFlow::Export, "3", "1"),
            record("Austria", "Italy", TradeFlow::Import, "12", "2"),
            record("Austria", "Spain", TradeFlow::Import, "5", "1"),
            record("Austria", "Spain", TradeFlow::Export, "5", "1"),
        ];

        for row in aggregate(&records, &austria()).unwrap() {
            assert_eq!(row.total_trade, row.export_quantity + row.import_quantity);
            assert_eq!(row.balance, row.export_quantity - row.import_quantity);
            let expected = if row.balance > Decimal::ZERO {
                Direction::ExportSurplus
            } else if row.balance < Decimal::ZERO {
                Direction::ImportSurplus
            } else {
                Direction::Balanced
            };
            assert_eq!(row.direction, expected);
        }
    }

    #[test]
    fn test_sum_overflow_is_an_error() {
        let records = vec![
            record("Austria", "Germany", TradeFlow::Export, "1", "1"),
            TradeRecord {
                quantity: Decimal::MAX,
                ..record("Austria", "Germany", TradeFlow::Export, "0", "1")
            },
        ];

        let err = aggregate(&records, &austria()).unwrap_err();
        assert!(matches!(
            err,
            AggregateError::Overflow { ref country, ref partner }
                if country == "Austria" && partner == "Germany"
        ));
    }

    #[test]
    fn test_total_overflow_is_an_error() {
        let big = FlowTotals {
            quantity: Decimal::MAX,
            value: Decimal::ONE,
        };
        assert!(derive("Austria", "Germany", big, big).is_err());
    }

    #[test]
    fn test_marker_size() {
        assert_eq!(marker_size(dec("10000")), 1.0);
        assert_eq!(marker_size(Decimal::ZERO), 0.0);
        assert_eq!(marker_size(dec("-4")), 0.0);
    }
}
