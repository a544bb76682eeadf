use crate::types::{CellValue, Field, FieldMap, NormalizedRecord, RawRow};
use crate::util::parse_number;
use tracing::debug;

fn cell<'a>(row: &'a RawRow, map: &FieldMap, field: Field) -> Option<&'a CellValue> {
    map.get(field).and_then(|column| row.get(column))
}

fn text(row: &RawRow, map: &FieldMap, field: Field) -> Option<String> {
    cell(row, map, field).and_then(CellValue::as_text)
}

fn amount(row: &RawRow, map: &FieldMap, field: Field) -> f64 {
    parse_number(cell(row, map, field)).unwrap_or(0.0)
}

/// Map one raw line onto the canonical record shape.
///
/// Never fails: blanks and unparseable numbers fall back to `0` for the
/// additive fields and to `None` for the loss ratio. Whether the result is
/// usable is decided later by `NormalizedRecord::is_valid`.
pub fn normalize_row(row: &RawRow, map: &FieldMap) -> NormalizedRecord {
    let month = text(row, map, Field::Month)
        .map(|m| m.chars().take(7).collect::<String>())
        .unwrap_or_default();
    NormalizedRecord {
        intermediary: text(row, map, Field::Intermediary).unwrap_or_default(),
        month,
        lob: text(row, map, Field::Lob),
        product: text(row, map, Field::Product).unwrap_or_default(),
        partner_code: text(row, map, Field::PartnerCode),
        category: text(row, map, Field::Category),
        branch: text(row, map, Field::Branch),
        rm: text(row, map, Field::Rm),
        // A negative policy count is as meaningless as a blank one.
        policies: amount(row, map, Field::Policies).max(0.0),
        premium: amount(row, map, Field::Premium),
        commission: amount(row, map, Field::Commission),
        loss_ratio: parse_number(cell(row, map, Field::LossRatio)),
    }
}

/// One record per row, in input order.
pub fn normalize(rows: &[RawRow], map: &FieldMap) -> Vec<NormalizedRecord> {
    let out: Vec<NormalizedRecord> = rows.iter().map(|r| normalize_row(r, map)).collect();
    debug!(rows = out.len(), "normalized rows");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn row(cells: &[(&str, CellValue)]) -> RawRow {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn maps_columns_and_truncates_month() {
        let map = FieldMap::new()
            .with(Field::Intermediary, "Broker")
            .with(Field::Month, "Date")
            .with(Field::Product, "Plan")
            .with(Field::Premium, "GWP")
            .with(Field::LossRatio, "LR");
        let r = row(&[
            ("Broker", "Acme".into()),
            ("Date", "2024-01-15".into()),
            ("Plan", "Shield".into()),
            ("GWP", "1000".into()),
            ("LR", CellValue::Number(55.0)),
        ]);
        let rec = normalize_row(&r, &map);
        assert_eq!(rec.intermediary, "Acme");
        assert_eq!(rec.month, "2024-01");
        assert_eq!(rec.product, "Shield");
        assert_eq!(rec.premium, 1000.0);
        assert_eq!(rec.commission, 0.0);
        assert_eq!(rec.policies, 0.0);
        assert_eq!(rec.loss_ratio, Some(55.0));
        assert_eq!(rec.lob, None);
        assert!(rec.is_valid());
    }

    #[test]
    fn bad_numbers_fall_back_to_defaults() {
        let map = FieldMap::identity();
        let r = row(&[
            ("intermediary", "A".into()),
            ("month", "2024-02".into()),
            ("premium", "n/a".into()),
            ("commission", "1,200".into()),
            ("policies", "-3".into()),
            ("loss_ratio", "high".into()),
        ]);
        let rec = normalize_row(&r, &map);
        assert_eq!(rec.premium, 0.0);
        assert_eq!(rec.commission, 0.0);
        assert_eq!(rec.policies, 0.0);
        assert_eq!(rec.loss_ratio, None);
        assert!(rec.premium.is_finite());
    }

    #[test]
    fn zero_loss_ratio_is_kept() {
        let r = row(&[("loss_ratio", "0".into())]);
        assert_eq!(normalize_row(&r, &FieldMap::identity()).loss_ratio, Some(0.0));
    }

    #[test]
    fn unmapped_loss_ratio_is_none_even_if_column_exists() {
        let map = FieldMap::identity().with(Field::LossRatio, "");
        let r = row(&[("loss_ratio", "42".into())]);
        assert_eq!(normalize_row(&r, &map).loss_ratio, None);
    }

    #[test]
    fn short_or_missing_month_is_invalid() {
        let map = FieldMap::identity();
        let r = row(&[("intermediary", "A".into()), ("month", "2024".into())]);
        assert!(!normalize_row(&r, &map).is_valid());
        let r = row(&[("intermediary", "A".into())]);
        assert!(!normalize_row(&r, &map).is_valid());
        let r = row(&[("month", "2024-03".into())]);
        assert!(!normalize_row(&r, &map).is_valid());
    }

    #[test]
    fn output_is_one_to_one_and_ordered() {
        let rows = vec![
            row(&[("intermediary", "B".into())]),
            row(&[]),
            row(&[("intermediary", "A".into())]),
        ];
        let out = normalize(&rows, &FieldMap::identity());
        let names: Vec<&str> = out.iter().map(|r| r.intermediary.as_str()).collect();
        assert_eq!(names, vec!["B", "", "A"]);
    }

    proptest! {
        #[test]
        fn normalizing_twice_is_identical(
            cells in proptest::collection::vec(("[a-z_]{1,8}", "[ -~]{0,12}"), 0..12)
        ) {
            let r: RawRow = cells
                .iter()
                .map(|(k, v)| (k.clone(), CellValue::from(v.as_str())))
                .collect();
            let rows = vec![r];
            let map = FieldMap::identity();
            let first = normalize(&rows, &map);
            let second = normalize(&rows, &map);
            prop_assert_eq!(&first, &second);
            prop_assert!(first.iter().all(|r| r.premium.is_finite() && r.commission.is_finite()));
        }
    }
}
