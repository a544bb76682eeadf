// Column mapping: guess which header feeds each canonical field and check
// that the fields the pipeline cannot run without are present.
use crate::error::{ReportError, Result};
use crate::types::{Field, FieldMap};
use std::collections::HashSet;
use tracing::debug;

/// Header fragments tried, in priority order, for each field.
fn rules(field: Field) -> &'static [&'static str] {
    match field {
        Field::Intermediary => &["intermediary", "broker", "agent", "partner"],
        Field::PartnerCode => &["partner code", "intermediary code", "code"],
        Field::Category => &["category", "tier", "grade"],
        Field::Branch => &["branch", "location", "office"],
        Field::Rm => &["relationship manager", "account manager", "rm", "ba"],
        Field::Month => &["month", "period", "policy month"],
        Field::Lob => &["lob", "line of business", "business line"],
        Field::Product => &["product", "plan", "scheme"],
        Field::Policies => &["policy", "policies", "count"],
        Field::Premium => &["premium", "gwp", "written premium"],
        Field::Commission => &["commission", "brokerage"],
        Field::LossRatio => &["loss ratio", "lr"],
    }
}

fn normalize_header(h: &str) -> String {
    h.trim().to_lowercase().replace(['_', '-'], " ")
}

/// Merge header lists, keeping first-seen order.
pub fn union_headers(lists: &[&[String]]) -> Vec<String> {
    let mut seen = HashSet::new();
    lists
        .iter()
        .flat_map(|l| l.iter())
        .filter(|h| seen.insert(h.as_str()))
        .cloned()
        .collect()
}

/// Guess a `FieldMap` from the available headers.
///
/// Fields are visited in canonical order and each header is claimed at most
/// once. For every field an exact match on any rule wins over a substring
/// match, so a `RM` column is not stolen by a longer header that merely
/// contains "rm".
pub fn auto_detect(headers: &[String]) -> FieldMap {
    let normalized: Vec<(String, &str)> = headers
        .iter()
        .map(|h| (normalize_header(h), h.as_str()))
        .collect();
    let mut used: HashSet<&str> = HashSet::new();
    let mut map = FieldMap::new();

    for field in Field::ALL {
        let rules = rules(field);
        let free = |raw: &&str| !used.contains(*raw);
        let exact = rules.iter().find_map(|rule| {
            normalized
                .iter()
                .find(|(norm, raw)| free(raw) && norm.as_str() == *rule)
                .map(|(_, raw)| *raw)
        });
        let detected = exact.or_else(|| {
            rules.iter().find_map(|rule| {
                normalized
                    .iter()
                    .find(|(norm, raw)| free(raw) && norm.contains(*rule))
                    .map(|(_, raw)| *raw)
            })
        });
        if let Some(raw) = detected {
            debug!(field = %field, column = raw, "auto-mapped column");
            used.insert(raw);
            map.set(field, raw);
        }
    }
    map
}

/// Fail on the first required field without a column.
pub fn validate(map: &FieldMap) -> Result<()> {
    match Field::REQUIRED.iter().find(|f| !map.is_mapped(**f)) {
        Some(f) => Err(ReportError::MissingMapping(*f)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn detects_common_export_headers() {
        let h = headers(&[
            "Broker Name",
            "Policy_Month",
            "Line-of-Business",
            "Product",
            "No. of Policies",
            "GWP",
            "Brokerage",
            "Loss Ratio",
        ]);
        let map = auto_detect(&h);
        assert_eq!(map.get(Field::Intermediary), Some("Broker Name"));
        assert_eq!(map.get(Field::Month), Some("Policy_Month"));
        assert_eq!(map.get(Field::Lob), Some("Line-of-Business"));
        assert_eq!(map.get(Field::Product), Some("Product"));
        assert_eq!(map.get(Field::Policies), Some("No. of Policies"));
        assert_eq!(map.get(Field::Premium), Some("GWP"));
        assert_eq!(map.get(Field::Commission), Some("Brokerage"));
        assert_eq!(map.get(Field::LossRatio), Some("Loss Ratio"));
        assert!(!map.is_mapped(Field::Branch));
    }

    #[test]
    fn exact_match_beats_earlier_substring_match() {
        // "Firm Name" contains "rm" but the exact "RM" header must win.
        let h = headers(&["Firm Name", "RM"]);
        let map = auto_detect(&h);
        assert_eq!(map.get(Field::Rm), Some("RM"));
    }

    #[test]
    fn header_is_claimed_once() {
        let h = headers(&["Partner Code"]);
        let map = auto_detect(&h);
        // intermediary is visited first and takes the only "partner" header.
        assert_eq!(map.get(Field::Intermediary), Some("Partner Code"));
        assert!(!map.is_mapped(Field::PartnerCode));
    }

    #[test]
    fn union_keeps_first_seen_order() {
        let a = headers(&["Broker", "Month", "GWP"]);
        let b = headers(&["Month", "Broker", "Brokerage"]);
        assert_eq!(
            union_headers(&[a.as_slice(), b.as_slice()]),
            headers(&["Broker", "Month", "GWP", "Brokerage"])
        );
    }

    #[test]
    fn validate_reports_first_missing_required_field() {
        let map = FieldMap::new()
            .with(Field::Intermediary, "Broker")
            .with(Field::Premium, "GWP");
        match validate(&map) {
            Err(ReportError::MissingMapping(f)) => assert_eq!(f, Field::Month),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(validate(&FieldMap::identity()).is_ok());
    }
}
