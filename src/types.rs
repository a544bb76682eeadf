use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

/// A single spreadsheet cell as handed over by the ingest side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

impl CellValue {
    /// Render the cell as a string, `None` for blank cells.
    ///
    /// Integral numbers print without a fractional part so that a month
    /// stored as a number still truncates sensibly.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    None
                } else {
                    Some(s.to_string())
                }
            }
            CellValue::Number(n) if n.is_finite() && n.fract() == 0.0 => Some(format!("{:.0}", n)),
            CellValue::Number(n) => Some(n.to_string()),
            CellValue::Empty => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_string())
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

/// One spreadsheet line: column header -> cell.
pub type RawRow = HashMap<String, CellValue>;

/// Canonical fields every source sheet is mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Intermediary,
    PartnerCode,
    Category,
    Branch,
    Rm,
    Month,
    Lob,
    Product,
    Policies,
    Premium,
    Commission,
    LossRatio,
}

impl Field {
    pub const ALL: [Field; 12] = [
        Field::Intermediary,
        Field::PartnerCode,
        Field::Category,
        Field::Branch,
        Field::Rm,
        Field::Month,
        Field::Lob,
        Field::Product,
        Field::Policies,
        Field::Premium,
        Field::Commission,
        Field::LossRatio,
    ];

    /// Fields the caller must map before the pipeline may run.
    pub const REQUIRED: [Field; 4] = [
        Field::Intermediary,
        Field::Month,
        Field::Product,
        Field::Premium,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Intermediary => "intermediary",
            Field::PartnerCode => "partner_code",
            Field::Category => "category",
            Field::Branch => "branch",
            Field::Rm => "rm",
            Field::Month => "month",
            Field::Lob => "lob",
            Field::Product => "product",
            Field::Policies => "policies",
            Field::Premium => "premium",
            Field::Commission => "commission",
            Field::LossRatio => "loss_ratio",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s.trim())
            .ok_or_else(|| s.to_string())
    }
}

/// Which export a row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Premium,
    Commission,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Premium => f.write_str("premium"),
            Source::Commission => f.write_str("commission"),
        }
    }
}

/// Canonical field -> column header chosen for it. Blank entries count as unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap {
    columns: BTreeMap<Field, String>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: Field, column: &str) -> Self {
        self.set(field, column);
        self
    }

    pub fn set(&mut self, field: Field, column: &str) {
        self.columns.insert(field, column.to_string());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.columns
            .get(&field)
            .map(|c| c.as_str())
            .filter(|c| !c.trim().is_empty())
    }

    pub fn is_mapped(&self, field: Field) -> bool {
        self.get(field).is_some()
    }

    /// Map every canonical field to a column of the same name.
    pub fn identity() -> Self {
        Field::ALL
            .iter()
            .fold(Self::new(), |m, f| m.with(*f, f.name()))
    }
}

/// The transaction unit produced by the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub intermediary: String,
    pub month: String,
    pub lob: Option<String>,
    pub product: String,
    pub partner_code: Option<String>,
    pub category: Option<String>,
    pub branch: Option<String>,
    pub rm: Option<String>,
    pub policies: f64,
    pub premium: f64,
    pub commission: f64,
    pub loss_ratio: Option<f64>,
}

impl NormalizedRecord {
    /// A record can be aggregated only with a partner and a `YYYY-MM` month.
    pub fn is_valid(&self) -> bool {
        !self.intermediary.trim().is_empty() && self.month.chars().count() == 7
    }

    pub fn merge_key(&self) -> MergeKey {
        MergeKey {
            intermediary: self.intermediary.clone(),
            month: self.month.clone(),
            product: self.product.clone(),
        }
    }
}

/// Join key between the premium and commission exports.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MergeKey {
    pub intermediary: String,
    pub month: String,
    pub product: String,
}

/// A record after reconciliation; one per distinct `MergeKey`.
pub type MergedRecord = NormalizedRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchRm {
    pub name: Option<String>,
    pub rm: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerMeta {
    pub partner_name: String,
    pub partner_code: Option<String>,
    pub category: Option<String>,
    pub branches: Vec<BranchRm>,
    pub statement_till: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub premium: f64,
    pub commission: f64,
    pub policies: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthEntry {
    pub month: String,
    pub premium: f64,
    pub commission: f64,
    pub policies: f64,
    pub loss_ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LobSummary {
    pub lob: String,
    pub premium: f64,
    pub commission: f64,
    pub policies: f64,
    /// `None` when the partner's total premium is zero.
    pub share_pct: Option<f64>,
    pub loss_ratio: Option<f64>,
}

/// First-pass aggregate for one partner, before portfolio context is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerProfile {
    pub meta: PartnerMeta,
    pub totals: Totals,
    pub avg_loss_ratio: Option<f64>,
    pub month_wise: Vec<MonthEntry>,
    pub lob_summary: Vec<LobSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Benchmark {
    pub avg_premium: f64,
    pub avg_loss_ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LobBenchmark {
    pub lob: String,
    pub premium: f64,
    pub loss_ratio: Option<f64>,
}

/// A partner profile decorated with portfolio benchmarks. This is the shape
/// handed to renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerSnapshot {
    #[serde(flatten)]
    pub profile: PartnerProfile,
    pub benchmark: Benchmark,
    pub lob_benchmarks: Vec<LobBenchmark>,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct PartnerSummaryRow {
    #[serde(rename = "Partner")]
    #[tabled(rename = "Partner")]
    pub partner: String,
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "Premium")]
    #[tabled(rename = "Premium")]
    pub premium: String,
    #[serde(rename = "Commission")]
    #[tabled(rename = "Commission")]
    pub commission: String,
    #[serde(rename = "Policies")]
    #[tabled(rename = "Policies")]
    pub policies: String,
    #[serde(rename = "LossRatio")]
    #[tabled(rename = "LossRatio")]
    pub loss_ratio: String,
    #[serde(rename = "RiskBand")]
    #[tabled(rename = "RiskBand")]
    pub risk_band: String,
    #[serde(rename = "RiskColor")]
    #[tabled(rename = "RiskColor")]
    pub risk_color: String,
    #[serde(rename = "Tier")]
    #[tabled(rename = "Tier")]
    pub tier: String,
    #[serde(rename = "Alerts")]
    #[tabled(rename = "Alerts")]
    pub alerts: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct LobSummaryRow {
    #[serde(rename = "Partner")]
    #[tabled(rename = "Partner")]
    pub partner: String,
    #[serde(rename = "LOB")]
    #[tabled(rename = "LOB")]
    pub lob: String,
    #[serde(rename = "Premium")]
    #[tabled(rename = "Premium")]
    pub premium: String,
    #[serde(rename = "SharePct")]
    #[tabled(rename = "SharePct")]
    pub share_pct: String,
    #[serde(rename = "LossRatio")]
    #[tabled(rename = "LossRatio")]
    pub loss_ratio: String,
    #[serde(rename = "PortfolioLossRatio")]
    #[tabled(rename = "PortfolioLossRatio")]
    pub portfolio_loss_ratio: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DashboardRow {
    #[serde(rename = "Partner")]
    #[tabled(rename = "Partner")]
    pub partner: String,
    #[serde(rename = "Premium")]
    #[tabled(rename = "Premium")]
    pub premium: String,
    #[serde(rename = "LossRatio")]
    #[tabled(rename = "LossRatio")]
    pub loss_ratio: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_text_trims_and_blanks_to_none() {
        assert_eq!(CellValue::from("  A ").as_text().as_deref(), Some("A"));
        assert_eq!(CellValue::Text("   ".into()).as_text(), None);
        assert_eq!(CellValue::Empty.as_text(), None);
        assert_eq!(CellValue::Number(202401.0).as_text().as_deref(), Some("202401"));
        assert_eq!(CellValue::Number(1.5).as_text().as_deref(), Some("1.5"));
    }

    #[test]
    fn field_names_round_trip_through_from_str() {
        for f in Field::ALL {
            assert_eq!(f.name().parse::<Field>(), Ok(f));
        }
        assert!("premium_total".parse::<Field>().is_err());
    }

    #[test]
    fn blank_mapping_counts_as_unset() {
        let map = FieldMap::new().with(Field::Lob, "  ").with(Field::Premium, "GWP");
        assert!(!map.is_mapped(Field::Lob));
        assert_eq!(map.get(Field::Premium), Some("GWP"));
    }

    #[test]
    fn snapshot_serializes_flat() {
        let snapshot = PartnerSnapshot {
            profile: PartnerProfile {
                meta: PartnerMeta {
                    partner_name: "A".into(),
                    partner_code: None,
                    category: None,
                    branches: vec![],
                    statement_till: "Mar 2024".into(),
                },
                totals: Totals::default(),
                avg_loss_ratio: None,
                month_wise: vec![],
                lob_summary: vec![],
            },
            benchmark: Benchmark {
                avg_premium: 0.0,
                avg_loss_ratio: None,
            },
            lob_benchmarks: vec![],
        };
        let v = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(v["meta"]["partner_name"], "A");
        assert!(v["avg_loss_ratio"].is_null());
        assert!(v.get("profile").is_none());
        let back: PartnerSnapshot = serde_json::from_value(v).unwrap();
        assert_eq!(back, snapshot);
    }
}
