// Human-readable signals derived from a finished partner snapshot.
//
// Everything here is a pure function of its input; nothing is cached or
// written back onto the snapshot.
use crate::types::{MonthEntry, PartnerProfile, PartnerSnapshot};
use crate::util::{format_number, month_sort_key};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LossRatioBand {
    Healthy,
    Watchlist,
    HighRisk,
    NotAvailable,
}

impl LossRatioBand {
    pub fn label(self) -> &'static str {
        match self {
            LossRatioBand::Healthy => "Healthy",
            LossRatioBand::Watchlist => "Watchlist",
            LossRatioBand::HighRisk => "High Risk",
            LossRatioBand::NotAvailable => "Not Available",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            LossRatioBand::Healthy => "#9BBB59",
            LossRatioBand::Watchlist => "#F79646",
            LossRatioBand::HighRisk => "#C0504D",
            LossRatioBand::NotAvailable => "#A0A0A0",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            LossRatioBand::Healthy => "🟢",
            LossRatioBand::Watchlist => "🟠",
            LossRatioBand::HighRisk => "🔴",
            LossRatioBand::NotAvailable => "⚪",
        }
    }

    pub fn narrative(self) -> &'static str {
        match self {
            LossRatioBand::Healthy => "Portfolio performance is stable with healthy loss ratios.",
            LossRatioBand::Watchlist => {
                "Portfolio shows early signs of stress and should be monitored closely."
            }
            LossRatioBand::HighRisk => {
                "Portfolio exhibits elevated risk levels and requires immediate corrective action."
            }
            LossRatioBand::NotAvailable => {
                "Insufficient loss ratio data to determine portfolio health."
            }
        }
    }
}

impl fmt::Display for LossRatioBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Upper bound (inclusive) of each band, checked in ascending order.
pub const LOSS_RATIO_BANDS: [(f64, LossRatioBand); 3] = [
    (60.0, LossRatioBand::Healthy),
    (80.0, LossRatioBand::Watchlist),
    (f64::INFINITY, LossRatioBand::HighRisk),
];

pub fn classify_loss_ratio(loss_ratio: Option<f64>) -> LossRatioBand {
    match loss_ratio {
        Some(v) if !v.is_nan() => LOSS_RATIO_BANDS
            .iter()
            .find(|(max, _)| v <= *max)
            .map(|(_, band)| *band)
            .unwrap_or(LossRatioBand::HighRisk),
        _ => LossRatioBand::NotAvailable,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub month: String,
    pub previous: f64,
    pub current: f64,
    pub message: String,
}

/// One alert per month whose loss ratio rose over the month before it.
///
/// Months are put in calendar order first; a pair with a missing ratio on
/// either side is skipped.
pub fn generate_alerts(months: &[MonthEntry]) -> Vec<Alert> {
    let mut sorted: Vec<&MonthEntry> = months.iter().collect();
    sorted.sort_by_cached_key(|m| month_sort_key(&m.month));

    sorted
        .windows(2)
        .filter_map(|pair| {
            let (prev, curr) = (pair[0].loss_ratio?, pair[1].loss_ratio?);
            (curr > prev).then(|| Alert {
                month: pair[1].month.clone(),
                previous: prev,
                current: curr,
                message: format!(
                    "Loss ratio increased from {}% to {}% in {}",
                    prev, curr, pair[1].month
                ),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PartnerTier {
    Gold,
    Silver,
    Bronze,
}

impl fmt::Display for PartnerTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PartnerTier::Gold => "Gold",
            PartnerTier::Silver => "Silver",
            PartnerTier::Bronze => "Bronze",
        };
        f.write_str(s)
    }
}

/// Gold and Silver need both volume and a known, low enough loss ratio.
pub fn partner_tier(profile: &PartnerProfile) -> PartnerTier {
    let premium = profile.totals.premium;
    match profile.avg_loss_ratio {
        Some(lr) if premium >= 5_000_000.0 && lr <= 65.0 => PartnerTier::Gold,
        Some(lr) if premium >= 2_000_000.0 && lr <= 75.0 => PartnerTier::Silver,
        _ => PartnerTier::Bronze,
    }
}

pub fn key_signal(profile: &PartnerProfile) -> &'static str {
    match profile.avg_loss_ratio {
        Some(lr) if lr <= 65.0 => {
            "Loss ratio remains within healthy limits, indicating disciplined underwriting."
        }
        Some(_) => "Loss ratio shows stress, primarily driven by adverse LOB performance.",
        None => LossRatioBand::NotAvailable.narrative(),
    }
}

/// How the partner's loss ratio sits against the portfolio mean, if both exist.
pub fn benchmark_comparison(snapshot: &PartnerSnapshot) -> Option<String> {
    let own = snapshot.profile.avg_loss_ratio?;
    let portfolio = snapshot.benchmark.avg_loss_ratio?;
    let diff = own - portfolio;
    Some(if diff > 0.0 {
        format!(
            "Loss ratio is {}% higher than portfolio average.",
            format_number(diff, 2)
        )
    } else {
        format!(
            "Loss ratio is {}% better than portfolio average.",
            format_number(diff.abs(), 2)
        )
    })
}

/// Corrective actions per LOB: shrink where losses run above 80%, grow where
/// they stay under 60%.
pub fn lob_recommendations(profile: &PartnerProfile) -> Vec<String> {
    profile
        .lob_summary
        .iter()
        .filter_map(|l| {
            let lr = l.loss_ratio?;
            if lr > 80.0 {
                Some(format!(
                    "Reduce exposure in {}: loss ratio at {}% exceeds the 80% threshold.",
                    l.lob,
                    format_number(lr, 2)
                ))
            } else if lr < 60.0 {
                Some(format!(
                    "Consider expanding {}: loss ratio at {}% is within healthy limits.",
                    l.lob,
                    format_number(lr, 2)
                ))
            } else {
                None
            }
        })
        .collect()
}

/// Share above which a single LOB is flagged as a concentration.
pub const CONCENTRATION_SHARE_PCT: f64 = 50.0;

/// Concentration and relative-performance observations per LOB.
pub fn lob_insights(snapshot: &PartnerSnapshot) -> Vec<String> {
    let mut out = Vec::new();
    for l in &snapshot.profile.lob_summary {
        if let Some(share) = l.share_pct.filter(|s| *s > CONCENTRATION_SHARE_PCT) {
            out.push(format!(
                "{} contributes {}% of premium, a concentration risk.",
                l.lob,
                format_number(share, 2)
            ));
        }
        let portfolio = snapshot
            .lob_benchmarks
            .iter()
            .find(|b| b.lob == l.lob)
            .and_then(|b| b.loss_ratio);
        if let (Some(own), Some(portfolio)) = (l.loss_ratio, portfolio) {
            if own > portfolio {
                out.push(format!(
                    "{} loss ratio of {}% is above the portfolio {} average of {}%.",
                    l.lob,
                    format_number(own, 2),
                    l.lob,
                    format_number(portfolio, 2)
                ));
            }
        }
    }
    out
}

/// File name the document assembler uses for a partner's statement.
pub fn statement_file_name(partner_name: &str) -> String {
    let stem: String = partner_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}.pdf", stem)
}
