// Portfolio overview across all partner snapshots.
use crate::insights::{classify_loss_ratio, LossRatioBand};
use crate::types::{DashboardRow, PartnerSnapshot};
use crate::util::{average, format_number, format_pct, round2};
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighestRisk {
    pub partner: String,
    pub loss_ratio: f64,
    pub band: LossRatioBand,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub partners: usize,
    pub total_premium: f64,
    pub avg_loss_ratio: Option<f64>,
    pub highest_risk: Option<HighestRisk>,
    pub top_partners: Vec<DashboardRow>,
}

fn has_lob(s: &PartnerSnapshot, lob: &str) -> bool {
    s.profile.lob_summary.iter().any(|l| l.lob == lob)
}

/// Summarize the portfolio, optionally restricted to partners writing `lob`.
///
/// The loss ratio is a simple mean over partners that have one. Ties in
/// premium or loss ratio keep snapshot order.
pub fn build_dashboard(snapshots: &[PartnerSnapshot], lob: Option<&str>, top: usize) -> Dashboard {
    let selected: Vec<&PartnerSnapshot> = snapshots
        .iter()
        .filter(|s| lob.map_or(true, |l| has_lob(s, l)))
        .collect();

    let total_premium: f64 = selected.iter().map(|s| s.profile.totals.premium).sum();
    let ratios: Vec<f64> = selected
        .iter()
        .filter_map(|s| s.profile.avg_loss_ratio)
        .collect();

    let highest_risk = selected
        .iter()
        .filter_map(|s| s.profile.avg_loss_ratio.map(|lr| (*s, lr)))
        .fold(None::<(&PartnerSnapshot, f64)>, |best, (s, lr)| match best {
            Some((_, b)) if b >= lr => best,
            _ => Some((s, lr)),
        })
        .map(|(s, lr)| HighestRisk {
            partner: s.profile.meta.partner_name.clone(),
            loss_ratio: lr,
            band: classify_loss_ratio(Some(lr)),
        });

    let mut ranked = selected.clone();
    ranked.sort_by(|a, b| {
        b.profile
            .totals
            .premium
            .partial_cmp(&a.profile.totals.premium)
            .unwrap_or(Ordering::Equal)
    });
    let top_partners = ranked
        .into_iter()
        .take(top)
        .map(|s| DashboardRow {
            partner: s.profile.meta.partner_name.clone(),
            premium: format_number(s.profile.totals.premium, 2),
            loss_ratio: format_pct(s.profile.avg_loss_ratio),
        })
        .collect();

    Dashboard {
        partners: selected.len(),
        total_premium,
        avg_loss_ratio: average(&ratios).map(round2),
        highest_risk,
        top_partners,
    }
}

/// Every LOB written by any partner, sorted and deduplicated.
pub fn lob_options(snapshots: &[PartnerSnapshot]) -> Vec<String> {
    let mut lobs: Vec<String> = snapshots
        .iter()
        .flat_map(|s| s.profile.lob_summary.iter().map(|l| l.lob.clone()))
        .collect();
    lobs.sort();
    lobs.dedup();
    lobs
}
