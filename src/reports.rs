use crate::types::{
    Benchmark, BranchRm, LobBenchmark, LobSummary, MergedRecord, MonthEntry, PartnerMeta,
    PartnerProfile, PartnerSnapshot, Totals,
};
use crate::util::{month_sort_key, round2, WeightedRatio};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Bucket for records that carry no line of business.
pub const UNASSIGNED_LOB: &str = "Unassigned";

pub fn lob_label(r: &MergedRecord) -> &str {
    r.lob.as_deref().unwrap_or(UNASSIGNED_LOB)
}

/// Fold merged records into one profile per intermediary.
///
/// Partners come out in first-seen order. Every accumulator lives inside this
/// call; records are folded in input order so that float sums are stable
/// from run to run.
pub fn build_profiles(rows: &[MergedRecord], statement_till: &str) -> Vec<PartnerProfile> {
    #[derive(Default)]
    struct MonthAcc {
        premium: f64,
        commission: f64,
        policies: f64,
        loss_ratio: Option<f64>,
    }
    #[derive(Default)]
    struct LobAcc {
        premium: f64,
        commission: f64,
        policies: f64,
        ratio: WeightedRatio,
    }
    #[derive(Default)]
    struct Acc {
        name: String,
        code: Option<String>,
        category: Option<String>,
        branches: Vec<BranchRm>,
        totals: Totals,
        ratio: WeightedRatio,
        months: HashMap<String, MonthAcc>,
        lobs: Vec<(String, LobAcc)>,
    }

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut accs: Vec<Acc> = Vec::new();

    for r in rows {
        let i = *index.entry(r.intermediary.as_str()).or_insert_with(|| {
            accs.push(Acc {
                name: r.intermediary.clone(),
                ..Acc::default()
            });
            accs.len() - 1
        });
        let p = &mut accs[i];

        if p.code.is_none() {
            p.code = r.partner_code.clone();
        }
        if p.category.is_none() {
            p.category = r.category.clone();
        }
        if r.branch.is_some() || r.rm.is_some() {
            let pair = BranchRm {
                name: r.branch.clone(),
                rm: r.rm.clone(),
            };
            if !p.branches.contains(&pair) {
                p.branches.push(pair);
            }
        }

        p.totals.premium += r.premium;
        p.totals.commission += r.commission;
        p.totals.policies += r.policies;
        p.ratio.add(r.loss_ratio, r.premium);

        let m = p.months.entry(r.month.clone()).or_default();
        m.premium += r.premium;
        m.commission += r.commission;
        m.policies += r.policies;
        if r.loss_ratio.is_some() {
            m.loss_ratio = r.loss_ratio;
        }

        let lob = lob_label(r);
        let pos = match p.lobs.iter().position(|(name, _)| name == lob) {
            Some(pos) => pos,
            None => {
                p.lobs.push((lob.to_string(), LobAcc::default()));
                p.lobs.len() - 1
            }
        };
        let l = &mut p.lobs[pos].1;
        l.premium += r.premium;
        l.commission += r.commission;
        l.policies += r.policies;
        l.ratio.add(r.loss_ratio, r.premium);
    }

    let profiles: Vec<PartnerProfile> = accs
        .into_iter()
        .map(|acc| {
            let mut month_wise: Vec<MonthEntry> = acc
                .months
                .into_iter()
                .map(|(month, m)| MonthEntry {
                    month,
                    premium: m.premium,
                    commission: m.commission,
                    policies: m.policies,
                    loss_ratio: m.loss_ratio,
                })
                .collect();
            month_wise.sort_by_cached_key(|m| month_sort_key(&m.month));

            let total = acc.totals.premium;
            if total == 0.0 && !acc.lobs.is_empty() {
                warn!(partner = %acc.name, "zero total premium, LOB shares undefined");
            }
            let lob_summary = acc
                .lobs
                .into_iter()
                .map(|(lob, l)| LobSummary {
                    lob,
                    premium: l.premium,
                    commission: l.commission,
                    policies: l.policies,
                    share_pct: (total != 0.0).then(|| round2(l.premium * 100.0 / total)),
                    loss_ratio: l.ratio.value(),
                })
                .collect();

            PartnerProfile {
                meta: PartnerMeta {
                    partner_name: acc.name,
                    partner_code: acc.code,
                    category: acc.category,
                    branches: acc.branches,
                    statement_till: statement_till.to_string(),
                },
                totals: acc.totals,
                avg_loss_ratio: acc.ratio.value(),
                month_wise,
                lob_summary,
            }
        })
        .collect();

    debug!(partners = profiles.len(), "built partner profiles");
    profiles
}

/// Attach portfolio context to every profile. Each snapshot gets an identical
/// copy of both benchmarks.
pub fn decorate(
    profiles: Vec<PartnerProfile>,
    benchmark: Benchmark,
    lob_benchmarks: &[LobBenchmark],
) -> Vec<PartnerSnapshot> {
    profiles
        .into_iter()
        .map(|profile| PartnerSnapshot {
            profile,
            benchmark,
            lob_benchmarks: lob_benchmarks.to_vec(),
        })
        .collect()
}
