// Portfolio-wide reference figures every partner is compared against.
use crate::reports::lob_label;
use crate::types::{Benchmark, LobBenchmark, MergedRecord, PartnerProfile};
use crate::util::{average, round2, WeightedRatio};
use tracing::debug;

/// Simple means across partners.
///
/// `avg_premium` averages every partner's total premium. `avg_loss_ratio`
/// averages only partners that have a loss ratio; the rest are left out of
/// both the sum and the count. Returns `None` for an empty portfolio.
pub fn portfolio_benchmark(profiles: &[PartnerProfile]) -> Option<Benchmark> {
    let premiums: Vec<f64> = profiles.iter().map(|p| p.totals.premium).collect();
    let ratios: Vec<f64> = profiles.iter().filter_map(|p| p.avg_loss_ratio).collect();
    let benchmark = Benchmark {
        avg_premium: average(&premiums)?,
        avg_loss_ratio: average(&ratios).map(round2),
    };
    debug!(
        avg_premium = benchmark.avg_premium,
        avg_loss_ratio = ?benchmark.avg_loss_ratio,
        "portfolio benchmark"
    );
    Some(benchmark)
}

/// Premium-weighted loss ratio per LOB over every merged record, regardless
/// of partner. LOBs come out in first-seen order.
pub fn lob_benchmarks(rows: &[MergedRecord]) -> Vec<LobBenchmark> {
    let mut acc: Vec<(&str, f64, WeightedRatio)> = Vec::new();
    for r in rows {
        let lob = lob_label(r);
        let pos = match acc.iter().position(|(name, _, _)| *name == lob) {
            Some(pos) => pos,
            None => {
                acc.push((lob, 0.0, WeightedRatio::default()));
                acc.len() - 1
            }
        };
        let (_, premium, ratio) = &mut acc[pos];
        *premium += r.premium;
        ratio.add(r.loss_ratio, r.premium);
    }
    acc.into_iter()
        .map(|(lob, premium, ratio)| LobBenchmark {
            lob: lob.to_string(),
            premium,
            loss_ratio: ratio.value(),
        })
        .collect()
}
