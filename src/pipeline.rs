// End-to-end run: raw rows in, decorated partner snapshots out.
use crate::benchmark::{lob_benchmarks, portfolio_benchmark};
use crate::error::{ReportError, Result};
use crate::mapping;
use crate::merge::merge_rows;
use crate::normalize::normalize;
use crate::reports::{build_profiles, decorate};
use crate::types::{FieldMap, NormalizedRecord, PartnerSnapshot, RawRow, Source};
use tracing::{info, warn};

/// Everything one run needs. The rows are borrowed from whoever ingested them.
#[derive(Debug, Clone, Copy)]
pub struct PipelineInput<'a> {
    pub premium_rows: &'a [RawRow],
    pub commission_rows: &'a [RawRow],
    pub field_map: &'a FieldMap,
    pub statement_till: &'a str,
}

fn keep_valid(records: Vec<NormalizedRecord>, source: Source) -> Vec<NormalizedRecord> {
    let before = records.len();
    let valid: Vec<NormalizedRecord> = records.into_iter().filter(|r| r.is_valid()).collect();
    if valid.len() < before {
        warn!(
            source = %source,
            dropped = before - valid.len(),
            "rows without partner or YYYY-MM month skipped"
        );
    }
    valid
}

/// Normalize, merge, aggregate and benchmark.
///
/// Fails before doing any work when a required column is unmapped or either
/// input is empty, and fails instead of returning an empty report when a
/// stage produces nothing.
pub fn run(input: PipelineInput<'_>) -> Result<Vec<PartnerSnapshot>> {
    mapping::validate(input.field_map)?;
    if input.premium_rows.is_empty() {
        return Err(ReportError::EmptySource(Source::Premium));
    }
    if input.commission_rows.is_empty() {
        return Err(ReportError::EmptySource(Source::Commission));
    }

    let premium = keep_valid(normalize(input.premium_rows, input.field_map), Source::Premium);
    let commission = keep_valid(
        normalize(input.commission_rows, input.field_map),
        Source::Commission,
    );
    if premium.is_empty() && commission.is_empty() {
        return Err(ReportError::NoValidRows);
    }
    info!(
        premium = premium.len(),
        commission = commission.len(),
        "normalized rows"
    );

    let merged = merge_rows(&premium, &commission);
    if merged.is_empty() {
        return Err(ReportError::NoMergedRows);
    }
    info!(keys = merged.len(), "merged premium and commission rows");

    let profiles = build_profiles(&merged, input.statement_till);
    let benchmark = portfolio_benchmark(&profiles).ok_or(ReportError::NoPartners)?;
    let lobs = lob_benchmarks(&merged);
    let snapshots = decorate(profiles, benchmark, &lobs);
    info!(partners = snapshots.len(), "built partner snapshots");
    Ok(snapshots)
}
