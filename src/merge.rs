use crate::types::{MergeKey, MergedRecord, NormalizedRecord};
use std::collections::HashMap;
use tracing::debug;

/// Reconcile premium-sourced and commission-sourced records into one record
/// per `(intermediary, month, product)`.
///
/// Premium records are visited first, then commission records. The first
/// record seen for a key seeds it, so its descriptive fields stick. Later
/// records add their premium, commission and policies, and any non-null
/// loss ratio overwrites the one held so far. Keys present in only one
/// source are kept as they are.
pub fn merge_rows(
    premium_rows: &[NormalizedRecord],
    commission_rows: &[NormalizedRecord],
) -> Vec<MergedRecord> {
    let mut index: HashMap<MergeKey, usize> = HashMap::new();
    let mut out: Vec<MergedRecord> = Vec::new();

    for r in premium_rows.iter().chain(commission_rows) {
        let key = r.merge_key();
        match index.get(&key).copied() {
            Some(i) => {
                let t = &mut out[i];
                t.premium += r.premium;
                t.commission += r.commission;
                t.policies += r.policies;
                if r.loss_ratio.is_some() {
                    t.loss_ratio = r.loss_ratio;
                }
            }
            None => {
                index.insert(key, out.len());
                out.push(r.clone());
            }
        }
    }

    debug!(
        input = premium_rows.len() + commission_rows.len(),
        keys = out.len(),
        "merged rows"
    );
    out
}
