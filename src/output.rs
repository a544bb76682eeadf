use crate::error::Result;
use crate::insights::{
    benchmark_comparison, classify_loss_ratio, generate_alerts, key_signal, lob_insights,
    lob_recommendations, partner_tier, statement_file_name,
};
use crate::types::{LobSummaryRow, PartnerSnapshot, PartnerSummaryRow};
use crate::util::{format_number, format_pct};
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize, P: AsRef<Path>>(path: P, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

pub fn partner_summary_rows(snapshots: &[PartnerSnapshot]) -> Vec<PartnerSummaryRow> {
    snapshots
        .iter()
        .map(|s| {
            let p = &s.profile;
            let band = classify_loss_ratio(p.avg_loss_ratio);
            PartnerSummaryRow {
                partner: p.meta.partner_name.clone(),
                category: p.meta.category.clone().unwrap_or_else(|| "—".to_string()),
                premium: format_number(p.totals.premium, 2),
                commission: format_number(p.totals.commission, 2),
                policies: format_number(p.totals.policies, 0),
                loss_ratio: format_pct(p.avg_loss_ratio),
                risk_band: band.to_string(),
                risk_color: band.color().to_string(),
                tier: partner_tier(p).to_string(),
                alerts: generate_alerts(&p.month_wise).len(),
            }
        })
        .collect()
}

pub fn lob_summary_rows(snapshots: &[PartnerSnapshot]) -> Vec<LobSummaryRow> {
    snapshots
        .iter()
        .flat_map(|s| {
            s.profile.lob_summary.iter().map(move |l| {
                let portfolio = s
                    .lob_benchmarks
                    .iter()
                    .find(|b| b.lob == l.lob)
                    .and_then(|b| b.loss_ratio);
                LobSummaryRow {
                    partner: s.profile.meta.partner_name.clone(),
                    lob: l.lob.clone(),
                    premium: format_number(l.premium, 2),
                    share_pct: format_pct(l.share_pct),
                    loss_ratio: format_pct(l.loss_ratio),
                    portfolio_loss_ratio: format_pct(portfolio),
                }
            })
        })
        .collect()
}

fn bullets(out: &mut Vec<String>, title: &str, items: &[String], empty: &str) {
    out.push(format!("{}:", title));
    if items.is_empty() {
        out.push(format!("  {}", empty));
    }
    out.extend(items.iter().map(|i| format!("  • {}", i)));
}

/// Executive summary page of a partner statement, one entry per line.
pub fn statement_lines(snapshot: &PartnerSnapshot) -> Vec<String> {
    let p = &snapshot.profile;
    let band = classify_loss_ratio(p.avg_loss_ratio);
    let alerts: Vec<String> = generate_alerts(&p.month_wise)
        .into_iter()
        .map(|a| a.message)
        .collect();

    let mut out = vec![
        format!(
            "Partner Performance Statement: {} ({})",
            p.meta.partner_name,
            statement_file_name(&p.meta.partner_name)
        ),
        format!("Statement till: {}", p.meta.statement_till),
    ];
    if let Some(code) = &p.meta.partner_code {
        out.push(format!("Code: {}", code));
    }
    if let Some(category) = &p.meta.category {
        out.push(format!("Category: {}", category));
    }
    out.push(format!("Tier: {}", partner_tier(p)));
    if !p.meta.branches.is_empty() {
        let branches: Vec<String> = p
            .meta
            .branches
            .iter()
            .map(|b| {
                format!(
                    "{} (RM: {})",
                    b.name.as_deref().unwrap_or("—"),
                    b.rm.as_deref().unwrap_or("—")
                )
            })
            .collect();
        out.push(format!("Branches / RM: {}", branches.join(" | ")));
    }
    out.push(format!(
        "Overall Risk Status: {} {} ({})",
        band.icon(),
        band.label(),
        band.color()
    ));
    out.push(format!("Average Loss Ratio: {}", format_pct(p.avg_loss_ratio)));
    if let Some(text) = benchmark_comparison(snapshot) {
        out.push(text);
    }
    out.push(band.narrative().to_string());
    out.push(format!("Key Signal: {}", key_signal(p)));
    bullets(&mut out, "Key Alerts", &alerts, "No loss ratio increases detected.");
    bullets(
        &mut out,
        "Actions Required",
        &lob_recommendations(p),
        "No immediate corrective actions required.",
    );
    bullets(
        &mut out,
        "LOB Performance Signals",
        &lob_insights(snapshot),
        "No significant LOB concentration risks identified.",
    );
    out
}

pub fn print_statement(snapshot: &PartnerSnapshot) {
    for line in statement_lines(snapshot) {
        println!("{}", line);
    }
    println!();
}
