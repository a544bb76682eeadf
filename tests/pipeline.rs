use partner_report::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn csv_file(contents: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    f
}

const PREMIUM: &str = "\
Intermediary,Partner Code,Branch,RM,Policy Month,LOB,Product,No of Policies,GWP
Acme Brokers,AC-01,Pune,Ravi,2024-01-15,Motor,Private Car,3,1000
Acme Brokers,AC-01,Pune,Ravi,2024-02-03,Health,Family Floater,1,3000
Acme Brokers,AC-01,Nagpur,Meena,2024-03-09,Motor,Private Car,2,2000
Beta Agency,BE-07,Delhi,Asha,2024-01-20,Motor,Private Car,5,5000
Gamma Direct,,,,2024-02-11,Fire,Shop Shield,1,4000
,,,,2024-02-11,Fire,Shop Shield,1,999
";

const COMMISSION: &str = "\
Intermediary,Policy Month,Product,Commission,Loss Ratio
Acme Brokers,2024-01-31,Private Car,100,50
Acme Brokers,2024-02-28,Family Floater,300,90
Acme Brokers,2024-03-31,Private Car,200,70
Beta Agency,2024-01-31,Private Car,500,not reported
Gamma Direct,2024-02-29,Shop Shield,400,80
";

fn snapshots() -> Vec<PartnerSnapshot> {
    let premium = load_sheet(csv_file(PREMIUM).path()).unwrap();
    let commission = load_sheet(csv_file(COMMISSION).path()).unwrap();
    let map = auto_detect(&union_headers(&[
        premium.headers.as_slice(),
        commission.headers.as_slice(),
    ]));
    run(PipelineInput {
        premium_rows: &premium.rows,
        commission_rows: &commission.rows,
        field_map: &map,
        statement_till: "March 2024",
    })
    .unwrap()
}

#[test]
fn csv_exports_reconcile_into_partner_snapshots() {
    let snaps = snapshots();
    let names: Vec<&str> = snaps
        .iter()
        .map(|s| s.profile.meta.partner_name.as_str())
        .collect();
    assert_eq!(names, vec!["Acme Brokers", "Beta Agency", "Gamma Direct"]);

    let acme = &snaps[0].profile;
    assert_eq!(acme.totals.premium, 6000.0);
    assert_eq!(acme.totals.commission, 600.0);
    assert_eq!(acme.totals.policies, 6.0);
    // (50*1000 + 90*3000 + 70*2000) / 6000
    assert_eq!(acme.avg_loss_ratio, Some(76.67));
    assert_eq!(acme.meta.partner_code.as_deref(), Some("AC-01"));
    assert_eq!(acme.meta.branches.len(), 2);
    assert_eq!(acme.meta.statement_till, "March 2024");

    let months: Vec<&str> = acme.month_wise.iter().map(|m| m.month.as_str()).collect();
    assert_eq!(months, vec!["2024-01", "2024-02", "2024-03"]);

    let motor = acme.lob_summary.iter().find(|l| l.lob == "Motor").unwrap();
    assert_eq!(motor.premium, 3000.0);
    assert_eq!(motor.share_pct, Some(50.0));
    // (50*1000 + 70*2000) / 3000
    assert_eq!(motor.loss_ratio, Some(63.33));

    let beta = &snaps[1].profile;
    assert_eq!(beta.avg_loss_ratio, None);
    assert_eq!(beta.totals.commission, 500.0);
}

#[test]
fn benchmarks_skip_partners_without_loss_ratio() {
    let snaps = snapshots();
    let b = snaps[0].benchmark;
    assert!(snaps.iter().all(|s| s.benchmark == b));
    // mean of 76.67 and 80; Beta has no ratio
    let lr = b.avg_loss_ratio.unwrap();
    assert!((lr - 78.335).abs() < 0.006, "portfolio loss ratio {}", lr);
    assert_eq!(b.avg_premium, 5000.0);

    let motor = snaps[0]
        .lob_benchmarks
        .iter()
        .find(|l| l.lob == "Motor")
        .unwrap();
    // Beta's Motor premium has no ratio, so only Acme weighs in
    assert_eq!(motor.premium, 8000.0);
    assert_eq!(motor.loss_ratio, Some(63.33));
}

#[test]
fn insights_from_finished_snapshot() {
    let snaps = snapshots();
    let acme = &snaps[0];
    let alerts = generate_alerts(&acme.profile.month_wise);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].month, "2024-02");
    assert_eq!(
        classify_loss_ratio(acme.profile.avg_loss_ratio),
        LossRatioBand::Watchlist
    );
    assert_eq!(partner_tier(&acme.profile), PartnerTier::Bronze);
    let recos = lob_recommendations(&acme.profile);
    assert!(recos.iter().any(|r| r.contains("Reduce exposure in Health")));
    let text = benchmark_comparison(acme).unwrap();
    assert!(text.ends_with("better than portfolio average."), "{}", text);
}

#[test]
fn missing_premium_column_is_reported() {
    let premium = load_sheet(csv_file("Broker,Month,Product\nA,2024-01,X\n").path()).unwrap();
    let map = auto_detect(&premium.headers);
    let err = run(PipelineInput {
        premium_rows: &premium.rows,
        commission_rows: &premium.rows,
        field_map: &map,
        statement_till: "",
    })
    .unwrap_err();
    assert!(matches!(err, ReportError::MissingMapping(Field::Premium)));
    assert_eq!(err.to_string(), "Please map a column for \"premium\"");
}
