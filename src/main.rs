// Entry point and high-level CLI flow.
//
// - Option [1] loads both exports and settles the column mapping.
// - Option [2] runs the pipeline, writes the JSON/CSV outputs and prints
//   previews, the portfolio dashboard and a sample partner statement.
// - After generating reports, the user can go back to the menu or exit.
use clap::Parser;
use once_cell::sync::Lazy;
use partner_report::types::{Field, FieldMap, RawRow};
use partner_report::{
    auto_detect, build_dashboard, lob_options, load_field_map, load_sheet, mapping, output, run,
    union_headers, util, PipelineInput, ReportError,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "partner_report")]
#[command(about = "Partner performance snapshots from premium and commission exports")]
struct Args {
    /// Premium export (CSV)
    #[arg(long, default_value = "premium.csv")]
    premium: PathBuf,

    /// Commission export (CSV)
    #[arg(long, default_value = "commission.csv")]
    commission: PathBuf,

    /// Reporting period label printed on every statement
    #[arg(long, default_value = "—")]
    statement_till: String,

    /// JSON object of field -> column; auto-detected from headers when omitted
    #[arg(long)]
    field_map: Option<PathBuf>,

    /// Directory for snapshots.json and the CSV summaries
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Number of partners listed on the dashboard
    #[arg(long, default_value_t = 10)]
    top: usize,

    /// Restrict the dashboard to partners writing this LOB
    #[arg(long)]
    lob: Option<String>,

    /// Load, process and export once, without the menu
    #[arg(long)]
    batch: bool,
}

// Loaded exports live here so the files are read once but can be processed
// repeatedly in a single run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { loaded: None }));

#[derive(Clone)]
struct Loaded {
    premium: Vec<RawRow>,
    commission: Vec<RawRow>,
    field_map: FieldMap,
}

struct AppState {
    loaded: Option<Loaded>,
}

fn app_state() -> MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(|e| e.into_inner())
}

fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Report Selection (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).ok();
        match buf.trim().to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn load(args: &Args) -> partner_report::Result<Loaded> {
    let premium = load_sheet(&args.premium)?;
    let commission = load_sheet(&args.commission)?;
    let field_map = match &args.field_map {
        Some(path) => load_field_map(path)?,
        None => auto_detect(&union_headers(&[
            premium.headers.as_slice(),
            commission.headers.as_slice(),
        ])),
    };
    Ok(Loaded {
        premium: premium.rows,
        commission: commission.rows,
        field_map,
    })
}

/// Handle option [1]: read both exports and settle the column mapping.
fn handle_load(args: &Args) -> bool {
    match load(args) {
        Ok(loaded) => {
            println!(
                "Loaded {} premium rows and {} commission rows.",
                util::format_int(loaded.premium.len()),
                util::format_int(loaded.commission.len())
            );
            println!("Column mapping:");
            for field in Field::ALL {
                println!(
                    "  {:<13} -> {}",
                    field.name(),
                    loaded.field_map.get(field).unwrap_or("-- not mapped --")
                );
            }
            if let Err(e) = mapping::validate(&loaded.field_map) {
                println!("Warning: {}. Supply --field-map to fix.", e);
            }
            println!();
            app_state().loaded = Some(loaded);
            true
        }
        Err(e) => {
            error!("load failed: {}", e);
            eprintln!("Failed to load files: {}\n", e);
            false
        }
    }
}

/// Handle option [2]: run the pipeline and export everything.
fn handle_generate_reports(args: &Args) -> partner_report::Result<()> {
    let loaded = app_state()
        .loaded
        .clone()
        .ok_or(ReportError::NotLoaded)?;

    let snapshots = run(PipelineInput {
        premium_rows: &loaded.premium,
        commission_rows: &loaded.commission,
        field_map: &loaded.field_map,
        statement_till: &args.statement_till,
    })?;

    println!("Generating reports...");
    std::fs::create_dir_all(&args.out_dir)?;

    let json = args.out_dir.join("snapshots.json");
    output::write_json(&json, &snapshots)?;
    println!("Partner snapshots saved to {}\n", json.display());

    let partners = output::partner_summary_rows(&snapshots);
    let file1 = args.out_dir.join("partner_summary.csv");
    output::write_csv(&file1, &partners)?;
    println!("Partner Performance Summary\n");
    output::preview_table_rows(&partners, 3);
    println!("(Full table exported to {})\n", file1.display());

    let lobs = output::lob_summary_rows(&snapshots);
    let file2 = args.out_dir.join("lob_summary.csv");
    output::write_csv(&file2, &lobs)?;
    println!("LOB Performance Breakdown\n");
    output::preview_table_rows(&lobs, 3);
    println!("(Full table exported to {})\n", file2.display());

    let dashboard = build_dashboard(&snapshots, args.lob.as_deref(), args.top);
    println!(
        "Dashboard ({}; LOBs available: {})",
        args.lob.as_deref().unwrap_or("All LOBs"),
        lob_options(&snapshots).join(", ")
    );
    println!(
        "Total premium: {}",
        util::format_number(dashboard.total_premium, 2)
    );
    match dashboard.avg_loss_ratio {
        Some(lr) => println!("Average loss ratio: {}", util::format_pct(Some(lr))),
        None => println!("Average loss ratio: Not Available"),
    }
    if let Some(risk) = &dashboard.highest_risk {
        println!(
            "Highest risk: {} {} ({})",
            risk.band.icon(),
            risk.partner,
            util::format_pct(Some(risk.loss_ratio))
        );
    }
    output::preview_table_rows(&dashboard.top_partners, args.top);

    if let Some(first) = snapshots.first() {
        output::print_statement(first);
    }
    info!(partners = snapshots.len(), "reports generated");
    Ok(())
}

fn report_failure(e: &ReportError) {
    error!("report generation failed: {}", e);
    eprintln!("Error: {}\n", e);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "partner_report=info".into()),
        )
        .init();

    let args = Args::parse();

    if args.batch {
        if !handle_load(&args) {
            std::process::exit(1);
        }
        if let Err(e) = handle_generate_reports(&args) {
            report_failure(&e);
            std::process::exit(1);
        }
        return;
    }

    loop {
        println!("Partner Performance Reports:");
        println!("[1] Load the files");
        println!("[2] Generate Reports\n");
        match read_choice().as_str() {
            "1" => {
                handle_load(&args);
            }
            "2" => {
                println!();
                if let Err(e) = handle_generate_reports(&args) {
                    report_failure(&e);
                }
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
}
