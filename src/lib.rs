//! Partner performance reporting for an insurance intermediary book.
//!
//! Two exports (premium and commission) are normalized through a column
//! mapping, reconciled on `(intermediary, month, product)`, and folded into
//! one [`PartnerSnapshot`] per intermediary with totals, a month-wise series,
//! LOB breakdown, premium-weighted loss ratios and portfolio benchmarks.
//!
//! ```rust,ignore
//! use partner_report::*;
//!
//! let premium = load_sheet("premium.csv")?;
//! let commission = load_sheet("commission.csv")?;
//! let map = auto_detect(&union_headers(&[premium.headers.as_slice(), commission.headers.as_slice()]));
//! let snapshots = run(PipelineInput {
//!     premium_rows: &premium.rows,
//!     commission_rows: &commission.rows,
//!     field_map: &map,
//!     statement_till: "March 2024",
//! })?;
//! ```

pub mod benchmark;
pub mod dashboard;
pub mod error;
pub mod insights;
pub mod loader;
pub mod mapping;
pub mod merge;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod reports;
pub mod types;
pub mod util;

pub use benchmark::{lob_benchmarks, portfolio_benchmark};
pub use dashboard::{build_dashboard, lob_options, Dashboard};
pub use error::{ReportError, Result};
pub use insights::*;
pub use loader::{load_field_map, load_sheet, read_sheet, Sheet};
pub use mapping::{auto_detect, union_headers};
pub use merge::merge_rows;
pub use normalize::normalize;
pub use pipeline::{run, PipelineInput};
pub use reports::{build_profiles, decorate};
pub use types::*;
