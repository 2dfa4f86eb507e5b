// Normalization pipeline for received-invoice (NF-e) and procurement exports.
//
// raw rows -> reconcile (column names) -> coerce (currency, dates)
// -> derive (AnoMes, Status Pagamento, DiasEntreDatas) -> reports.
pub mod cache;
pub mod config;
pub mod derive;
pub mod error;
pub mod loader;
pub mod logging;
pub mod output;
pub mod reconcile;
pub mod reports;
pub mod types;
pub mod util;

pub use error::{ReportError, Result};
