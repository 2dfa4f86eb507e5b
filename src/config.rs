// Settings for one report run, read from a TOML file.
use crate::derive::NegativeDayPolicy;
use crate::error::{ReportError, Result};
use crate::reconcile::{INVOICE_COLUMNS, INVOICE_MARKER};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = "nfe_report.toml";

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct InvoiceSource {
    pub path: PathBuf,
    /// Worksheet to read when `path` is a workbook; first sheet otherwise.
    pub sheet: Option<String>,
    pub expected_columns: Vec<String>,
    pub marker_column: String,
}

impl Default for InvoiceSource {
    fn default() -> Self {
        InvoiceSource {
            path: PathBuf::from("nfe_recebidas.csv"),
            sheet: None,
            expected_columns: INVOICE_COLUMNS.iter().map(|s| s.to_string()).collect(),
            marker_column: INVOICE_MARKER.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub invoices: InvoiceSource,
    pub productivity_files: Vec<PathBuf>,
    pub requisition_files: Vec<PathBuf>,
    pub negative_days: NegativeDayPolicy,
    pub output_dir: PathBuf,
    pub top_n: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            invoices: InvoiceSource::default(),
            productivity_files: Vec::new(),
            requisition_files: Vec::new(),
            negative_days: NegativeDayPolicy::default(),
            output_dir: PathBuf::from("."),
            top_n: 10,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: AppConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load `path`; a missing file means defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "no config file, using defaults");
            return Ok(AppConfig::default());
        }
        let s = std::fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            return Err(ReportError::Config("top_n must be at least 1".into()));
        }
        if self.invoices.expected_columns.is_empty() {
            return Err(ReportError::Config("invoices.expected_columns is empty".into()));
        }
        if self.invoices.marker_column.trim().is_empty() {
            return Err(ReportError::Config("invoices.marker_column is empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = AppConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.invoices.expected_columns.len(), 10);
        assert_eq!(cfg.negative_days, NegativeDayPolicy::Null);
    }

    #[test]
    fn partial_file_overrides_fields() {
        let cfg = AppConfig::from_toml_str(
            r#"
negative_days = "drop"
requisition_files = ["jan.xlsx", "fev.xlsx"]

[invoices]
path = "export.xlsx"
sheet = "NFe Recebidas - MÊS 05"
"#,
        )
        .unwrap();
        assert_eq!(cfg.negative_days, NegativeDayPolicy::Drop);
        assert_eq!(cfg.requisition_files.len(), 2);
        assert_eq!(cfg.invoices.sheet.as_deref(), Some("NFe Recebidas - MÊS 05"));
        assert_eq!(cfg.invoices.marker_column, "Fornecedor");
        assert_eq!(cfg.top_n, 10);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            AppConfig::from_toml_str("top_n = 0"),
            Err(ReportError::Config(_))
        ));
        assert!(matches!(
            AppConfig::from_toml_str("negative_days = \"sometimes\""),
            Err(ReportError::Config(_))
        ));
    }

    #[test]
    fn missing_file_means_defaults() {
        let cfg = AppConfig::load(Path::new("/definitely/not/here.toml")).unwrap();
        assert_eq!(cfg.top_n, 10);
    }
}
