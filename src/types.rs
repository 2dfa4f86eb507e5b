use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

/// One raw cell as it came out of the source file.
///
/// CSV sources only ever yield `Empty` or `Text`. Spreadsheet sources can
/// carry numbers and dates already typed by the workbook.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
}

impl Cell {
    /// Build a cell from CSV text; blank text is `Empty`.
    pub fn from_text(s: &str) -> Self {
        if s.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// A batch of rows sharing one ordered column schema.
///
/// Rows are positional; there is no key, duplicates are kept. Every row is
/// padded or truncated to the column count on the way in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Empty);
                row
            })
            .collect();
        Dataset { columns, rows }
    }

    /// Treat the first raw line as the header, the way a plain CSV read does.
    pub fn from_raw_rows(mut raw: Vec<Vec<Cell>>) -> Self {
        if raw.is_empty() {
            return Dataset::default();
        }
        let header: Vec<String> = raw.remove(0).iter().map(|c| c.to_string().trim().to_string()).collect();
        let width = raw.iter().map(Vec::len).max().unwrap_or(0).max(header.len());
        let mut columns = header;
        // Wider data rows get placeholder names, like a reader's "Unnamed" columns.
        while columns.len() < width {
            columns.push(String::new());
        }
        Dataset::new(columns, raw)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn get(&self, row: usize, name: &str) -> Option<&Cell> {
        let idx = self.column_index(name)?;
        self.rows.get(row)?.get(idx)
    }

    pub fn rename_column(&mut self, idx: usize, name: &str) {
        if let Some(col) = self.columns.get_mut(idx) {
            *col = name.to_string();
        }
    }

    /// Replace the header with the text of row 0 and discard that row.
    pub fn promote_first_row_to_header(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let first = self.rows.remove(0);
        self.columns = first.iter().map(|c| c.to_string().trim().to_string()).collect();
    }

    pub fn drop_column(&mut self, idx: usize) {
        if idx >= self.columns.len() {
            return;
        }
        self.columns.remove(idx);
        for row in &mut self.rows {
            row.remove(idx);
        }
    }

    /// Carry the last non-empty value down into empty cells of `name`.
    pub fn forward_fill(&mut self, name: &str) {
        let Some(idx) = self.column_index(name) else { return };
        let mut last: Option<Cell> = None;
        for row in &mut self.rows {
            if row[idx].is_empty() {
                if let Some(v) = &last {
                    row[idx] = v.clone();
                }
            } else {
                last = Some(row[idx].clone());
            }
        }
    }

    /// Project onto `names`, in that order. Missing names are skipped.
    pub fn select(&self, names: &[&str]) -> Dataset {
        let picks: Vec<usize> = names.iter().filter_map(|n| self.column_index(n)).collect();
        let columns = picks.iter().map(|&i| self.columns[i].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| picks.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Dataset { columns, rows }
    }

    /// Stack datasets; columns are the union in first-seen order.
    pub fn concat(parts: Vec<Dataset>) -> Dataset {
        let mut columns: Vec<String> = Vec::new();
        for part in &parts {
            for c in &part.columns {
                if !columns.contains(c) {
                    columns.push(c.clone());
                }
            }
        }
        let mut rows = Vec::new();
        for part in parts {
            let mapping: Vec<Option<usize>> = columns.iter().map(|c| part.column_index(c)).collect();
            for row in part.rows {
                rows.push(
                    mapping
                        .iter()
                        .map(|m| m.map(|i| row[i].clone()).unwrap_or(Cell::Empty))
                        .collect(),
                );
            }
        }
        Dataset { columns, rows }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[serde(rename = "Em Dia")]
    EmDia,
    #[serde(rename = "Atrasado")]
    Atrasado,
    #[serde(rename = "Sem Dados")]
    SemDados,
    #[serde(rename = "Erro")]
    Erro,
}

impl PaymentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::EmDia => "Em Dia",
            PaymentStatus::Atrasado => "Atrasado",
            PaymentStatus::SemDados => "Sem Dados",
            PaymentStatus::Erro => "Erro",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(' ', "").as_str() {
            "emdia" => Some(PaymentStatus::EmDia),
            "atrasado" => Some(PaymentStatus::Atrasado),
            "semdados" => Some(PaymentStatus::SemDados),
            "erro" => Some(PaymentStatus::Erro),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A received invoice ("Nota Fiscal") after coercion and derivation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceRecord {
    pub number: Option<String>,
    pub supplier: String,
    pub origin: Option<String>,
    pub nf_status: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub total: Option<f64>,
    pub notes: Option<String>,
    pub send_status: Option<String>,
    pub payment_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    #[serde(rename = "AnoMes")]
    pub ano_mes: Option<String>,
    #[serde(rename = "Status Pagamento")]
    pub payment_status: PaymentStatus,
}

/// One requisition (RM) created by a requester.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductivityRecord {
    pub requester: String,
    pub created_at: NaiveDateTime,
    #[serde(rename = "AnoMes")]
    pub ano_mes: String,
}

/// An authorized requisition and the purchase order (SC) raised from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequisitionRecord {
    pub authorized_at: Option<NaiveDateTime>,
    pub sc_created_at: Option<NaiveDateTime>,
    pub cost_center: Option<String>,
    pub interest_penalty: Option<f64>,
    #[serde(rename = "DiasEntreDatas")]
    pub dias_entre_datas: Option<i64>,
    #[serde(rename = "AnoMes")]
    pub ano_mes: Option<String>,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct SupplierTotalRow {
    #[serde(rename = "Fornecedor")]
    #[tabled(rename = "Fornecedor")]
    pub supplier: String,
    #[serde(rename = "Notas")]
    #[tabled(rename = "Notas")]
    pub notes: usize,
    #[serde(rename = "ValorTotal")]
    #[tabled(rename = "ValorTotal")]
    pub total: String,
    #[serde(skip)]
    #[tabled(skip)]
    pub raw_total: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct PeriodTotalRow {
    #[serde(rename = "Periodo")]
    #[tabled(rename = "Periodo")]
    pub period: String,
    #[serde(rename = "Notas")]
    #[tabled(rename = "Notas")]
    pub notes: usize,
    #[serde(rename = "ValorTotal")]
    #[tabled(rename = "ValorTotal")]
    pub total: String,
    #[serde(skip)]
    #[tabled(skip)]
    pub raw_total: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct StatusCountRow {
    #[serde(rename = "Status Pagamento")]
    #[tabled(rename = "Status Pagamento")]
    pub status: String,
    #[serde(rename = "Notas")]
    #[tabled(rename = "Notas")]
    pub notes: usize,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct ProductivityRow {
    #[serde(rename = "Usuario")]
    #[tabled(rename = "Usuario")]
    pub requester: String,
    #[serde(rename = "AnoMes")]
    #[tabled(rename = "AnoMes")]
    pub ano_mes: String,
    #[serde(rename = "RMs")]
    #[tabled(rename = "RMs")]
    pub requisitions: usize,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct LeadTimeRow {
    #[serde(rename = "CentroCusto")]
    #[tabled(rename = "CentroCusto")]
    pub cost_center: String,
    #[serde(rename = "Requisicoes")]
    #[tabled(rename = "Requisicoes")]
    pub requisitions: usize,
    #[serde(rename = "MediaDias")]
    #[tabled(rename = "MediaDias")]
    pub avg_days: String,
    #[serde(rename = "MedianaDias")]
    #[tabled(rename = "MedianaDias")]
    pub median_days: String,
    #[serde(rename = "JurosMulta")]
    #[tabled(rename = "JurosMulta")]
    pub interest_penalty: String,
}

/// Display form of an invoice for the detail table.
#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct InvoiceRow {
    #[serde(rename = "Número")]
    #[tabled(rename = "Número")]
    pub number: String,
    #[serde(rename = "Fornecedor")]
    #[tabled(rename = "Fornecedor")]
    pub supplier: String,
    #[serde(rename = "Emissão")]
    #[tabled(rename = "Emissão")]
    pub issue_date: String,
    #[serde(rename = "Valor Total")]
    #[tabled(rename = "Valor Total")]
    pub total: String,
    #[serde(rename = "Status Pagamento")]
    #[tabled(rename = "Status Pagamento")]
    pub payment_status: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SummaryStats {
    pub total_invoices: usize,
    pub total_suppliers: usize,
    pub total_value: f64,
    pub late_payments: usize,
    pub avg_rm_to_sc_days: Option<f64>,
}
