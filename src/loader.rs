use crate::derive::{classify_payment, elapsed_days, month_bucket, DayOutcome, NegativeDayPolicy};
use crate::error::{ReportError, Result};
use crate::reconcile::{self, reconcile};
use crate::types::{Cell, Dataset, InvoiceRecord, ProductivityRecord, RequisitionRecord};
use crate::util::{cell_text, parse_cell_date, parse_currency, parse_datetime_dayfirst};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use csv::ReaderBuilder;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, error, info, warn};

pub const USUARIO_CRIACAO_RM: &str = "USUARIO_DE_CRIAÇÃO_RM";
pub const DATA_CRIACAO_RM: &str = "DATA_CRIAÇÃO_RM";
pub const DATA_AUTORIZACAO_RM: &str = "DATA_AUTORIZACAO_RM";
pub const DATA_CRIACAO_SC: &str = "DATA_CRIAÇÃO_SC";
pub const CENTRO_CUSTO_OC: &str = "CENTRO_CUSTO_OC";
pub const JUROS_MULTA_PARCELA: &str = "JUROS_MULTA_PARCELA";

const SHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];

const DELIMITERS: &[u8] = &[b',', b';', b'\t'];
const SNIFF_LINES: usize = 10;

/// A source file that could not be read. Recorded, shown, and skipped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceError {
    pub path: String,
    pub message: String,
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Erro ao ler {}: {}", self.path, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub dropped_rows: usize,
    pub negative_days: usize,
    pub source_errors: Vec<SourceError>,
}

/// Parse CSV bytes without interpreting any header; the first line becomes
/// the provisional header and reconciliation decides what it really is.
pub fn read_csv_bytes(bytes: &[u8]) -> Result<Dataset> {
    let delimiter = sniff_delimiter(bytes);
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(bytes);

    let mut raw: Vec<Vec<Cell>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        raw.push(record.iter().map(Cell::from_text).collect());
    }
    Ok(Dataset::from_raw_rows(raw))
}

pub fn read_csv_path(path: &Path) -> Result<Dataset> {
    let bytes = std::fs::read(path)?;
    read_csv_bytes(&bytes)
}

/// Pick the delimiter that splits the leading lines most consistently.
///
/// Title lines above the header have no delimiter at all, so each candidate
/// is scored by its most common field count above 1 and how many sampled
/// lines share it. Ties and empty input fall back to `,`.
fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let lines: Vec<&[u8]> = bytes
        .split(|b| *b == b'\n')
        .map(|l| l.strip_suffix(b"\r").unwrap_or(l))
        .filter(|l| !l.iter().all(u8::is_ascii_whitespace))
        .take(SNIFF_LINES)
        .collect();

    let mut best = (b',', (0usize, 0usize));
    for &delim in DELIMITERS {
        let mut freq: HashMap<usize, usize> = HashMap::new();
        for line in &lines {
            let fields = count_fields(line, delim);
            if fields > 1 {
                *freq.entry(fields).or_insert(0) += 1;
            }
        }
        let score = freq
            .into_iter()
            .map(|(fields, lines)| (lines, fields))
            .max()
            .unwrap_or((0, 0));
        if score > best.1 {
            best = (delim, score);
        }
    }
    best.0
}

// Delimiters inside double quotes do not split.
fn count_fields(line: &[u8], delim: u8) -> usize {
    let mut in_quotes = false;
    let mut fields = 1;
    for &b in line {
        if b == b'"' {
            in_quotes = !in_quotes;
        } else if b == delim && !in_quotes {
            fields += 1;
        }
    }
    fields
}

/// Read one worksheet (the first when `sheet` is `None`).
pub fn read_sheet_path(path: &Path, sheet: Option<&str>) -> Result<Dataset> {
    let bytes = std::fs::read(path)?;
    read_sheet_bytes(&bytes, sheet, &path.display().to_string())
}

/// Workbook parse from memory; `label` only names the source in errors.
pub fn read_sheet_bytes(bytes: &[u8], sheet: Option<&str>, label: &str) -> Result<Dataset> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ReportError::Sheet(format!("{} has no sheets", label)))?,
    };
    let range = workbook.worksheet_range(&sheet_name)?;
    let (rows, cols) = range.get_size();
    debug!(source = %label, sheet = %sheet_name, rows, cols, "worksheet loaded");

    let raw: Vec<Vec<Cell>> = range
        .rows()
        .map(|row| row.iter().map(sheet_cell).collect())
        .collect();
    Ok(Dataset::from_raw_rows(raw))
}

fn sheet_cell(cell: &Data) -> Cell {
    match cell {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::from_text(s),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(v) => Cell::DateTime(v),
            None => Cell::Empty,
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::from_text(s),
        Data::Error(_) => Cell::Empty,
    }
}

pub fn is_sheet_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SHEET_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Dispatch on the file extension: workbooks via calamine, anything else as CSV.
pub fn read_source(path: &Path, sheet: Option<&str>) -> Result<Dataset> {
    if is_sheet_path(path) {
        read_sheet_path(path, sheet)
    } else {
        read_csv_path(path)
    }
}

/// Parse already-fetched bytes of `path`; the extension picks the format.
pub fn parse_source_bytes(path: &Path, bytes: &[u8], sheet: Option<&str>) -> Result<Dataset> {
    if is_sheet_path(path) {
        read_sheet_bytes(bytes, sheet, &path.display().to_string())
    } else {
        read_csv_bytes(bytes)
    }
}

/// Read every file, keeping the ones that parse. Failures are logged and
/// returned alongside so the caller can show one message per file.
pub fn read_many<P: AsRef<Path>>(
    files: &[P],
    sheet: Option<&str>,
) -> (Vec<(String, Dataset)>, Vec<SourceError>) {
    let mut ok = Vec::new();
    let mut failed = Vec::new();
    for file in files {
        let path = file.as_ref();
        let label = path.display().to_string();
        match read_source(path, sheet) {
            Ok(ds) => ok.push((label, ds)),
            Err(e) => {
                error!(path = %label, error = %e, "failed to read source");
                failed.push(SourceError { path: label, message: e.to_string() });
            }
        }
    }
    (ok, failed)
}

/// Reconcile, coerce and derive the invoice export.
///
/// Rows without a supplier are dropped. Blank payment or due dates stay
/// null and classify as `Sem Dados`.
pub fn load_invoices<S: AsRef<str>>(
    raw: Dataset,
    expected: &[S],
    marker: &str,
) -> (Vec<InvoiceRecord>, LoadReport) {
    let ds = reconcile(raw, expected, marker);
    let mut report = LoadReport { total_rows: ds.len(), ..Default::default() };

    let text = |row: usize, col: &str| ds.get(row, col).and_then(cell_text);
    let date = |row: usize, col: &str| ds.get(row, col).and_then(parse_cell_date);

    let mut records = Vec::with_capacity(ds.len());
    for row in 0..ds.len() {
        let Some(supplier) = text(row, reconcile::FORNECEDOR) else {
            report.dropped_rows += 1;
            continue;
        };
        let issue_date = date(row, reconcile::EMISSAO);
        let payment_date = date(row, reconcile::DATA_PAGAMENTO);
        let due_date = date(row, reconcile::PRAZO_LIMITE);
        records.push(InvoiceRecord {
            number: text(row, reconcile::NUMERO),
            supplier,
            origin: text(row, reconcile::ORIGEM),
            nf_status: text(row, reconcile::STATUS_NF),
            issue_date,
            total: ds.get(row, reconcile::VALOR_TOTAL).and_then(parse_currency),
            notes: text(row, reconcile::OBSERVACOES),
            send_status: text(row, reconcile::STATUS_ENVIO),
            payment_date,
            due_date,
            ano_mes: month_bucket(issue_date),
            payment_status: classify_payment(payment_date, due_date),
        });
    }
    report.kept_rows = records.len();
    info!(
        total = report.total_rows,
        kept = report.kept_rows,
        dropped = report.dropped_rows,
        "invoices loaded"
    );
    (records, report)
}

/// Requester productivity: who created each RM and when.
///
/// Requester and creation date are forward-filled per file, since the
/// exports only print them on the first line of each group. Files lacking
/// either column contribute nothing.
pub fn build_productivity(parts: Vec<(String, Dataset)>) -> (Vec<ProductivityRecord>, LoadReport) {
    let mut report = LoadReport::default();
    let mut kept = Vec::new();
    for (label, mut ds) in parts {
        ds.forward_fill(USUARIO_CRIACAO_RM);
        ds.forward_fill(DATA_CRIACAO_RM);
        if !(ds.has_column(USUARIO_CRIACAO_RM) && ds.has_column(DATA_CRIACAO_RM)) {
            warn!(path = %label, "productivity columns missing, file skipped");
            continue;
        }
        kept.push(ds.select(&[USUARIO_CRIACAO_RM, DATA_CRIACAO_RM]));
    }
    let ds = Dataset::concat(kept);
    report.total_rows = ds.len();

    let mut records = Vec::with_capacity(ds.len());
    for row in 0..ds.len() {
        let requester = ds.get(row, USUARIO_CRIACAO_RM).and_then(cell_text);
        let created_at = ds.get(row, DATA_CRIACAO_RM).and_then(parse_datetime_dayfirst);
        match (requester, created_at) {
            (Some(requester), Some(created_at)) => {
                let ano_mes = created_at.format("%Y-%m").to_string();
                records.push(ProductivityRecord { requester, created_at, ano_mes });
            }
            _ => report.dropped_rows += 1,
        }
    }
    report.kept_rows = records.len();
    (records, report)
}

pub fn load_productivity<P: AsRef<Path>>(files: &[P]) -> (Vec<ProductivityRecord>, LoadReport) {
    let (parts, errors) = read_many(files, None);
    let (records, mut report) = build_productivity(parts);
    report.source_errors = errors;
    info!(kept = report.kept_rows, failed = report.source_errors.len(), "productivity loaded");
    (records, report)
}

/// RM authorization to SC creation lead times.
pub fn build_requisitions(
    parts: Vec<(String, Dataset)>,
    policy: NegativeDayPolicy,
) -> (Vec<RequisitionRecord>, LoadReport) {
    let mut report = LoadReport::default();
    let mut kept = Vec::new();
    for (label, mut ds) in parts {
        for col in [DATA_AUTORIZACAO_RM, DATA_CRIACAO_SC, CENTRO_CUSTO_OC] {
            ds.forward_fill(col);
        }
        if ![DATA_AUTORIZACAO_RM, DATA_CRIACAO_SC, CENTRO_CUSTO_OC]
            .iter()
            .all(|c| ds.has_column(c))
        {
            warn!(path = %label, "requisition columns missing, file skipped");
            continue;
        }
        kept.push(ds.select(&[
            DATA_AUTORIZACAO_RM,
            DATA_CRIACAO_SC,
            CENTRO_CUSTO_OC,
            JUROS_MULTA_PARCELA,
        ]));
    }
    let ds = Dataset::concat(kept);
    report.total_rows = ds.len();

    let mut records = Vec::with_capacity(ds.len());
    for row in 0..ds.len() {
        let authorized_at = ds.get(row, DATA_AUTORIZACAO_RM).and_then(parse_datetime_dayfirst);
        let sc_created_at = ds.get(row, DATA_CRIACAO_SC).and_then(parse_datetime_dayfirst);
        let days = elapsed_days(authorized_at, sc_created_at);
        if matches!(days, Some(d) if d < 0) {
            report.negative_days += 1;
        }
        let dias_entre_datas = match policy.apply(days) {
            DayOutcome::Value(v) => v,
            DayOutcome::DropRow => {
                report.dropped_rows += 1;
                continue;
            }
        };
        records.push(RequisitionRecord {
            authorized_at,
            sc_created_at,
            cost_center: ds.get(row, CENTRO_CUSTO_OC).and_then(cell_text),
            interest_penalty: ds.get(row, JUROS_MULTA_PARCELA).and_then(parse_currency),
            dias_entre_datas,
            ano_mes: month_bucket(authorized_at.map(|dt| dt.date())),
        });
    }
    report.kept_rows = records.len();
    (records, report)
}

pub fn load_requisitions<P: AsRef<Path>>(
    files: &[P],
    policy: NegativeDayPolicy,
) -> (Vec<RequisitionRecord>, LoadReport) {
    let (parts, errors) = read_many(files, None);
    let (records, mut report) = build_requisitions(parts, policy);
    report.source_errors = errors;
    info!(
        kept = report.kept_rows,
        negative = report.negative_days,
        failed = report.source_errors.len(),
        "requisitions loaded"
    );
    (records, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::{INVOICE_COLUMNS, INVOICE_MARKER};
    use crate::types::PaymentStatus;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const INVOICE_CSV: &str = "\
Número,Fornecedor,Origem,Status NF,Emissão,Valor Total,Observações,Status Envio,Data Pagamento,Prazo Limite
1,ACME,SP,Autorizada,05/05/2025,\"R$ 11.739,00\",,Enviado,10/05/2025,15/05/2025
2,Beta,RJ,Autorizada,06/05/2025,\"0,00\",x,,20/05/2025,15/05/2025
3,,RJ,Cancelada,07/05/2025,\"1,00\",,,,
4,ACME,SP,Autorizada,31/02/2025,abc,,,,15/05/2025";

    fn create_test_file(content: &str, suffix: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn csv_reader_keeps_first_line_as_header() {
        let ds = read_csv_bytes(b"a,b\n1,2\n3").unwrap();
        assert_eq!(ds.columns, vec!["a", "b"]);
        assert_eq!(ds.rows[1], vec![Cell::Text("3".into()), Cell::Empty]);
    }

    #[test]
    fn csv_reader_detects_semicolons() {
        let ds = read_csv_bytes("Fornecedor;Valor Total\nACME;1.234,56".as_bytes()).unwrap();
        assert_eq!(ds.columns, vec!["Fornecedor", "Valor Total"]);
        assert_eq!(ds.rows[0][1], Cell::Text("1.234,56".into()));
    }

    #[test]
    fn title_line_does_not_hide_semicolons() {
        let csv = format!(
            "Relatorio NFe\n{}\n1;ACME;SP;A;05/05/2025;R$ 1,00;;;;\n",
            INVOICE_COLUMNS.join(";")
        );
        let raw = read_csv_bytes(csv.as_bytes()).unwrap();
        assert_eq!(raw.rows[0].len(), 10);
        let (records, _) = load_invoices(raw, &INVOICE_COLUMNS, INVOICE_MARKER);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].supplier, "ACME");
        assert_eq!(records[0].total, Some(1.0));
    }

    #[test]
    fn quoted_decimal_commas_do_not_outvote_semicolons() {
        assert_eq!(sniff_delimiter(b"a;b;c\r\n\"1,5\";2,5;x\r\n"), b';');
        assert_eq!(sniff_delimiter(b"a,b\n\"x;y\",2\n"), b',');
        assert_eq!(sniff_delimiter(b"a\tb\n1\t2\n"), b'\t');
        assert_eq!(sniff_delimiter(b""), b',');
    }

    #[test]
    fn invoices_are_coerced_and_derived() {
        let raw = read_csv_bytes(INVOICE_CSV.as_bytes()).unwrap();
        let (records, report) = load_invoices(raw, &INVOICE_COLUMNS, INVOICE_MARKER);
        assert_eq!(report.total_rows, 4);
        assert_eq!(report.dropped_rows, 1);
        assert_eq!(records.len(), 3);

        let first = &records[0];
        assert_eq!(first.total, Some(11739.0));
        assert_eq!(first.issue_date, NaiveDate::from_ymd_opt(2025, 5, 5));
        assert_eq!(first.ano_mes.as_deref(), Some("2025-05"));
        assert_eq!(first.payment_status, PaymentStatus::EmDia);
        assert_eq!(first.notes, None);

        assert_eq!(records[1].total, Some(0.0));
        assert_eq!(records[1].payment_status, PaymentStatus::Atrasado);

        let bad = &records[2];
        assert_eq!(bad.issue_date, None);
        assert_eq!(bad.ano_mes, None);
        assert_eq!(bad.total, None);
        assert_eq!(bad.payment_status, PaymentStatus::SemDados);
    }

    #[test]
    fn narrow_invoice_export_still_loads() {
        let raw = read_csv_bytes("n,Fornecedor,o,s,Emissão,Valor\n1,ACME,,,01/04/2025,\"5,00\"".as_bytes()).unwrap();
        let (records, _) = load_invoices(raw, &INVOICE_COLUMNS, INVOICE_MARKER);
        assert_eq!(records[0].total, Some(5.0));
        assert_eq!(records[0].payment_date, None);
        assert_eq!(records[0].payment_status, PaymentStatus::SemDados);
    }

    fn text_ds(columns: &[&str], rows: &[&[&str]]) -> Dataset {
        Dataset::new(
            columns.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| Cell::from_text(s)).collect())
                .collect(),
        )
    }

    #[test]
    fn productivity_forward_fills_and_skips_incomplete_files() {
        let good = text_ds(
            &[USUARIO_CRIACAO_RM, DATA_CRIACAO_RM, "ITEM"],
            &[
                &["ana", "02/05/2025 09:00:00", "a"],
                &["", "", "b"],
                &["bia", "not a date", "c"],
                &["", "03/06/2025", "d"],
            ],
        );
        let missing = text_ds(&[USUARIO_CRIACAO_RM], &[&["zé"]]);
        let (records, report) =
            build_productivity(vec![("good".into(), good), ("missing".into(), missing)]);
        assert_eq!(report.total_rows, 4);
        assert_eq!(report.dropped_rows, 1);
        let summary: Vec<(&str, &str)> =
            records.iter().map(|r| (r.requester.as_str(), r.ano_mes.as_str())).collect();
        assert_eq!(summary, vec![("ana", "2025-05"), ("ana", "2025-05"), ("bia", "2025-06")]);
    }

    #[test]
    fn requisition_days_follow_policy() {
        let ds = || {
            text_ds(
                &[DATA_AUTORIZACAO_RM, DATA_CRIACAO_SC, CENTRO_CUSTO_OC, JUROS_MULTA_PARCELA],
                &[
                    &["01/05/2025 08:00", "03/05/2025 23:00", "CC1", "R$ 10,00"],
                    &["", "02/05/2025", "", ""],
                    &["10/05/2025", "05/05/2025", "CC2", ""],
                ],
            )
        };

        let (kept, report) = build_requisitions(vec![("f".into(), ds())], NegativeDayPolicy::Null);
        assert_eq!(report.negative_days, 1);
        let days: Vec<Option<i64>> = kept.iter().map(|r| r.dias_entre_datas).collect();
        assert_eq!(days, vec![Some(2), Some(1), None]);
        assert_eq!(kept[1].cost_center.as_deref(), Some("CC1"));
        assert_eq!(kept[0].interest_penalty, Some(10.0));
        assert_eq!(kept[1].interest_penalty, None);

        let (dropped, report) = build_requisitions(vec![("f".into(), ds())], NegativeDayPolicy::Drop);
        assert_eq!(dropped.len(), 2);
        assert_eq!(report.dropped_rows, 1);

        let (all, _) = build_requisitions(vec![("f".into(), ds())], NegativeDayPolicy::Keep);
        assert_eq!(all[2].dias_entre_datas, Some(-5));
        assert_eq!(all[2].ano_mes.as_deref(), Some("2025-05"));
    }

    #[test]
    fn unreadable_files_are_reported_and_skipped() {
        let good = create_test_file(
            &format!("{},{}\nana,02/05/2025\n", USUARIO_CRIACAO_RM, DATA_CRIACAO_RM),
            ".csv",
        );
        let files = vec![
            good.path().to_path_buf(),
            std::path::PathBuf::from("does/not/exist.csv"),
        ];
        let (records, report) = load_productivity(&files);
        assert_eq!(records.len(), 1);
        assert_eq!(report.source_errors.len(), 1);
        assert!(report.source_errors[0].path.contains("exist.csv"));
        assert!(report.source_errors[0].to_string().starts_with("Erro ao ler"));
    }

    fn fixture_path() -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/requisicoes.xlsx")
    }

    fn day(cell: &Cell) -> Option<NaiveDate> {
        match cell {
            Cell::DateTime(dt) => Some(dt.date()),
            _ => None,
        }
    }

    #[test]
    fn workbook_reads_first_sheet_by_default() {
        let ds = read_sheet_path(&fixture_path(), None).unwrap();
        assert_eq!(ds.columns[0], "Resumo mensal");
        assert_eq!(ds.rows[0][0], Cell::Text("Total".into()));
        assert_eq!(ds.rows[0][1], Cell::Number(7.0));
    }

    #[test]
    fn workbook_named_sheet_keeps_typed_cells() {
        let ds = read_sheet_path(&fixture_path(), Some("Requisicoes")).unwrap();
        assert_eq!(
            ds.columns,
            vec![DATA_AUTORIZACAO_RM, DATA_CRIACAO_SC, CENTRO_CUSTO_OC, JUROS_MULTA_PARCELA]
        );
        assert_eq!(ds.len(), 3);
        assert_eq!(day(&ds.rows[0][0]), NaiveDate::from_ymd_opt(2025, 5, 1));
        assert_eq!(day(&ds.rows[0][1]), NaiveDate::from_ymd_opt(2025, 5, 3));
        assert_eq!(ds.rows[0][3], Cell::Number(10.5));
        assert_eq!(ds.rows[1][0], Cell::Empty);
        assert_eq!(day(&ds.rows[1][1]), NaiveDate::from_ymd_opt(2025, 5, 4));
        assert_eq!(ds.rows[2][0], Cell::Text("10/05/2025".into()));
    }

    #[test]
    fn unknown_sheet_name_is_an_error() {
        assert!(read_sheet_path(&fixture_path(), Some("Nope")).is_err());
    }

    #[test]
    fn workbook_requisitions_fill_typed_cells() {
        let ds = read_sheet_path(&fixture_path(), Some("Requisicoes")).unwrap();
        let (records, report) =
            build_requisitions(vec![("xlsx".into(), ds)], NegativeDayPolicy::Null);
        assert_eq!(report.total_rows, 3);
        assert_eq!(report.negative_days, 1);
        let days: Vec<Option<i64>> = records.iter().map(|r| r.dias_entre_datas).collect();
        assert_eq!(days, vec![Some(2), Some(3), None]);
        assert_eq!(
            records[1].authorized_at.map(|dt| dt.date()),
            NaiveDate::from_ymd_opt(2025, 5, 1)
        );
        assert_eq!(records[1].cost_center.as_deref(), Some("ADM"));
        assert_eq!(records[0].interest_penalty, Some(10.5));
        assert_eq!(records[1].interest_penalty, None);
        assert_eq!(records[2].interest_penalty, Some(2.0));
        assert_eq!(records[2].ano_mes.as_deref(), Some("2025-05"));
    }

    #[test]
    fn workbook_bytes_parse_without_the_file() {
        let bytes = std::fs::read(fixture_path()).unwrap();
        let gone = Path::new("nowhere/requisicoes.xlsx");
        let ds = parse_source_bytes(gone, &bytes, Some("Requisicoes")).unwrap();
        assert_eq!(ds.len(), 3);
        assert!(parse_source_bytes(gone, b"not a workbook", None).is_err());
    }

    #[test]
    fn sheet_extensions_are_detected() {
        assert!(is_sheet_path(Path::new("jan.XLSX")));
        assert!(is_sheet_path(Path::new("a/b/fev.ods")));
        assert!(!is_sheet_path(Path::new("export.csv")));
        assert!(!is_sheet_path(Path::new("noext")));
    }
}
