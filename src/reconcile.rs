// Column reconciliation: map whatever header the export arrived with onto
// the fixed schema the rest of the pipeline reads by name.
use crate::types::Dataset;
use tracing::debug;

pub const NUMERO: &str = "Número";
pub const FORNECEDOR: &str = "Fornecedor";
pub const ORIGEM: &str = "Origem";
pub const STATUS_NF: &str = "Status NF";
pub const EMISSAO: &str = "Emissão";
pub const VALOR_TOTAL: &str = "Valor Total";
pub const OBSERVACOES: &str = "Observações";
pub const STATUS_ENVIO: &str = "Status Envio";
pub const DATA_PAGAMENTO: &str = "Data Pagamento";
pub const PRAZO_LIMITE: &str = "Prazo Limite";

pub const INVOICE_COLUMNS: [&str; 10] = [
    NUMERO,
    FORNECEDOR,
    ORIGEM,
    STATUS_NF,
    EMISSAO,
    VALOR_TOTAL,
    OBSERVACOES,
    STATUS_ENVIO,
    DATA_PAGAMENTO,
    PRAZO_LIMITE,
];

pub const INVOICE_MARKER: &str = FORNECEDOR;

/// Best-effort rename of `dataset` onto `expected`.
///
/// When `marker` is missing from the header the real header is assumed to
/// sit in row 0 and is promoted. Fully blank unnamed columns are dropped,
/// then the first `min(width, expected.len())` columns take the expected
/// names by position. Extra trailing columns keep their names; expected
/// names past the dataset's width are never invented. Never fails.
pub fn reconcile<S: AsRef<str>>(mut dataset: Dataset, expected: &[S], marker: &str) -> Dataset {
    if !dataset.has_column(marker) {
        debug!(marker, "marker column absent, promoting first row to header");
        dataset.promote_first_row_to_header();
    }

    drop_blank_columns(&mut dataset);

    let n = dataset.width().min(expected.len());
    if n < expected.len() {
        debug!(
            width = dataset.width(),
            expected = expected.len(),
            "dataset narrower than schema, trailing expected columns left unassigned"
        );
    }
    for (idx, name) in expected.iter().take(n).enumerate() {
        dataset.rename_column(idx, name.as_ref());
    }
    dataset
}

fn drop_blank_columns(dataset: &mut Dataset) {
    let blank: Vec<usize> = (0..dataset.width())
        .filter(|&i| {
            dataset.columns[i].trim().is_empty() && dataset.rows.iter().all(|row| row[i].is_empty())
        })
        .collect();
    // Highest index first so earlier positions stay valid.
    for idx in blank.into_iter().rev() {
        debug!(column = idx, "dropping blank column");
        dataset.drop_column(idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cell;

    fn ds(columns: &[&str], rows: &[&[&str]]) -> Dataset {
        Dataset::new(
            columns.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| Cell::from_text(s)).collect())
                .collect(),
        )
    }

    #[test]
    fn permuted_header_gets_expected_names_in_order() {
        let raw = ds(
            &["Total", "Fornecedor", "Número"],
            &[&["1", "ACME", "10"]],
        );
        let out = reconcile(raw, &["A", "Fornecedor", "C"], "Fornecedor");
        assert_eq!(out.columns, vec!["A", "Fornecedor", "C"]);
        assert_eq!(out.rows[0][0], Cell::Text("1".into()));
    }

    #[test]
    fn header_in_first_row_is_promoted() {
        let raw = ds(
            &["Unnamed: 0", "Unnamed: 1"],
            &[&["Número", "Fornecedor"], &["1", "ACME"]],
        );
        let out = reconcile(raw, &["Número", "Fornecedor"], "Fornecedor");
        assert_eq!(out.columns, vec!["Número", "Fornecedor"]);
        assert_eq!(out.len(), 1);
        assert_eq!(out.get(0, "Fornecedor"), Some(&Cell::Text("ACME".into())));
    }

    #[test]
    fn extra_trailing_columns_keep_their_names() {
        let raw = ds(&["x", "Fornecedor", "extra"], &[&["1", "ACME", "z"]]);
        let out = reconcile(raw, &["Número", "Fornecedor"], "Fornecedor");
        assert_eq!(out.columns, vec!["Número", "Fornecedor", "extra"]);
    }

    #[test]
    fn narrow_dataset_does_not_fabricate_columns() {
        let raw = ds(&["n", "Fornecedor"], &[&["1", "ACME"]]);
        let out = reconcile(raw, &INVOICE_COLUMNS, INVOICE_MARKER);
        assert_eq!(out.columns, vec![NUMERO, FORNECEDOR]);
        assert!(!out.has_column(PRAZO_LIMITE));
    }

    #[test]
    fn leading_blank_column_is_dropped_before_rename() {
        let raw = ds(
            &["", "n", "Fornecedor"],
            &[&["", "1", "ACME"], &["", "2", "Beta"]],
        );
        let out = reconcile(raw, &["Número", "Fornecedor"], "Fornecedor");
        assert_eq!(out.columns, vec!["Número", "Fornecedor"]);
        assert_eq!(out.get(1, "Fornecedor"), Some(&Cell::Text("Beta".into())));
    }

    #[test]
    fn blank_header_with_data_is_kept() {
        let raw = ds(&["", "Fornecedor"], &[&["7", "ACME"]]);
        let out = reconcile(raw, &["Número", "Fornecedor"], "Fornecedor");
        assert_eq!(out.columns, vec!["Número", "Fornecedor"]);
        assert_eq!(out.get(0, "Número"), Some(&Cell::Text("7".into())));
    }

    #[test]
    fn empty_dataset_is_harmless() {
        let out = reconcile(Dataset::default(), &INVOICE_COLUMNS, INVOICE_MARKER);
        assert!(out.is_empty());
        assert!(out.columns.is_empty());
    }
}
