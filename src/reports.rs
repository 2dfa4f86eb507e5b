use crate::derive::iso_week_bucket;
use crate::types::{
    InvoiceRecord, InvoiceRow, LeadTimeRow, PaymentStatus, PeriodTotalRow, ProductivityRecord,
    ProductivityRow, RequisitionRecord, StatusCountRow, SummaryStats, SupplierTotalRow,
};
use crate::util::{average, fill_zero, format_brl, format_number, median};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

pub const ALL_SUPPLIERS: &str = "Todos";
pub const NO_DATA_NOTICE: &str = "Nenhuma nota encontrada para os filtros selecionados.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day,
    Week,
    Month,
}

impl Period {
    fn bucket(&self, r: &InvoiceRecord) -> Option<String> {
        let date = r.issue_date?;
        Some(match self {
            Period::Day => date.format("%Y-%m-%d").to_string(),
            Period::Week => iso_week_bucket(date),
            Period::Month => r.ano_mes.clone()?,
        })
    }
}

fn supplier_acc(records: &[InvoiceRecord]) -> Vec<(String, usize, f64)> {
    let mut map: HashMap<&str, (usize, f64)> = HashMap::new();
    for r in records {
        let e = map.entry(r.supplier.as_str()).or_insert((0, 0.0));
        e.0 += 1;
        e.1 += fill_zero(r.total);
    }
    map.into_iter().map(|(k, (n, t))| (k.to_string(), n, t)).collect()
}

fn supplier_row((supplier, notes, total): (String, usize, f64)) -> SupplierTotalRow {
    SupplierTotalRow { supplier, notes, total: format_brl(total), raw_total: total }
}

/// Suppliers ranked by summed value, ties broken by name.
pub fn supplier_totals(records: &[InvoiceRecord], top: usize) -> Vec<SupplierTotalRow> {
    let mut acc = supplier_acc(records);
    acc.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(Ordering::Equal).then_with(|| a.0.cmp(&b.0)));
    acc.into_iter().take(top).map(supplier_row).collect()
}

/// Suppliers ranked by number of invoices, ties broken by name.
pub fn supplier_counts(records: &[InvoiceRecord], top: usize) -> Vec<SupplierTotalRow> {
    let mut acc = supplier_acc(records);
    acc.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    acc.into_iter().take(top).map(supplier_row).collect()
}

/// Count and value per period, oldest first. Undated invoices are left out.
pub fn period_totals(records: &[InvoiceRecord], period: Period) -> Vec<PeriodTotalRow> {
    let mut map: BTreeMap<String, (usize, f64)> = BTreeMap::new();
    for r in records {
        let Some(key) = period.bucket(r) else { continue };
        let e = map.entry(key).or_insert((0, 0.0));
        e.0 += 1;
        e.1 += fill_zero(r.total);
    }
    map.into_iter()
        .map(|(period, (notes, total))| PeriodTotalRow {
            period,
            notes,
            total: format_brl(total),
            raw_total: total,
        })
        .collect()
}

pub fn payment_status_counts(records: &[InvoiceRecord]) -> Vec<StatusCountRow> {
    let mut map: BTreeMap<PaymentStatus, usize> = BTreeMap::new();
    for r in records {
        *map.entry(r.payment_status).or_default() += 1;
    }
    map.into_iter()
        .map(|(status, notes)| StatusCountRow { status: status.to_string(), notes })
        .collect()
}

/// RMs created per requester per month, sorted by month then count desc.
pub fn requester_productivity(records: &[ProductivityRecord]) -> Vec<ProductivityRow> {
    let mut map: HashMap<(&str, &str), usize> = HashMap::new();
    for r in records {
        *map.entry((r.requester.as_str(), r.ano_mes.as_str())).or_default() += 1;
    }
    let mut rows: Vec<ProductivityRow> = map
        .into_iter()
        .map(|((requester, ano_mes), requisitions)| ProductivityRow {
            requester: requester.to_string(),
            ano_mes: ano_mes.to_string(),
            requisitions,
        })
        .collect();
    rows.sort_by(|a, b| {
        a.ano_mes
            .cmp(&b.ano_mes)
            .then_with(|| b.requisitions.cmp(&a.requisitions))
            .then_with(|| a.requester.cmp(&b.requester))
    });
    rows
}

/// RM-to-SC lead time per cost center, slowest first. Rows whose day count
/// is null still count as requisitions but not toward the averages.
pub fn cost_center_lead_times(records: &[RequisitionRecord]) -> Vec<LeadTimeRow> {
    #[derive(Default)]
    struct Acc {
        requisitions: usize,
        days: Vec<f64>,
        interest: f64,
    }
    let mut map: HashMap<String, Acc> = HashMap::new();
    for r in records {
        let key = r.cost_center.clone().unwrap_or_else(|| "Sem Centro de Custo".to_string());
        let e = map.entry(key).or_default();
        e.requisitions += 1;
        if let Some(d) = r.dias_entre_datas {
            e.days.push(d as f64);
        }
        e.interest += fill_zero(r.interest_penalty);
    }
    let mut tmp: Vec<(f64, LeadTimeRow)> = map
        .into_iter()
        .map(|(cost_center, acc)| {
            let avg = average(&acc.days);
            let row = LeadTimeRow {
                cost_center,
                requisitions: acc.requisitions,
                avg_days: format_number(avg, 1),
                median_days: format_number(median(acc.days), 1),
                interest_penalty: format_brl(acc.interest),
            };
            (avg, row)
        })
        .collect();
    tmp.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.1.cost_center.cmp(&b.1.cost_center))
    });
    tmp.into_iter().map(|(_, row)| row).collect()
}

pub fn generate_summary(invoices: &[InvoiceRecord], requisitions: &[RequisitionRecord]) -> SummaryStats {
    let suppliers: HashSet<&str> = invoices.iter().map(|r| r.supplier.as_str()).collect();
    let days: Vec<f64> = requisitions
        .iter()
        .filter_map(|r| r.dias_entre_datas.map(|d| d as f64))
        .collect();
    SummaryStats {
        total_invoices: invoices.len(),
        total_suppliers: suppliers.len(),
        total_value: invoices.iter().map(|r| fill_zero(r.total)).sum(),
        late_payments: invoices
            .iter()
            .filter(|r| r.payment_status == PaymentStatus::Atrasado)
            .count(),
        avg_rm_to_sc_days: if days.is_empty() { None } else { Some(average(&days)) },
    }
}

/// `"Todos"` followed by every distinct supplier, sorted.
pub fn supplier_options(records: &[InvoiceRecord]) -> Vec<String> {
    let mut names: Vec<String> = records
        .iter()
        .map(|r| r.supplier.clone())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    names.sort();
    names.insert(0, ALL_SUPPLIERS.to_string());
    names
}

/// Distinct `AnoMes` values present, sorted.
pub fn month_options(records: &[InvoiceRecord]) -> Vec<String> {
    let months: BTreeSet<&str> = records.iter().filter_map(|r| r.ano_mes.as_deref()).collect();
    months.into_iter().map(str::to_string).collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceFilters {
    /// `None` (or `"Todos"`) means every supplier.
    pub supplier: Option<String>,
    /// Empty means every month.
    pub months: Vec<String>,
    pub status: Option<PaymentStatus>,
}

impl InvoiceFilters {
    pub fn matches(&self, r: &InvoiceRecord) -> bool {
        let supplier_ok = match self.supplier.as_deref() {
            None | Some(ALL_SUPPLIERS) => true,
            Some(s) => r.supplier == s,
        };
        let month_ok = self.months.is_empty()
            || r.ano_mes.as_ref().map(|m| self.months.contains(m)).unwrap_or(false);
        let status_ok = self.status.map(|s| s == r.payment_status).unwrap_or(true);
        supplier_ok && month_ok && status_ok
    }
}

/// Everything the dashboard shows for one filter state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceView {
    pub total_notes: usize,
    pub total_value: f64,
    pub daily: Vec<PeriodTotalRow>,
    pub monthly: Vec<PeriodTotalRow>,
    pub top_by_count: Vec<SupplierTotalRow>,
    pub top_by_value: Vec<SupplierTotalRow>,
    pub status_counts: Vec<StatusCountRow>,
    pub table: Vec<InvoiceRow>,
    pub notice: Option<String>,
}

pub const TOP_SUPPLIERS: usize = 10;

/// Build the dashboard view from the filters and the full dataset.
///
/// Pure: the same inputs always give the same view. The supplier rankings
/// cover the whole dataset; every other figure covers the filtered rows.
/// When nothing matches, the per-row figures are empty and `notice` says so.
pub fn render(filters: &InvoiceFilters, dataset: &[InvoiceRecord]) -> InvoiceView {
    let filtered: Vec<InvoiceRecord> = dataset.iter().filter(|r| filters.matches(r)).cloned().collect();

    let top_by_count = supplier_counts(dataset, TOP_SUPPLIERS);
    let top_by_value = supplier_totals(dataset, TOP_SUPPLIERS);

    if filtered.is_empty() {
        return InvoiceView {
            total_notes: 0,
            total_value: 0.0,
            daily: Vec::new(),
            monthly: Vec::new(),
            top_by_count,
            top_by_value,
            status_counts: Vec::new(),
            table: Vec::new(),
            notice: Some(NO_DATA_NOTICE.to_string()),
        };
    }

    let mut sorted: Vec<&InvoiceRecord> = filtered.iter().collect();
    // Newest first; undated rows sink to the bottom.
    sorted.sort_by(|a, b| b.issue_date.cmp(&a.issue_date));
    let table = sorted.into_iter().map(invoice_row).collect();

    InvoiceView {
        total_notes: filtered.len(),
        total_value: filtered.iter().map(|r| fill_zero(r.total)).sum(),
        daily: period_totals(&filtered, Period::Day),
        monthly: period_totals(&filtered, Period::Month),
        top_by_count,
        top_by_value,
        status_counts: payment_status_counts(&filtered),
        table,
        notice: None,
    }
}

fn invoice_row(r: &InvoiceRecord) -> InvoiceRow {
    InvoiceRow {
        number: r.number.clone().unwrap_or_default(),
        supplier: r.supplier.clone(),
        issue_date: r
            .issue_date
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_default(),
        total: r.total.map(format_brl).unwrap_or_default(),
        payment_status: r.payment_status.to_string(),
    }
}
