// Entry point and menu flow.
//
// - Option [1] reads every configured source and prints load diagnostics.
// - Option [2] renders the dashboard view for the current filters, prints
//   previews and exports CSV/JSON.
// - Option [3] changes the supplier/month/status filters.
// - Option [4] drops the parsed-source cache so the next load re-reads.
use nfe_report::cache::SourceCache;
use nfe_report::config::{AppConfig, DEFAULT_CONFIG_PATH};
use nfe_report::loader::{self, LoadReport};
use nfe_report::reports::{self, InvoiceFilters, Period};
use nfe_report::types::{Dataset, InvoiceRecord, PaymentStatus, ProductivityRecord, RequisitionRecord};
use nfe_report::{logging, output, util, ReportError};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info};

struct App {
    config: AppConfig,
    cache: SourceCache<Dataset>,
    invoices: Vec<InvoiceRecord>,
    productivity: Vec<ProductivityRecord>,
    requisitions: Vec<RequisitionRecord>,
    filters: InvoiceFilters,
}

/// Print `prompt` and read one trimmed line.
fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn read_choice() -> String {
    read_line("Enter choice: ")
}

/// `true` for `Y`, `false` for `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        match read_line("Back to Report Selection (Y/N): ").to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn print_load_report(label: &str, report: &LoadReport) {
    println!(
        "{}: {} rows read, {} kept, {} dropped.",
        label,
        util::format_int(report.total_rows as u64),
        util::format_int(report.kept_rows as u64),
        util::format_int(report.dropped_rows as u64)
    );
    if report.negative_days > 0 {
        println!(
            "Note: {} rows had the SC created before the RM was authorized.",
            util::format_int(report.negative_days as u64)
        );
    }
    for e in &report.source_errors {
        eprintln!("{}", e);
    }
}

impl App {
    fn new(config: AppConfig) -> Self {
        App {
            config,
            cache: SourceCache::new(),
            invoices: Vec::new(),
            productivity: Vec::new(),
            requisitions: Vec::new(),
            filters: InvoiceFilters::default(),
        }
    }

    /// Raw invoice dataset, parsed at most once per version of the file.
    fn invoice_dataset(&mut self) -> nfe_report::Result<Dataset> {
        let path = self.config.invoices.path.clone();
        let sheet = self.config.invoices.sheet.clone();
        let id = path.display().to_string();
        let bytes = std::fs::read(&path).map_err(|e| ReportError::Source {
            path: id.clone(),
            message: e.to_string(),
        })?;
        let ds = self.cache.get_or_try_insert(&id, &bytes, |b| {
            loader::parse_source_bytes(&path, b, sheet.as_deref())
        })?;
        Ok(Dataset::clone(&ds))
    }

    fn handle_load(&mut self) {
        match self.invoice_dataset() {
            Ok(raw) => {
                let inv = &self.config.invoices;
                let (records, report) = loader::load_invoices(raw, &inv.expected_columns, &inv.marker_column);
                print_load_report("Notas fiscais", &report);
                self.invoices = records;
            }
            Err(e) => {
                error!(error = %e, "invoice source unavailable");
                eprintln!("{}", e);
            }
        }

        if !self.config.productivity_files.is_empty() {
            let (records, report) = loader::load_productivity(&self.config.productivity_files);
            print_load_report("Produtividade", &report);
            self.productivity = records;
        }
        if !self.config.requisition_files.is_empty() {
            let (records, report) =
                loader::load_requisitions(&self.config.requisition_files, self.config.negative_days);
            print_load_report("Requisições", &report);
            self.requisitions = records;
        }
        println!();
    }

    fn out_path(&self, name: &str) -> PathBuf {
        self.config.output_dir.join(name)
    }

    fn export<T: serde::Serialize>(&self, name: &str, rows: &[T]) {
        let path = self.out_path(name);
        if let Err(e) = output::write_csv(&path, rows) {
            eprintln!("Write error: {}", e);
        }
    }

    fn handle_generate_reports(&self) {
        if self.invoices.is_empty() && self.productivity.is_empty() && self.requisitions.is_empty() {
            println!("Error: No data loaded. Please load the sources first (option 1).\n");
            return;
        }
        let top = self.config.top_n;

        if !self.invoices.is_empty() {
            let view = reports::render(&self.filters, &self.invoices);
            println!("Dashboard de Notas Fiscais Recebidas\n");
            println!("Total de Notas: {}", util::format_int(view.total_notes as u64));
            println!("Valor Total: {}\n", util::format_brl(view.total_value));
            if let Some(notice) = &view.notice {
                println!("{}\n", notice);
            } else {
                println!("Evolução Diária dos Valores");
                output::preview_table_rows(&view.daily, 31);
                println!("Status de Pagamento");
                output::preview_table_rows(&view.status_counts, 4);
                println!("Notas Fiscais (mais recentes)");
                output::preview_table_rows(&view.table, top);
                self.export("invoices_filtered.csv", &view.table);
                self.export("monthly_totals.csv", &view.monthly);
            }
            println!("Top Fornecedores por Quantidade de Notas");
            output::preview_table_rows(&view.top_by_count, top);
            println!("Top Fornecedores por Valor Total");
            output::preview_table_rows(&view.top_by_value, top);

            self.export("supplier_totals.csv", &reports::supplier_totals(&self.invoices, usize::MAX));
            self.export("weekly_totals.csv", &reports::period_totals(&self.invoices, Period::Week));
        }

        if !self.productivity.is_empty() {
            let rows = reports::requester_productivity(&self.productivity);
            println!("Produtividade por Usuário (RMs criadas por mês)");
            output::preview_table_rows(&rows, top);
            self.export("requester_productivity.csv", &rows);
        }

        if !self.requisitions.is_empty() {
            let rows = reports::cost_center_lead_times(&self.requisitions);
            println!("Dias entre Autorização da RM e Criação da SC");
            output::preview_table_rows(&rows, top);
            self.export("cost_center_lead_times.csv", &rows);
        }

        let summary = reports::generate_summary(&self.invoices, &self.requisitions);
        let summary_path = self.out_path("summary.json");
        if let Err(e) = output::write_json(&summary_path, &summary) {
            eprintln!("Write error: {}", e);
        }
        println!("Summary Stats ({}):", summary_path.display());
        println!(
            "{{\"total_value\": {}, \"late_payments\": {}}}\n",
            util::format_number(summary.total_value, 2),
            summary.late_payments
        );
    }

    fn handle_filters(&mut self) {
        let suppliers = reports::supplier_options(&self.invoices);
        println!("Fornecedores: {}", suppliers.join(", "));
        let supplier = read_line("Selecionar Fornecedor (vazio = Todos): ");
        self.filters.supplier = if supplier.is_empty() { None } else { Some(supplier) };

        let months = reports::month_options(&self.invoices);
        println!("Meses disponíveis: {}", months.join(", "));
        let picked = read_line("Meses (AAAA-MM separados por vírgula, vazio = todos): ");
        self.filters.months = picked
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect();

        let status = read_line("Status Pagamento (Em Dia/Atrasado/Sem Dados, vazio = todos): ");
        self.filters.status = PaymentStatus::from_label(&status);
        if self.filters.status.is_none() && !status.is_empty() {
            println!("Status desconhecido, filtro ignorado.");
        }
        println!();
    }

    fn handle_clear_cache(&mut self) {
        let n = self.cache.len();
        self.cache.clear();
        info!(entries = n, "cache cleared");
        println!("Cache limpo ({} entradas).\n", n);
    }
}

fn main() {
    logging::init_logging();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = match AppConfig::load(Path::new(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config {}: {}", config_path.display(), e);
            std::process::exit(1);
        }
    };
    let mut app = App::new(config);

    loop {
        println!("Select Option:");
        println!("[1] Load sources");
        println!("[2] Generate Reports");
        println!("[3] Set Filters");
        println!("[4] Clear Cache\n");
        match read_choice().as_str() {
            "1" => app.handle_load(),
            "2" => {
                println!();
                app.handle_generate_reports();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "3" => app.handle_filters(),
            "4" => app.handle_clear_cache(),
            _ => println!("Invalid choice. Please enter 1, 2, 3 or 4.\n"),
        }
    }
}
