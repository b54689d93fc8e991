use anyhow::{bail, Context, Result};
use callsight::analytics::{ExportConfig, ExportFormat, ExportManager, ExportTable, JsonExporter};
use callsight::config::{AppConfig, ConfigManager};
use callsight::io::RecordSource;
use callsight::{logging, DashboardPage, DashboardService, DateRange, Filters, Selection};
use chrono::Utc;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

/// コールセンター分析ダッシュボードのデータを出力する
#[derive(Parser, Debug)]
#[command(author, version, about = "Call-center analytics dashboard", long_about = None)]
struct Args {
    /// Call records file (.ndjson/.jsonl or JSON array)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Date range: all, 7d, 30d, 90d
    #[arg(long)]
    date_range: Option<String>,

    /// Agent ID or "all"
    #[arg(long)]
    agent: Option<String>,

    /// Policy type or "all"
    #[arg(long)]
    policy_type: Option<String>,

    /// Sentiment or "all"
    #[arg(long)]
    sentiment: Option<String>,

    /// Outcome or "all"
    #[arg(long)]
    outcome: Option<String>,

    /// Customer segment or "all"
    #[arg(long)]
    segment: Option<String>,

    /// Dashboard page: all, overview, customer-analytics, agent-performance, operations (json only)
    #[arg(long, default_value = "all")]
    page: String,

    /// Output format: json, csv
    #[arg(short, long)]
    format: Option<ExportFormat>,

    /// CSV table: high-risk, agents, recommendations
    #[arg(long, default_value = "high-risk")]
    table: ExportTable,

    /// Maximum rows per table
    #[arg(long)]
    max_records: Option<usize>,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level override (trace/debug/info/warn/error)
    #[arg(long)]
    log_level: Option<String>,

    /// Print the agents present in the input and exit
    #[arg(long)]
    list_agents: bool,
}

impl Args {
    /// コマンドライン指定で設定のフィルターを上書き
    fn apply_filter_overrides(&self, mut filters: Filters) -> Filters {
        if let Some(raw) = &self.date_range {
            filters.date_range = DateRange::parse(raw);
        }
        if let Some(raw) = &self.agent {
            filters.agent = Selection::parse(raw);
        }
        if let Some(raw) = &self.policy_type {
            filters.policy_type = Selection::parse(raw);
        }
        if let Some(raw) = &self.sentiment {
            filters.sentiment = Selection::parse(raw);
        }
        if let Some(raw) = &self.outcome {
            filters.outcome = Selection::parse(raw);
        }
        if let Some(raw) = &self.segment {
            filters.segment = Selection::parse(raw);
        }
        filters
    }

    fn page(&self) -> Result<Option<DashboardPage>> {
        if self.page.eq_ignore_ascii_case("all") {
            return Ok(None);
        }
        let page = self.page.parse::<DashboardPage>()?;
        Ok(Some(page))
    }
}

fn load_config(args: &Args) -> Result<AppConfig> {
    let manager = match &args.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    manager.load_config()
}

fn write_output(bytes: &[u8], output: Option<&PathBuf>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, bytes)
            .with_context(|| format!("Failed to write output file: {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = load_config(&args)?;
    if let Some(level) = &args.log_level {
        config.log.log_level = level.clone();
    }
    let _guard = logging::init_logging(&config.log)?;

    tracing::info!("Starting callsight");

    let Some(input) = args.input.clone().or_else(|| config.input_file.clone()) else {
        bail!("No input file given (use --input or set input_file in the config)");
    };

    let source = <dyn RecordSource>::from_path(&input);
    let records = source
        .load()
        .with_context(|| format!("Failed to load records from {}", source.describe()))?;

    let filters = args.apply_filter_overrides(config.default_filters.clone());
    let service = DashboardService::new(records).with_filters(filters);

    if args.list_agents {
        let mut listing = String::new();
        for agent in service.agents() {
            listing.push_str(&format!("{}\t{}\n", agent.agent_id, agent.agent_name));
        }
        return write_output(listing.as_bytes(), args.output.as_ref());
    }

    let snapshot = service.snapshot(Utc::now());

    let mut manager = ExportManager::new();
    manager.register_handler(
        ExportFormat::Json,
        Box::new(JsonExporter::new().with_pretty_print(config.export.pretty_print)),
    );

    let export_config = ExportConfig {
        format: args.format.unwrap_or(config.export.format),
        table: args.table,
        page: args.page()?,
        include_metadata: config.export.include_metadata,
        max_records: args.max_records,
    };
    let bytes = manager.export(&snapshot, &export_config)?;
    write_output(&bytes, args.output.as_ref())?;

    tracing::info!(
        records = snapshot.metadata.total_records,
        filtered = snapshot.metadata.filtered_records,
        format = %export_config.format,
        "Dashboard exported"
    );

    Ok(())
}
