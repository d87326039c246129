use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use datachat::ai::{ChatSession, ClientConfig, GeminiClient, RetryPolicy};
use datachat::data::{
    aggregate, analyze_structure, find_duplicate_rows, generate_chart_data, generate_insights,
    load_dataset, paginate, search, sort, suggest_chart_type, validate_data, write_json_content,
};
use datachat::export::{DirectorySink, ExportFormat, ExportSource, Exporter};
use datachat::perf::measure_and_log;
use datachat::settings::SettingsService;
use datachat::types::{AggregationType, ChartConfig, ChartType, Dataset, Row, SortConfig};

#[derive(Parser)]
#[command(name = "datachat", about = "Profile tabular data, ask a model about it, export the answers.")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Inferred column types plus a validation report.
    Profile { file: PathBuf },

    /// Search, sort and page through rows.
    Query {
        file: PathBuf,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        sort: Option<String>,
        #[arg(long, requires = "sort")]
        desc: bool,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 20)]
        page_size: usize,
    },

    /// Group rows and aggregate numeric columns.
    Aggregate {
        file: PathBuf,
        #[arg(long)]
        group_by: String,
        /// `column:op` where op is sum, avg, count, min or max (repeatable).
        #[arg(long = "agg", value_name = "COLUMN:OP", required = true, value_parser = parse_aggregation)]
        aggregations: Vec<(String, AggregationType)>,
    },

    /// Chart data and insights for one chart.
    Chart {
        file: PathBuf,
        /// Chart type; suggested from the data when omitted.
        #[arg(long = "type", value_parser = parse_chart_type)]
        chart_type: Option<ChartType>,
        #[arg(long)]
        x: String,
        #[arg(long)]
        y: Option<String>,
        /// Also render the chart as PNG into this directory.
        #[arg(long, value_name = "DIR")]
        png: Option<PathBuf>,
    },

    /// Convert a markdown file to txt, csv, csv-bom, rtf or png.
    Export {
        file: PathBuf,
        #[arg(long, value_parser = parse_format)]
        format: ExportFormat,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, value_name = "DIR", default_value = ".")]
        out: PathBuf,
    },

    /// Ask the model a question about a data file.
    Ask {
        file: PathBuf,
        question: String,
        /// Retry transient failures with exponential backoff.
        #[arg(long)]
        retry: bool,
    },

    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Store the API key.
    SetKey { key: String },
    /// Print the current settings with the API key masked.
    Show,
}

fn parse_aggregation(spec: &str) -> Result<(String, AggregationType), String> {
    let (column, op) = spec
        .rsplit_once(':')
        .ok_or_else(|| format!("expected COLUMN:OP, got '{}'", spec))?;
    let op = AggregationType::from_name(op).ok_or_else(|| format!("unknown aggregation '{}'", op))?;
    Ok((column.to_string(), op))
}

fn parse_chart_type(name: &str) -> Result<ChartType, String> {
    ChartType::from_name(name).ok_or_else(|| format!("unknown chart type '{}'", name))
}

fn parse_format(name: &str) -> Result<ExportFormat, String> {
    ExportFormat::from_name(name).ok_or_else(|| format!("unknown export format '{}'", name))
}

fn load(path: &Path) -> Result<Dataset> {
    measure_and_log("load_dataset", 200.0, || load_dataset(path))
        .with_context(|| format!("Failed to load {}", path.display()))
}

fn print_rows(rows: &[Row]) {
    println!("{}", write_json_content(rows));
}

fn profile(file: PathBuf) -> Result<()> {
    let dataset = load(&file)?;
    let columns = analyze_structure(&dataset.rows);
    let report = validate_data(&dataset.rows, Some(&columns));

    println!("{}: {} rows", dataset.name, dataset.row_count());
    for column in &columns {
        let mut flags = Vec::new();
        if column.nullable {
            flags.push("nullable");
        }
        if column.unique {
            flags.push("unique");
        }
        println!("  {:<24} {:<8} {}", column.name, column.inferred_type.label(), flags.join(" "));
    }
    println!("valid: {}", report.is_valid);
    for error in &report.errors {
        println!("  error: {}", error);
    }
    for warning in &report.warnings {
        println!("  warning: {}", warning);
    }
    for suggestion in &report.suggestions {
        println!("  suggestion: {}", suggestion);
    }
    let duplicates = find_duplicate_rows(&dataset.rows);
    if !duplicates.is_empty() {
        println!("duplicate rows at: {:?}", duplicates);
    }
    Ok(())
}

fn query(
    file: PathBuf,
    query: Option<String>,
    sort_by: Option<String>,
    desc: bool,
    page: usize,
    page_size: usize,
) -> Result<()> {
    let dataset = load(&file)?;
    let mut rows = match query.as_deref() {
        Some(q) => search(&dataset.rows, q, None),
        None => dataset.rows,
    };
    if let Some(column) = sort_by {
        let config = if desc { SortConfig::desc(column) } else { SortConfig::asc(column) };
        rows = sort(&rows, &config);
    }

    let page = paginate(&rows, page, page_size);
    print_rows(page.items);
    eprintln!(
        "page {} of {} ({} matching rows)",
        page.current_page, page.total_pages, page.total_items
    );
    Ok(())
}

fn chart(
    file: PathBuf,
    chart_type: Option<ChartType>,
    x: String,
    y: Option<String>,
    png: Option<PathBuf>,
) -> Result<()> {
    let dataset = load(&file)?;
    let chart_type = chart_type.unwrap_or_else(|| suggest_chart_type(&dataset.rows, &x, y.as_deref()));

    let mut config = ChartConfig::new(chart_type).with_x(&x).with_title(&dataset.name);
    config.y_axis = y;
    let data = generate_chart_data(&dataset.rows, &config)?;

    println!("{}", serde_json::to_string_pretty(&data)?);
    for insight in generate_insights(&dataset.rows, &config, &data) {
        eprintln!("• {}", insight);
    }

    if let Some(dir) = png {
        let mut exporter = Exporter::new(DirectorySink::new(dir));
        match exporter.export_chart(chart_type, &data, &dataset.name) {
            Some(path) => eprintln!("wrote {}", path.display()),
            None => bail!(failure_message(exporter.toasts())),
        }
    }
    Ok(())
}

fn export(file: PathBuf, format: ExportFormat, title: Option<String>, out: PathBuf) -> Result<()> {
    let markdown = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let title = title.unwrap_or_else(|| {
        file.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let mut exporter = Exporter::new(DirectorySink::new(out));
    match exporter.export(&ExportSource::from(markdown), format, &title) {
        Some(path) => {
            println!("{}", path.display());
            Ok(())
        }
        None => bail!(failure_message(exporter.toasts())),
    }
}

fn failure_message(toasts: &datachat::notifications::ToastManager) -> String {
    toasts
        .latest()
        .map(|t| t.message.clone())
        .unwrap_or_else(|| "Export failed".to_string())
}

async fn ask(file: PathBuf, question: String, retry: bool) -> Result<()> {
    let settings = SettingsService::from_default_location()
        .load()
        .context("Failed to load settings")?;
    if !settings.has_api_key() {
        bail!("No API key configured. Run `datachat config set-key <KEY>` first.");
    }

    let dataset = load(&file)?;
    let client = GeminiClient::new(ClientConfig::from_settings(&settings))?;
    let mut session = ChatSession::new(Arc::new(client));
    if retry {
        session = session.with_retry(RetryPolicy::default());
    }
    session.set_dataset(&dataset);

    let reply = session.ask(&question).await;
    if reply.is_error {
        bail!(reply.content.clone());
    }
    println!("{}", reply.content);
    Ok(())
}

fn config(command: ConfigCommand) -> Result<()> {
    let service = SettingsService::from_default_location();
    match command {
        ConfigCommand::SetKey { key } => {
            service.set_api_key(&key).context("Failed to save API key")?;
            eprintln!("API key saved");
        }
        ConfigCommand::Show => {
            let mut settings = service.load().context("Failed to load settings")?;
            settings.api_key = settings.api_key.map(|key| {
                let tail: String = key.chars().skip(key.chars().count().saturating_sub(4)).collect();
                format!("****{}", tail)
            });
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    datachat::logging::init(cli.verbose);

    match cli.command {
        Command::Profile { file } => profile(file),
        Command::Query {
            file,
            search,
            sort,
            desc,
            page,
            page_size,
        } => query(file, search, sort, desc, page, page_size),
        Command::Aggregate {
            file,
            group_by,
            aggregations,
        } => {
            let dataset = load(&file)?;
            let rows = aggregate(&dataset.rows, &group_by, &aggregations)?;
            print_rows(&rows);
            Ok(())
        }
        Command::Chart {
            file,
            chart_type,
            x,
            y,
            png,
        } => chart(file, chart_type, x, y, png),
        Command::Export {
            file,
            format,
            title,
            out,
        } => export(file, format, title, out),
        Command::Ask {
            file,
            question,
            retry,
        } => ask(file, question, retry).await,
        Command::Config(command) => config(command),
    }
}
