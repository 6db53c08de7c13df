// Command-line presentation layer for the delivery dashboard.
//
// - `dashboard` prints KPI cards and a period table for a date range.
// - `export` writes the period table to CSV and the KPIs to JSON.
// - `series` prints one metric as a chart series.
// - `interactive` is a small menu loop that keeps the loaded data in an
//   explicit cache so repeated views do not re-parse the file.
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use delivery_dashboard::{
    aggregate, default_date_range, filter_by_date_range, output, series, summarize,
    util::{format_int, format_number},
    AggregatedPeriod, DatasetCache, DateRange, EnrichedRecord, Grouping, KpiSummary, LoadReport,
    Metric,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "delivery_dashboard")]
#[command(about = "KPIs and period tables over delivery records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct QueryArgs {
    /// Delivery CSV to load
    #[arg(short, long, default_value = "data/deliveries.csv")]
    data: PathBuf,

    /// First day to include (YYYY-MM-DD); defaults to a year before the last record
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD); defaults to the last record
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Daily, Weekly, Monthly or Quarterly
    #[arg(short, long, default_value = "Weekly")]
    time_frame: Grouping,
}

#[derive(Subcommand)]
enum Commands {
    /// Print KPI cards and the period table
    Dashboard {
        #[command(flatten)]
        query: QueryArgs,

        /// Maximum number of period rows to print
        #[arg(short, long, default_value_t = 20)]
        rows: usize,
    },
    /// Write the period table to CSV and the KPI summary to JSON
    Export {
        #[command(flatten)]
        query: QueryArgs,

        /// Directory to write the files into
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Print a single metric per period, e.g. On_Time_Rate
    Series {
        #[command(flatten)]
        query: QueryArgs,

        /// Column name of the metric
        #[arg(short, long)]
        metric: Metric,
    },
    /// Menu-driven session over one data file
    Interactive {
        /// Delivery CSV to load
        #[arg(short, long, default_value = "data/deliveries.csv")]
        data: PathBuf,
    },
}

/// Result of one dashboard query: the selected window and what it produced.
struct View {
    range: Option<DateRange>,
    time_frame: Grouping,
    summary: KpiSummary,
    periods: Vec<AggregatedPeriod>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();
}

fn resolve_range(
    records: &[EnrichedRecord],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Option<DateRange> {
    let default = default_date_range(records);
    let start = start.or(default.map(|r| r.start))?;
    let end = end.or(default.map(|r| r.end))?;
    if start > end {
        warn!(%start, %end, "start date is after end date; nothing will be selected");
    }
    Some(DateRange { start, end })
}

fn build_view(
    records: &[EnrichedRecord],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    time_frame: Grouping,
) -> View {
    let range = resolve_range(records, start, end);
    let selected = match range {
        Some(r) => filter_by_date_range(records, r.start, r.end),
        None => records.to_vec(),
    };
    info!(
        selected = selected.len(),
        time_frame = %time_frame,
        "building dashboard view"
    );
    View {
        range,
        time_frame,
        summary: summarize(&selected),
        periods: aggregate(&selected, time_frame),
    }
}

fn print_load_report(path: &Path, report: &LoadReport) {
    print!(
        "Processing dataset {}... ({} rows loaded",
        path.display(),
        format_int(report.total_rows)
    );
    match (report.first_date, report.last_date) {
        (Some(first), Some(last)) => println!(", {} to {})\n", first, last),
        _ => println!(")\n"),
    }
}

fn print_view(view: &View, max_rows: usize) {
    match view.range {
        Some(r) => println!("Deliveries from {} to {}\n", r.start, r.end),
        None => println!("Deliveries (no data)\n"),
    }
    output::print_kpi_cards(&view.summary);
    println!("{} Summary\n", view.time_frame);
    output::preview_table_rows(&view.periods, max_rows);
    if view.periods.len() > max_rows {
        println!(
            "({} of {} periods shown)\n",
            max_rows,
            format_int(view.periods.len())
        );
    }
}

fn run_dashboard(cache: &mut DatasetCache, query: &QueryArgs, rows: usize) -> Result<()> {
    let (records, report) = cache
        .get_or_load_with_report(&query.data)
        .with_context(|| format!("failed to load {}", query.data.display()))?;
    print_load_report(&query.data, report);
    let view = build_view(records, query.start, query.end, query.time_frame);
    print_view(&view, rows);
    Ok(())
}

fn run_export(cache: &mut DatasetCache, query: &QueryArgs, out_dir: &Path) -> Result<()> {
    let records = cache
        .get_or_load(&query.data)
        .with_context(|| format!("failed to load {}", query.data.display()))?;
    let view = build_view(records, query.start, query.end, query.time_frame);

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("cannot create {}", out_dir.display()))?;
    let table_file = out_dir.join(format!(
        "aggregated_{}.csv",
        view.time_frame.as_str().to_lowercase()
    ));
    output::write_csv(&table_file, &view.periods)
        .with_context(|| format!("write error: {}", table_file.display()))?;
    let summary_file = out_dir.join("kpi_summary.json");
    output::write_json(&summary_file, &view.summary)
        .with_context(|| format!("write error: {}", summary_file.display()))?;

    println!("Outputs saved:");
    println!("  {} ({} periods)", table_file.display(), view.periods.len());
    println!("  {}", summary_file.display());
    Ok(())
}

fn run_series(cache: &mut DatasetCache, query: &QueryArgs, metric: Metric) -> Result<()> {
    let records = cache
        .get_or_load(&query.data)
        .with_context(|| format!("failed to load {}", query.data.display()))?;
    let view = build_view(records, query.start, query.end, query.time_frame);
    println!("{} by {}\n", metric, view.time_frame);
    for (label, value) in series(&view.periods, metric) {
        println!("{:<12} {:>14}", label, format_number(value, 2));
    }
    Ok(())
}

/// Read a single line of input after printing `prompt`. `None` once the
/// input is closed or unreadable.
fn read_line<R: BufRead>(input: &mut R, prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match input.read_line(&mut buf) {
        Ok(0) => None,
        Ok(_) => Some(buf.trim().to_string()),
        Err(e) => {
            warn!(error = %e, "failed to read input");
            None
        }
    }
}

/// Ask whether to go back to the menu. `Some(true)` for `Y`, `Some(false)`
/// for `N`, `None` when the input ends.
fn prompt_back_to_menu<R: BufRead>(input: &mut R) -> Option<bool> {
    loop {
        match read_line(input, "Back to menu (Y/N): ")?.to_uppercase().as_str() {
            "Y" => return Some(true),
            "N" => return Some(false),
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn prompt_time_frame<R: BufRead>(input: &mut R, current: Grouping) -> Option<Grouping> {
    println!("Time frame is {}. Choose one of: Daily, Weekly, Monthly, Quarterly", current);
    let line = read_line(input, "Enter time frame: ")?;
    match line.parse::<Grouping>() {
        Ok(g) => Some(g),
        Err(e) => {
            println!("{}. Keeping {}.\n", e, current);
            Some(current)
        }
    }
}

/// Menu loop over `data`. Returns when the user quits or the input ends.
fn run_interactive<R: BufRead>(data: &Path, input: &mut R) {
    let mut cache = DatasetCache::new();
    let mut time_frame = Grouping::Weekly;
    let mut loaded = false;

    loop {
        println!("Delivery Dashboard ({})", time_frame);
        println!("[1] Load the file");
        println!("[2] Show dashboard");
        println!("[3] Change time frame\n");
        let Some(choice) = read_line(input, "Enter choice: ") else {
            println!();
            break;
        };
        match choice.as_str() {
            "1" => match cache.get_or_load_with_report(data) {
                Ok((_, report)) => {
                    print_load_report(data, report);
                    loaded = true;
                }
                Err(e) => eprintln!("Failed to load file: {}\n", e),
            },
            "2" => {
                if !loaded {
                    println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
                    continue;
                }
                match cache.get_or_load(data) {
                    Ok(records) => {
                        let view = build_view(records, None, None, time_frame);
                        println!();
                        print_view(&view, 20);
                    }
                    Err(e) => {
                        eprintln!("Failed to reload file: {}\n", e);
                        loaded = false;
                        continue;
                    }
                }
                if prompt_back_to_menu(input) != Some(true) {
                    println!("Exiting the program.");
                    break;
                }
            }
            "3" => match prompt_time_frame(input, time_frame) {
                Some(g) => time_frame = g,
                None => break,
            },
            _ => println!("Invalid choice. Please enter 1, 2 or 3.\n"),
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let mut cache = DatasetCache::new();

    match cli.command {
        Commands::Dashboard { query, rows } => run_dashboard(&mut cache, &query, rows),
        Commands::Export { query, out_dir } => run_export(&mut cache, &query, &out_dir),
        Commands::Series { query, metric } => run_series(&mut cache, &query, metric),
        Commands::Interactive { data } => {
            run_interactive(&data, &mut io::stdin().lock());
            Ok(())
        }
    }
}
