use institutional_flows::analytics::sentiment::MissingViewPolicy;
use institutional_flows::config::Config;
use institutional_flows::analytics::{DatedSeries, Outcome};
use institutional_flows::models::row::Cell;
use institutional_flows::models::snapshot::Participant;
use institutional_flows::services::analysis_service::{AnalysisService, FlowReport, ReportOptions};
use institutional_flows::sources::source_from_config;
use institutional_flows::util::{arrow_utils, parse_cli_date};
use institutional_flows::TableView;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Arg, ArgMatches, Command};
use log::info;

const DEFAULT_TABLE_COLUMNS: &str =
    "nifty,nifty_change_percent,fii_cash_net,dii_cash_net,fii_cumulative_net,dii_cumulative_net";

fn source_arg() -> Arg<'static> {
    Arg::new("source")
        .short('s')
        .long("source")
        .value_name("PATH_OR_URL")
        .help("Snapshot JSON file or HTTP(S) URL")
        .takes_value(true)
        .required(true)
}

fn range_args() -> [Arg<'static>; 2] {
    [
        Arg::new("from")
            .long("from")
            .value_name("DATE")
            .help("Start date, inclusive (YYYY-MM-DD)")
            .takes_value(true),
        Arg::new("to")
            .long("to")
            .value_name("DATE")
            .help("End date, inclusive (YYYY-MM-DD)")
            .takes_value(true),
    ]
}

fn date_range(matches: &ArgMatches) -> anyhow::Result<(Option<NaiveDate>, Option<NaiveDate>)> {
    let parse = |name: &str| -> anyhow::Result<Option<NaiveDate>> {
        matches
            .value_of(name)
            .map(|s| parse_cli_date(s).with_context(|| format!("--{} expects YYYY-MM-DD", name)))
            .transpose()
    };
    Ok((parse("from")?, parse("to")?))
}

fn print_table(view: &TableView<'_>, columns: &[&str], limit: usize) {
    let known: Vec<(&str, usize)> = columns
        .iter()
        .filter_map(|name| view.table().column_index(name).map(|i| (*name, i)))
        .collect();

    print!("{:<12}", "date");
    for (name, _) in &known {
        print!(" {:>22}", name);
    }
    println!();
    println!("{:-<1$}", "", 12 + known.len() * 23);

    let skip = view.len().saturating_sub(limit);
    for row in view.rows().iter().skip(skip) {
        print!("{:<12}", row.date.format("%Y-%m-%d"));
        for (_, i) in &known {
            let text = row.cell(*i).map(Cell::to_string).unwrap_or_else(|| "-".to_string());
            print!(" {:>22}", text);
        }
        println!();
    }

    if skip > 0 {
        println!("... {} earlier rows not shown", skip);
    }
}

fn describe_last(outcome: &Outcome<DatedSeries>) -> String {
    match outcome {
        Outcome::Value(series) => match series.last_present() {
            Some((date, value)) => format!("{:.2} ({})", value, date),
            None => "-".to_string(),
        },
        Outcome::InsufficientHistory { required, available } => {
            format!("insufficient history ({} of {} rows)", available, required)
        }
        Outcome::ColumnUnavailable { column } => format!("{} not available", column),
        Outcome::ZeroVariance { column } => format!("{} is constant", column),
    }
}

fn print_report(report: &FlowReport) {
    println!("{} | {} rows", report.as_of_label, report.rows);
    if let (Some(from), Some(to)) = (report.from, report.to) {
        println!("{} .. {}", from, to);
    }

    let metrics = &report.key_metrics;
    println!();
    for (label, flow) in [("FII cash net", metrics.fii_cash_net), ("DII cash net", metrics.dii_cash_net)] {
        match flow {
            Some(flow) => println!("{:<14} {:>12.2} {}", label, flow.value, flow.trend.arrow()),
            None => println!("{:<14} {:>12}", label, "N/A"),
        }
    }
    for (label, index) in [("NIFTY", metrics.nifty), ("BANKNIFTY", metrics.banknifty)] {
        if let Some(index) = index {
            let change = index
                .change_percent
                .map(|c| format!("{:+.2}%", c))
                .unwrap_or_else(|| "N/A".to_string());
            println!("{:<14} {:>12.2} {}", label, index.level, change);
        }
    }

    println!();
    println!("{:<14} {:<10} {:<22} {:<10} {:<22}", "segment", "FII", "FII view", "DII", "DII view");
    for activity in &report.activity {
        println!(
            "{:<14} {:<10} {:<22} {:<10} {:<22}",
            activity.segment, activity.fii_action, activity.fii_view, activity.dii_action, activity.dii_view
        );
    }

    println!();
    println!("MA({})          {}", report.window, describe_last(&report.moving_average));
    println!("STD({})         {}", report.window, describe_last(&report.rolling_std_dev));
    println!("VOL({})         {}", report.volatility_window, describe_last(&report.volatility));
    println!("FII cumulative {}", describe_last(&report.fii_cumulative_net));
    println!("DII cumulative {}", describe_last(&report.dii_cumulative_net));
    for entry in &report.sentiment {
        println!("{} sentiment  {}", entry.participant.label(), describe_last(&entry.scores));
    }

    println!();
    for entry in &report.correlations {
        match &entry.result {
            Outcome::Value(c) => println!(
                "corr({}, {}) = {:.3}  p = {:.4}  n = {}",
                entry.a, entry.b, c.coefficient, c.p_value, c.observations
            ),
            Outcome::InsufficientHistory { required, available } => println!(
                "corr({}, {}): insufficient history ({} of {} pairs)",
                entry.a, entry.b, available, required
            ),
            Outcome::ColumnUnavailable { column } => {
                println!("corr({}, {}): {} not available", entry.a, entry.b, column)
            }
            Outcome::ZeroVariance { column } => {
                println!("corr({}, {}): {} is constant", entry.a, entry.b, column)
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init();

    let app = Command::new("institutional_flows")
        .version(env!("CARGO_PKG_VERSION"))
        .about("FII/DII activity normalization and analytics")
        .subcommand_required(true)
        .subcommand(
            Command::new("table")
                .about("Print the canonical table")
                .arg(source_arg())
                .args(range_args())
                .arg(
                    Arg::new("columns")
                        .short('c')
                        .long("columns")
                        .value_name("COLUMNS")
                        .help("Comma separated column names, or 'all'")
                        .takes_value(true)
                        .default_value(DEFAULT_TABLE_COLUMNS),
                )
                .arg(
                    Arg::new("limit")
                        .short('l')
                        .long("limit")
                        .value_name("LIMIT")
                        .help("Show only the latest N rows")
                        .takes_value(true)
                        .default_value("20"),
                ),
        )
        .subcommand(
            Command::new("analyze")
                .about("Compute key metrics, rolling statistics, sentiment and correlations")
                .arg(source_arg())
                .args(range_args())
                .arg(
                    Arg::new("column")
                        .long("column")
                        .value_name("COLUMN")
                        .help("Column for rolling statistics")
                        .takes_value(true)
                        .default_value("fii_cash_net"),
                )
                .arg(
                    Arg::new("window")
                        .short('w')
                        .long("window")
                        .value_name("WINDOW")
                        .help("Rolling window size")
                        .takes_value(true)
                        .default_value("5"),
                )
                .arg(
                    Arg::new("volatility-window")
                        .long("volatility-window")
                        .value_name("WINDOW")
                        .help("Volatility window size")
                        .takes_value(true)
                        .default_value("5"),
                )
                .arg(
                    Arg::new("correlate")
                        .long("correlate")
                        .value_name("A,B")
                        .help("Column pair to correlate, can be repeated")
                        .takes_value(true)
                        .multiple_occurrences(true),
                )
                .arg(
                    Arg::new("sentiment")
                        .long("sentiment")
                        .value_name("PARTICIPANT")
                        .help("Limit composite sentiment to one participant")
                        .takes_value(true)
                        .possible_values(["fii", "dii"]),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the full report as JSON")
                        .takes_value(false),
                )
                .arg(
                    Arg::new("matrix")
                        .long("matrix")
                        .help("Include the full correlation matrix")
                        .takes_value(false),
                )
                .arg(
                    Arg::new("skip-missing-views")
                        .long("skip-missing-views")
                        .help("Leave sentiment missing instead of scoring absent views as 0")
                        .takes_value(false),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export the canonical table as Arrow IPC or JSON rows")
                .arg(source_arg())
                .args(range_args())
                .arg(
                    Arg::new("format")
                        .short('f')
                        .long("format")
                        .value_name("FORMAT")
                        .help("ipc or json")
                        .takes_value(true)
                        .possible_values(["ipc", "json"])
                        .default_value("ipc"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("PATH")
                        .help("Output file")
                        .takes_value(true)
                        .required(true),
                ),
        );

    let matches = app.get_matches();
    let (name, sub) = matches
        .subcommand()
        .context("No command specified. Use --help for usage information.")?;

    let mut config = Config::new().with_source(sub.value_of("source").unwrap_or_default());
    if name == "analyze" {
        let window = sub.value_of("window").unwrap_or("5").parse::<usize>()
            .context("--window expects a positive integer")?;
        let volatility_window = sub.value_of("volatility-window").unwrap_or("5").parse::<usize>()
            .context("--volatility-window expects a positive integer")?;
        let policy = if sub.is_present("skip-missing-views") {
            MissingViewPolicy::Skip
        } else {
            MissingViewPolicy::Neutral
        };
        config = config
            .with_rolling_window(window)
            .with_volatility_window(volatility_window)
            .with_missing_view_policy(policy);
    }

    let source = source_from_config(&config)?;
    let mut service = AnalysisService::new(config, source);
    let (start, end) = date_range(sub)?;

    match name {
        "table" => {
            let table = service.load_table().await?;
            if table.is_empty() {
                println!("No data available");
                return Ok(());
            }
            let view = table.between(start, end);
            let limit = sub.value_of("limit").unwrap_or("20").parse::<usize>().unwrap_or(20);
            let requested = sub.value_of("columns").unwrap_or(DEFAULT_TABLE_COLUMNS);
            let columns: Vec<&str> = if requested == "all" {
                table.column_names().collect()
            } else {
                requested.split(',').map(str::trim).collect()
            };
            info!("Showing {} of {} rows", view.len().min(limit), view.len());
            print_table(&view, &columns, limit);
        }
        "analyze" => {
            let mut options = ReportOptions {
                start,
                end,
                column: sub.value_of("column").unwrap_or("fii_cash_net").to_string(),
                include_matrix: sub.is_present("matrix"),
                ..ReportOptions::default()
            };
            if let Some(pairs) = sub.values_of("correlate") {
                options.correlations = pairs
                    .map(|pair| match pair.split_once(',') {
                        Some((a, b)) => Ok((a.trim().to_string(), b.trim().to_string())),
                        None => bail!("--correlate expects A,B but got {:?}", pair),
                    })
                    .collect::<anyhow::Result<_>>()?;
            }
            if let Some(participant) = sub.value_of("sentiment").and_then(Participant::parse) {
                options.participants = vec![participant];
            }
            let report = service.report(&options).await?;
            if sub.is_present("json") {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
                if let Some(matrix) = &report.matrix {
                    println!();
                    println!("{}", serde_json::to_string_pretty(matrix)?);
                }
            }
        }
        "export" => {
            let table = service.load_table().await?;
            let view = table.between(start, end);
            let bytes = match sub.value_of("format") {
                Some("json") => arrow_utils::table_to_json_rows(&view)?,
                _ => arrow_utils::table_to_ipc_bytes(&view)?,
            };
            let output = sub.value_of("output").unwrap_or_default();
            std::fs::write(output, &bytes).with_context(|| format!("writing {}", output))?;
            info!("Exported {} rows to {}", view.len(), output);
        }
        other => bail!("Unknown command: {}", other),
    }

    Ok(())
}
