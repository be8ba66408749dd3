use docopt::Docopt;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use libgnucash::framing::needs_refresh;
use libgnucash::{build_report, format, Format, Period, ReportConfig};

const USAGE: &str = "
GnuCash Budget Report

Usage:
  gnucash-report <ledger> [--output=<file>] [--year=<year>] [--month=<month>] [--budget=<name>] [--format=<fmt>] [--force]
  gnucash-report (-h | --help)
  gnucash-report --version

Options:
  -h --help                 Show this screen.
  --version                 Show version.
  -o --output=<file>        Write the report to <file> instead of stdout.
  --year=<year>             Report year, defaults to the current year.
  --month=<month>           Report month (1-12), defaults to the current month.
  --budget=<name>           Budget to report against, defaults to the first one.
  --format=<fmt>            text, xml or json.
  -f --force                Regenerate even if the output is newer than the ledger.
";

#[derive(Debug, Deserialize)]
struct Args {
    arg_ledger: String,
    flag_output: Option<String>,
    flag_year: Option<i32>,
    flag_month: Option<u32>,
    flag_budget: Option<String>,
    flag_format: Option<String>,
    flag_force: bool,
}

fn main() {
    let args: Args = Docopt::new(USAGE)
        .and_then(|d| {
            d.version(Some(env!("CARGO_PKG_VERSION").to_string()))
                .deserialize()
        })
        .unwrap_or_else(|e| e.exit());

    libgnucash::init_tracing();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = Path::new(&args.arg_ledger);
    let output = args.flag_output.as_deref().map(Path::new);

    if let Some(output) = output {
        if !args.flag_force && !needs_refresh(ledger, output)? {
            println!("Report already updated");
            return Ok(());
        }
    }

    let current = Period::current();
    let period = Period::new(
        args.flag_year.unwrap_or_else(|| current.year()),
        args.flag_month.unwrap_or_else(|| current.month()),
    )?;
    let mut config = ReportConfig::new(period);
    if let Some(name) = &args.flag_budget {
        config = config.with_budget(name.as_str());
    }

    let report_format = match &args.flag_format {
        Some(name) => name.parse::<Format>()?,
        None => match output.and_then(|o| o.extension()) {
            Some(ext) if ext == "xml" => Format::Xml,
            Some(ext) if ext == "json" => Format::Json,
            _ => Format::Text,
        },
    };

    let tree = build_report(ledger, &config)?;
    let stylesheet = format!(
        "{}.xsl",
        ledger
            .file_stem()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default()
    );
    let rendered = format::render(tree.root(), report_format, period, &stylesheet)?;

    match output {
        Some(output) => fs::write(output, rendered)?,
        None => print!("{}", rendered),
    }
    Ok(())
}
