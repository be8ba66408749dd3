//! Budget-versus-actual reports straight from GnuCash XML ledgers.

pub mod account;
pub mod budget;
pub mod config;
pub mod document;
pub mod error;
pub mod format;
pub mod framing;
pub mod parser;
pub mod period;
pub mod report;
pub mod transaction;

pub use config::ReportConfig;
pub use error::{Error, Result};
pub use format::Format;
pub use period::Period;
pub use report::ReportTree;

use account::AccountTree;
use budget::BudgetAmounts;
use document::Book;
use std::path::Path;
use std::sync::Once;
use tracing::info;
use transaction::Ledger;

static INIT_TRACING: Once = Once::new();

/// Installs a stderr subscriber honouring `RUST_LOG`.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("libgnucash=info,gnucash_report=info"));
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    });
}

/// Builds the report tree for `config.period` from the ledger at `path`.
pub fn build_report(path: &Path, config: &ReportConfig) -> Result<ReportTree> {
    let text = framing::open_source(path)?;
    let book = Book::parse(&text)?;
    report_from_book(&book, config)
}

pub fn report_from_book(book: &Book, config: &ReportConfig) -> Result<ReportTree> {
    let accounts = AccountTree::build(&book.accounts)?;
    let ledger = Ledger::new(&book.transactions);
    let budgets = match budget::select(&book.budgets, config.budget_name.as_deref())? {
        Some(table) => table.amounts_for(config.period)?,
        None => {
            info!("ledger has no budget, reporting against zero");
            BudgetAmounts::default()
        }
    };

    let (start, end) = config.period.window()?;
    info!(period = %config.period, %start, %end, "building report");
    ReportTree::build(
        &accounts,
        |id| ledger.balance_of(id, start, end),
        &budgets,
        &config.flex_marker,
    )
}
