use std::path::PathBuf;
use thiserror::Error;

/// Failures raised while decoding a ledger or building a report from it.
#[derive(Debug, Error)]
pub enum Error {
    #[error("ledger file \"{}\" not found", .0.display())]
    SourceNotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed ledger document: {0}")]
    DocumentParse(#[from] roxmltree::Error),
    #[error("account {account} already has parent {existing}, cannot attach to {requested}")]
    ConflictingParent {
        account: String,
        existing: String,
        requested: String,
    },
    #[error("account {account} refers to unknown parent {parent}")]
    UnknownParent { account: String, parent: String },
    #[error("attaching account {account} to {parent} would create a cycle")]
    CyclicParent { account: String, parent: String },
    #[error("ledger has no root account")]
    MissingRoot,
    #[error("ledger has more than one root account: {}", .0.join(", "))]
    MultipleRoots(Vec<String>),
    #[error("missing <{element}> in {context}")]
    MissingElement { element: String, context: String },
    #[error("invalid numeric value \"{0}\"")]
    InvalidValue(String),
    #[error("amount total for account {0} overflows")]
    AmountOverflow(String),
    #[error("invalid date \"{0}\"")]
    InvalidDate(String),
    #[error("invalid report period {year}-{month:02}")]
    InvalidPeriod { year: i32, month: u32 },
    #[error("no budget named \"{0}\" in ledger")]
    BudgetNotFound(String),
    #[error("unknown report format \"{0}\" (expected text, xml or json)")]
    UnknownFormat(String),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
