//! Rendering of a report tree as plain text, XML or JSON.

use crate::error::{Error, Result};
use crate::period::Period;
use crate::report::NodeRef;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub const NAME_WIDTH: usize = 40;
pub const AMOUNT_WIDTH: usize = 12;

/// Ratio reported for accounts with nothing budgeted.
pub const UNBUDGETED_RATIO: i64 = 999_999_999;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Text,
    Xml,
    Json,
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Format> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Format::Text),
            "xml" => Ok(Format::Xml),
            "json" => Ok(Format::Json),
            _ => Err(Error::UnknownFormat(s.to_string())),
        }
    }
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Good,
    Ok,
    Over,
    Bad,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Good => "good",
            Status::Ok => "ok",
            Status::Over => "over",
            Status::Bad => "bad",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rounds to cents and fixes the scale at two places.
pub fn cents(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded = Decimal::new(0, 2);
    }
    rounded.rescale(2);
    rounded
}

/// `-1234567.5` becomes `-$1,234,567.50`.
pub fn format_currency(value: Decimal) -> String {
    let amount = cents(value);
    let digits = amount.abs().to_string();
    let (whole, fraction) = match digits.find('.') {
        Some(dot) => (&digits[..dot], &digits[dot + 1..]),
        None => (digits.as_str(), "00"),
    };

    let mut grouped = String::new();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount.is_sign_negative() { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, fraction)
}

pub fn ratio(balance: Decimal, budget: Decimal) -> Decimal {
    if budget.is_zero() {
        return Decimal::new(UNBUDGETED_RATIO, 0);
    }
    balance
        .checked_div(budget)
        .map(|r| r.abs())
        .unwrap_or_else(|| Decimal::new(UNBUDGETED_RATIO, 0))
}

pub fn status(balance: Decimal, budget: Decimal) -> Status {
    if budget.is_zero() {
        return Status::Bad;
    }
    let ratio = ratio(balance, budget);
    if ratio < Decimal::new(9, 1) {
        Status::Good
    } else if ratio < Decimal::new(1, 0) {
        Status::Ok
    } else {
        Status::Over
    }
}

pub fn render(root: NodeRef<'_>, format: Format, period: Period, stylesheet: &str) -> Result<String> {
    match format {
        Format::Text => Ok(render_text(root)),
        Format::Xml => Ok(render_xml(root, period, stylesheet)),
        Format::Json => render_json(root, period),
    }
}

pub fn render_text(root: NodeRef<'_>) -> String {
    TextReport(root).to_string()
}

struct TextReport<'a>(NodeRef<'a>);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.0;
        let label = format!("{}{}", " ".repeat(node.depth()), node.name());
        writeln!(
            f,
            "{:<name$}{}{:>amount$}{:>amount$}",
            label,
            if node.is_flex() { '*' } else { ' ' },
            cents(node.total_balance()).to_string(),
            cents(node.total_budget()).to_string(),
            name = NAME_WIDTH,
            amount = AMOUNT_WIDTH,
        )?;
        for child in node.children() {
            write!(f, "{}", TextReport(child))?;
        }
        Ok(())
    }
}

pub fn render_xml(root: NodeRef<'_>, period: Period, stylesheet: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <?xml-stylesheet type=\"text/xsl\" href=\"{}\"?>\n\
         <budget-report year=\"{}\" month=\"{}\">\n\
         {}</budget-report>\n",
        escape(stylesheet),
        period.year(),
        period.month(),
        XmlNode { node: root, indent: 1 }
    )
}

struct XmlNode<'a> {
    node: NodeRef<'a>,
    indent: usize,
}

impl fmt::Display for XmlNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.node;
        let pad = "  ".repeat(self.indent);
        let balance = node.total_balance();
        let budget = node.total_budget();

        writeln!(
            f,
            "{}<account depth=\"{}\" flex=\"{}\">",
            pad,
            node.depth(),
            node.is_flex()
        )?;
        let fields = [
            ("name", escape(node.name())),
            ("guid", escape(node.guid())),
            ("balance", cents(balance).to_string()),
            ("budget", cents(budget).to_string()),
            ("balance-text", format_currency(balance)),
            ("budget-text", format_currency(budget)),
            ("ratio", ratio(balance, budget).round_dp(4).normalize().to_string()),
            ("status", status(balance, budget).to_string()),
        ];
        for (tag, value) in fields.iter() {
            writeln!(f, "{}  <{}>{}</{}>", pad, tag, value, tag)?;
        }

        writeln!(f, "{}  <children>", pad)?;
        for child in node.children() {
            write!(
                f,
                "{}",
                XmlNode {
                    node: child,
                    indent: self.indent + 2,
                }
            )?;
        }
        writeln!(f, "{}  </children>", pad)?;
        writeln!(f, "{}</account>", pad)
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Serializable snapshot of a report node and its descendants.
#[derive(Serialize, Clone, Debug)]
pub struct ReportEntry {
    pub name: String,
    pub guid: String,
    pub depth: usize,
    pub flex: bool,
    pub balance: Decimal,
    pub budget: Decimal,
    pub balance_text: String,
    pub budget_text: String,
    pub ratio: Decimal,
    pub status: Status,
    pub children: Vec<ReportEntry>,
}

impl From<NodeRef<'_>> for ReportEntry {
    fn from(node: NodeRef<'_>) -> Self {
        let balance = node.total_balance();
        let budget = node.total_budget();
        ReportEntry {
            name: node.name().to_string(),
            guid: node.guid().to_string(),
            depth: node.depth(),
            flex: node.is_flex(),
            balance: cents(balance),
            budget: cents(budget),
            balance_text: format_currency(balance),
            budget_text: format_currency(budget),
            ratio: ratio(balance, budget).round_dp(4).normalize(),
            status: status(balance, budget),
            children: node.children().map(ReportEntry::from).collect(),
        }
    }
}

#[derive(Serialize)]
struct JsonReport {
    year: i32,
    month: u32,
    accounts: ReportEntry,
}

pub fn render_json(root: NodeRef<'_>, period: Period) -> Result<String> {
    let report = JsonReport {
        year: period.year(),
        month: period.month(),
        accounts: ReportEntry::from(root),
    };
    let mut json = serde_json::to_string_pretty(&report)?;
    json.push('\n');
    Ok(json)
}
