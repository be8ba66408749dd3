//! Typed extraction of accounts, transactions and budgets from a GnuCash
//! XML book. The DOM is only walked here; everything downstream works on the
//! extracted records.

use crate::account::AccountRecord;
use crate::budget::{BudgetSlot, BudgetSlotTable};
use crate::error::{Error, Result};
use crate::parser::{parse_date, parse_timestamp, parse_value};
use crate::transaction::{Posting, Transaction};

use roxmltree::{Document, Node};
use std::collections::HashMap;
use tracing::{debug, warn};

const NOTES_KEY: &str = "notes";

/// The records of one ledger book, in document order.
#[derive(Clone, Debug, Default)]
pub struct Book {
    pub accounts: Vec<AccountRecord>,
    pub transactions: Vec<Transaction>,
    pub budgets: Vec<BudgetSlotTable>,
}

impl Book {
    pub fn parse(text: &str) -> Result<Book> {
        let document = Document::parse(text)?;
        let root = document.root_element();
        // Template transactions sit beside the book and carry their own root
        // account, so only direct children of the book are read.
        let book_node = root
            .descendants()
            .find(|n| is_tag(n, "book"))
            .unwrap_or(root);

        let mut book = Book::default();
        for node in book_node.children().filter(Node::is_element) {
            match node.tag_name().name() {
                "account" => book.accounts.push(account(node)?),
                "transaction" => book.transactions.push(transaction(node)?),
                "budget" => book.budgets.push(budget(node)?),
                _ => {}
            }
        }

        debug!(
            accounts = book.accounts.len(),
            transactions = book.transactions.len(),
            budgets = book.budgets.len(),
            "ledger book extracted"
        );
        Ok(book)
    }
}

fn is_tag(node: &Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|c| is_tag(c, name))
}

fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |c| is_tag(c, name))
}

fn text<'a>(node: Node<'a, '_>) -> &'a str {
    node.text().map(str::trim).unwrap_or("")
}

fn child_text<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    child(node, name).map(text)
}

fn required_text<'a>(node: Node<'a, '_>, name: &str, context: &str) -> Result<&'a str> {
    child_text(node, name).ok_or_else(|| Error::MissingElement {
        element: name.to_string(),
        context: context.to_string(),
    })
}

/// Finds the `slot:value` of the `slot` whose `slot:key` equals `key`.
fn slot_value<'a, 'input>(slots: Node<'a, 'input>, key: &str) -> Option<Node<'a, 'input>> {
    children(slots, "slot")
        .find(|slot| child_text(*slot, "key") == Some(key))
        .and_then(|slot| child(slot, "value"))
}

fn account(node: Node) -> Result<AccountRecord> {
    let id = required_text(node, "id", "account")?.to_string();
    let name = required_text(node, "name", &format!("account {}", id))?.to_string();
    let parent_id = child_text(node, "parent")
        .filter(|parent| !parent.is_empty())
        .map(str::to_string);
    let notes = child(node, "slots")
        .and_then(|slots| slot_value(slots, NOTES_KEY))
        .map(|value| text(value).to_string());

    Ok(AccountRecord {
        id,
        name,
        parent_id,
        notes,
    })
}

fn transaction(node: Node) -> Result<Transaction> {
    let context = format!("transaction {}", child_text(node, "id").unwrap_or("?"));
    let posted = child(node, "date-posted")
        .and_then(|posted| child_text(posted, "date"))
        .ok_or_else(|| Error::MissingElement {
            element: "trn:date-posted".to_string(),
            context: context.clone(),
        })?;
    let timestamp = parse_timestamp(posted)?;

    let mut postings = Vec::new();
    if let Some(splits) = child(node, "splits") {
        for split in children(splits, "split") {
            postings.push(Posting {
                account_id: required_text(split, "account", &context)?.to_string(),
                amount: parse_value(required_text(split, "value", &context)?)?,
            });
        }
    }

    Ok(Transaction {
        posted: timestamp.local,
        utc_offset_minutes: timestamp.utc_offset_minutes,
        postings,
    })
}

fn budget(node: Node) -> Result<BudgetSlotTable> {
    let name = child_text(node, "name").unwrap_or("").to_string();
    let context = format!("budget {}", name);
    let start = child(node, "recurrence")
        .and_then(|recurrence| child(recurrence, "start"))
        .and_then(|start| child_text(start, "gdate"))
        .ok_or_else(|| Error::MissingElement {
            element: "bgt:recurrence/recurrence:start".to_string(),
            context: context.clone(),
        })?;
    let num_periods = child_text(node, "num-periods").and_then(|n| n.parse().ok());

    let mut accounts = HashMap::new();
    if let Some(slots) = child(node, "slots") {
        for entry in children(slots, "slot") {
            let account = required_text(entry, "key", &context)?;
            let frame = match child(entry, "value") {
                Some(frame) => frame,
                None => continue,
            };
            accounts.insert(account.to_string(), budget_slots(account, frame));
        }
    }

    Ok(BudgetSlotTable {
        name,
        start: parse_date(start)?,
        num_periods,
        accounts,
    })
}

// Undecodable period entries are skipped; the account then budgets zero for
// that period.
fn budget_slots(account: &str, frame: Node) -> Vec<BudgetSlot> {
    children(frame, "slot")
        .filter_map(|slot| {
            let key = child_text(slot, "key")?;
            let value = child_text(slot, "value")?;
            match (key.parse::<i64>(), parse_value(value)) {
                (Ok(index), Ok(amount)) => Some(BudgetSlot { index, amount }),
                _ => {
                    warn!(account, key, value, "skipping undecodable budget slot");
                    None
                }
            }
        })
        .collect()
}
