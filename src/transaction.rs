use crate::error::{Error, Result};

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::debug;

/// One side of a transaction, attributing a signed amount to an account.
#[derive(Clone, Debug, PartialEq)]
pub struct Posting {
    pub account_id: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Transaction {
    pub posted: NaiveDateTime,
    /// Offset written next to the posted date. Window comparisons use the
    /// local `posted` value and do not apply it.
    pub utc_offset_minutes: Option<i32>,
    pub postings: Vec<Posting>,
}

/// Per-account, time-ordered posting index over a set of transactions.
#[derive(Clone, Debug, Default)]
pub struct Ledger {
    postings: HashMap<String, Vec<(NaiveDateTime, Decimal)>>,
}

impl Ledger {
    pub fn new(transactions: &[Transaction]) -> Ledger {
        let mut postings: HashMap<String, Vec<(NaiveDateTime, Decimal)>> = HashMap::new();
        for transaction in transactions {
            for posting in &transaction.postings {
                postings
                    .entry(posting.account_id.clone())
                    .or_default()
                    .push((transaction.posted, posting.amount));
            }
        }
        for entries in postings.values_mut() {
            entries.sort_by_key(|&(posted, _)| posted);
        }
        debug!(
            transactions = transactions.len(),
            accounts = postings.len(),
            "posting index built"
        );
        Ledger { postings }
    }

    /// Sum of the amounts posted to `account_id` between `start` and `end`,
    /// both inclusive.
    pub fn balance_of(
        &self,
        account_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Decimal> {
        let entries = match self.postings.get(account_id) {
            Some(entries) if start <= end => entries,
            _ => return Ok(Decimal::new(0, 2)),
        };
        let lower = entries.partition_point(|&(posted, _)| posted < start);
        let upper = entries.partition_point(|&(posted, _)| posted <= end);
        entries[lower..upper]
            .iter()
            .try_fold(Decimal::new(0, 2), |sum, &(_, amount)| {
                sum.checked_add(amount)
                    .ok_or_else(|| Error::AmountOverflow(account_id.to_string()))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn transaction(posted: NaiveDateTime, postings: &[(&str, i64)]) -> Transaction {
        Transaction {
            posted,
            utc_offset_minutes: Some(0),
            postings: postings
                .iter()
                .map(|&(account, cents)| Posting {
                    account_id: account.to_string(),
                    amount: Decimal::new(cents, 2),
                })
                .collect(),
        }
    }

    #[test]
    fn sums_postings_inside_inclusive_window() {
        let ledger = Ledger::new(&[
            transaction(at(2021, 1, 20, 10), &[("food", -2500), ("bank", 2500)]),
            transaction(at(2021, 1, 5, 10), &[("food", -5000), ("bank", 5000)]),
            transaction(at(2021, 2, 1, 0), &[("food", -1000)]),
            transaction(at(2020, 12, 30, 23), &[("food", -700)]),
        ]);
        let start = at(2020, 12, 31, 0);
        let end = at(2021, 2, 1, 0);
        assert_eq!(
            ledger.balance_of("food", start, end).unwrap(),
            Decimal::new(-8500, 2)
        );
        assert_eq!(
            ledger.balance_of("bank", start, end).unwrap(),
            Decimal::new(7500, 2)
        );
    }

    #[test]
    fn unknown_account_or_empty_window_is_zero() {
        let ledger = Ledger::new(&[transaction(at(2021, 1, 5, 10), &[("food", -5000)])]);
        let start = at(2021, 1, 1, 0);
        let end = at(2021, 1, 31, 0);
        assert!(ledger.balance_of("rent", start, end).unwrap().is_zero());
        assert!(ledger.balance_of("food", end, start).unwrap().is_zero());
    }

    #[test]
    fn overflowing_sum_is_an_error() {
        let huge = Transaction {
            posted: at(2021, 1, 5, 10),
            utc_offset_minutes: None,
            postings: vec![Posting {
                account_id: "food".to_string(),
                amount: Decimal::from(7_000_000_000_000_000_000i64)
                    * Decimal::from(1_000_000_000i64),
            }],
        };
        let ledger = Ledger::new(&vec![huge; 12]);
        match ledger.balance_of("food", at(2021, 1, 1, 0), at(2021, 1, 31, 0)) {
            Err(Error::AmountOverflow(account)) => assert_eq!(account, "food"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
