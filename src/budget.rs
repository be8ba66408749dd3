use crate::error::{Error, Result};
use crate::period::Period;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::{info, warn};

#[derive(Clone, Debug, PartialEq)]
pub struct BudgetSlot {
    pub index: i64,
    pub amount: Decimal,
}

/// A budget decoded from the ledger: its anchor date and the per-period
/// slots of every budgeted account.
#[derive(Clone, Debug, PartialEq)]
pub struct BudgetSlotTable {
    pub name: String,
    pub start: NaiveDate,
    pub num_periods: Option<u32>,
    pub accounts: HashMap<String, Vec<BudgetSlot>>,
}

/// Budgeted amount per account for one period. Absent accounts budget zero.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BudgetAmounts(HashMap<String, Decimal>);

impl BudgetAmounts {
    pub fn get(&self, account_id: &str) -> Decimal {
        self.0
            .get(account_id)
            .copied()
            .unwrap_or_else(|| Decimal::new(0, 2))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Maps a date to a budget slot: `floor(elapsed_days * 12 / 365.25)`.
///
/// Computed as `floor(elapsed_days * 48 / 1461)` in integers, which is the
/// same quotient without floating point rounding.
pub fn slot_index(anchor: NaiveDate, date: NaiveDate) -> i64 {
    let elapsed = date.signed_duration_since(anchor).num_days();
    (elapsed * 48).div_euclid(1461)
}

impl BudgetSlotTable {
    pub fn slot_for(&self, period: Period) -> Result<i64> {
        Ok(slot_index(self.start, period.first_day()?))
    }

    pub fn amounts_for(&self, period: Period) -> Result<BudgetAmounts> {
        let slot = self.slot_for(period)?;
        info!(budget = %self.name, %period, slot, "decoding budget period");
        if let Some(periods) = self.num_periods {
            if slot < 0 || slot >= i64::from(periods) {
                warn!(budget = %self.name, slot, periods, "period lies outside the budget");
            }
        }
        let amounts = self
            .accounts
            .iter()
            .filter_map(|(account, slots)| {
                slots
                    .iter()
                    .find(|s| s.index == slot)
                    .map(|s| (account.clone(), s.amount))
            })
            .collect();
        Ok(BudgetAmounts(amounts))
    }
}

/// Picks the named budget, or the first one when no name is given.
pub fn select<'a>(
    budgets: &'a [BudgetSlotTable],
    name: Option<&str>,
) -> Result<Option<&'a BudgetSlotTable>> {
    match name {
        Some(name) => budgets
            .iter()
            .find(|b| b.name == name)
            .map(Some)
            .ok_or_else(|| Error::BudgetNotFound(name.to_string())),
        None => Ok(budgets.first()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn table(name: &str) -> BudgetSlotTable {
        let mut accounts = HashMap::new();
        accounts.insert(
            "food".to_string(),
            vec![
                BudgetSlot {
                    index: 0,
                    amount: Decimal::new(9000, 2),
                },
                BudgetSlot {
                    index: 12,
                    amount: Decimal::new(10000, 2),
                },
            ],
        );
        accounts.insert(
            "rent".to_string(),
            vec![BudgetSlot {
                index: 0,
                amount: Decimal::new(90000, 2),
            }],
        );
        BudgetSlotTable {
            name: name.to_string(),
            start: date(2020, 1, 1),
            num_periods: Some(24),
            accounts,
        }
    }

    #[test]
    fn slot_index_spans_leap_year() {
        assert_eq!(slot_index(date(2020, 1, 1), date(2021, 1, 1)), 12);
        assert_eq!(slot_index(date(2020, 1, 1), date(2020, 1, 1)), 0);
        assert_eq!(slot_index(date(2020, 1, 1), date(2020, 2, 1)), 1);
        assert_eq!(slot_index(date(2020, 1, 1), date(2019, 12, 1)), -2);
    }

    #[test]
    fn slot_index_follows_mean_month_not_calendar_months() {
        // 30 days is just short of a mean month.
        assert_eq!(slot_index(date(2021, 2, 1), date(2021, 3, 3)), 0);
        assert_eq!(slot_index(date(2021, 2, 1), date(2021, 3, 4)), 1);
    }

    #[test]
    fn amounts_only_cover_matching_slot() {
        let amounts = table("Household")
            .amounts_for(Period::new(2021, 1).unwrap())
            .unwrap();
        assert_eq!(amounts.len(), 1);
        assert_eq!(amounts.get("food"), Decimal::new(100, 0));
        assert!(amounts.get("rent").is_zero());
        assert!(amounts.get("unknown").is_zero());
    }

    #[test]
    fn period_past_the_budget_has_no_amounts() {
        let table = table("Household");
        let period = Period::new(2023, 1).unwrap();
        assert_eq!(table.slot_for(period).unwrap(), 36);
        assert!(table.amounts_for(period).unwrap().is_empty());
    }

    #[test]
    fn selects_budget_by_name_or_first() {
        let budgets = vec![table("A"), table("B")];
        assert_eq!(select(&budgets, None).unwrap().unwrap().name, "A");
        assert_eq!(select(&budgets, Some("B")).unwrap().unwrap().name, "B");
        assert!(matches!(
            select(&budgets, Some("C")),
            Err(Error::BudgetNotFound(_))
        ));
        assert!(select(&[], None).unwrap().is_none());
    }
}
