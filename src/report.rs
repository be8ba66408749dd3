use crate::account::AccountTree;
use crate::budget::BudgetAmounts;
use crate::error::{Error, Result};

use rust_decimal::Decimal;

#[derive(Clone, Debug, PartialEq)]
pub struct ReportNode {
    pub name: String,
    pub guid: String,
    pub own_balance: Decimal,
    pub own_budget: Decimal,
    pub own_flex: bool,
    total_balance: Decimal,
    total_budget: Decimal,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Budget report with the same shape as the account hierarchy. Node 0 is
/// the root.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportTree {
    nodes: Vec<ReportNode>,
}

impl ReportTree {
    /// Walks `accounts` in pre-order, taking each account's own balance from
    /// `balance` and its own budget from `budgets`. Rollups are summed once
    /// here, so an overflowing total fails the build instead of a later read.
    pub fn build<F>(
        accounts: &AccountTree,
        balance: F,
        budgets: &BudgetAmounts,
        flex_marker: &str,
    ) -> Result<ReportTree>
    where
        F: Fn(&str) -> Result<Decimal>,
    {
        let mut tree = ReportTree { nodes: Vec::new() };
        tree.add(accounts, accounts.root(), None, &balance, budgets, flex_marker)?;
        Ok(tree)
    }

    fn add<F>(
        &mut self,
        accounts: &AccountTree,
        account: usize,
        parent: Option<usize>,
        balance: &F,
        budgets: &BudgetAmounts,
        flex_marker: &str,
    ) -> Result<usize>
    where
        F: Fn(&str) -> Result<Decimal>,
    {
        let source = accounts.node(account);
        let own_balance = balance(source.id())?;
        let own_budget = budgets.get(source.id());
        let idx = self.nodes.len();
        self.nodes.push(ReportNode {
            name: source.name().to_string(),
            guid: source.id().to_string(),
            own_balance,
            own_budget,
            own_flex: source.record.has_marker(flex_marker),
            total_balance: own_balance,
            total_budget: own_budget,
            parent,
            children: Vec::new(),
        });

        let mut total_balance = own_balance;
        let mut total_budget = own_budget;
        for &child in source.children() {
            let child_idx = self.add(accounts, child, Some(idx), balance, budgets, flex_marker)?;
            let overflow = || Error::AmountOverflow(source.id().to_string());
            total_balance = total_balance
                .checked_add(self.nodes[child_idx].total_balance)
                .ok_or_else(overflow)?;
            total_budget = total_budget
                .checked_add(self.nodes[child_idx].total_budget)
                .ok_or_else(overflow)?;
            self.nodes[idx].children.push(child_idx);
        }
        self.nodes[idx].total_balance = total_balance;
        self.nodes[idx].total_budget = total_budget;
        Ok(idx)
    }

    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            tree: self,
            index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in pre-order.
    pub fn iter(&self) -> impl Iterator<Item = NodeRef<'_>> {
        (0..self.nodes.len()).map(move |index| NodeRef { tree: self, index })
    }

    pub fn find(&self, name: &str) -> Option<NodeRef<'_>> {
        self.iter().find(|node| node.name() == name)
    }
}

/// Borrowed view of one report node with its derived rollups.
#[derive(Clone, Copy, Debug)]
pub struct NodeRef<'a> {
    tree: &'a ReportTree,
    index: usize,
}

impl<'a> NodeRef<'a> {
    fn node(&self) -> &'a ReportNode {
        &self.tree.nodes[self.index]
    }

    pub fn name(&self) -> &'a str {
        &self.node().name
    }

    pub fn guid(&self) -> &'a str {
        &self.node().guid
    }

    pub fn own_balance(&self) -> Decimal {
        self.node().own_balance
    }

    pub fn own_budget(&self) -> Decimal {
        self.node().own_budget
    }

    pub fn own_flex(&self) -> bool {
        self.node().own_flex
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.node().parent.map(|index| NodeRef {
            tree: self.tree,
            index,
        })
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let tree = self.tree;
        self.node()
            .children
            .iter()
            .map(move |&index| NodeRef { tree, index })
    }

    pub fn depth(&self) -> usize {
        self.parent().map_or(0, |parent| parent.depth() + 1)
    }

    pub fn is_flex(&self) -> bool {
        self.own_flex() || self.children().any(|child| child.is_flex())
    }

    /// Own balance plus the total balance of every child.
    pub fn total_balance(&self) -> Decimal {
        self.node().total_balance
    }

    pub fn total_budget(&self) -> Decimal {
        self.node().total_budget
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountRecord;
    use std::collections::HashMap;

    fn record(id: &str, parent: Option<&str>, notes: Option<&str>) -> AccountRecord {
        AccountRecord {
            id: id.to_string(),
            name: id.to_uppercase(),
            parent_id: parent.map(str::to_string),
            notes: notes.map(str::to_string),
        }
    }

    // root
    //  +-- a
    //  |   +-- b
    //  |       +-- c (flex)
    //  +-- d
    fn sample() -> ReportTree {
        let accounts = AccountTree::build(&[
            record("c", Some("b"), Some("flex")),
            record("root", None, None),
            record("a", Some("root"), Some("fixed")),
            record("b", Some("a"), None),
            record("d", Some("root"), None),
        ])
        .unwrap();
        let mut balances = HashMap::new();
        balances.insert("root", Decimal::new(1, 2));
        balances.insert("a", Decimal::new(1000, 2));
        balances.insert("b", Decimal::new(-250, 2));
        balances.insert("c", Decimal::new(333, 2));
        balances.insert("d", Decimal::new(5, 1));
        ReportTree::build(
            &accounts,
            |id| Ok(balances.get(id).copied().unwrap_or_default()),
            &BudgetAmounts::default(),
            "flex",
        )
        .unwrap()
    }

    #[test]
    fn mirrors_account_shape_in_pre_order() {
        let tree = sample();
        let names: Vec<&str> = tree.iter().map(|n| n.name()).collect();
        assert_eq!(names, vec!["ROOT", "A", "B", "C", "D"]);
        let depths: Vec<usize> = tree.iter().map(|n| n.depth()).collect();
        assert_eq!(depths, vec![0, 1, 2, 3, 1]);
        assert_eq!(tree.find("C").unwrap().parent().unwrap().name(), "B");
    }

    #[test]
    fn totals_roll_up_through_every_level() {
        let tree = sample();
        for node in tree.iter() {
            let children: Decimal = node.children().map(|c| c.total_balance()).sum();
            assert_eq!(node.total_balance(), node.own_balance() + children);
        }
        assert_eq!(tree.find("B").unwrap().total_balance(), Decimal::new(83, 2));
        assert_eq!(tree.find("A").unwrap().total_balance(), Decimal::new(1083, 2));
        assert_eq!(tree.root().total_balance(), Decimal::new(1134, 2));
        assert!(tree.root().total_budget().is_zero());
    }

    #[test]
    fn flex_propagates_to_every_ancestor() {
        let tree = sample();
        for node in tree.iter() {
            let expected = node.own_flex() || node.children().any(|c| c.is_flex());
            assert_eq!(node.is_flex(), expected);
        }
        assert!(tree.find("C").unwrap().own_flex());
        assert!(tree.root().is_flex());
        assert!(tree.find("A").unwrap().is_flex());
        assert!(!tree.find("A").unwrap().own_flex());
        assert!(!tree.find("D").unwrap().is_flex());
    }

    #[test]
    fn overflowing_rollup_fails_the_build() {
        let accounts = AccountTree::build(&[
            record("root", None, None),
            record("a", Some("root"), None),
            record("b", Some("root"), None),
        ])
        .unwrap();
        let big = Decimal::MAX - Decimal::new(1, 0);
        let result = ReportTree::build(
            &accounts,
            |id| Ok(if id == "root" { Decimal::default() } else { big }),
            &BudgetAmounts::default(),
            "flex",
        );
        match result {
            Err(Error::AmountOverflow(account)) => assert_eq!(account, "root"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn balance_errors_propagate() {
        let accounts = AccountTree::build(&[record("root", None, None)]).unwrap();
        let result = ReportTree::build(
            &accounts,
            |id| Err(Error::AmountOverflow(id.to_string())),
            &BudgetAmounts::default(),
            "flex",
        );
        assert!(matches!(result, Err(Error::AmountOverflow(_))));
    }
}
