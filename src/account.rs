use crate::error::{Error, Result};

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::mem;
use tracing::debug;

/// One account definition as written in the ledger.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountRecord {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub notes: Option<String>,
}

impl AccountRecord {
    /// Case-sensitive substring match against the account notes.
    /// Accounts without notes never match.
    pub fn has_marker(&self, marker: &str) -> bool {
        self.notes
            .as_deref()
            .map_or(false, |notes| notes.contains(marker))
    }
}

#[derive(Clone, Debug)]
pub struct HierarchyNode {
    pub record: AccountRecord,
    parent: Option<usize>,
    children: Vec<usize>,
}

impl HierarchyNode {
    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn children(&self) -> &[usize] {
        &self.children
    }
}

impl PartialEq for HierarchyNode {
    fn eq(&self, other: &Self) -> bool {
        self.record.id == other.record.id
    }
}

impl Eq for HierarchyNode {}

impl Hash for HierarchyNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.record.id.hash(state);
    }
}

/// Account hierarchy stored as an arena; parent and child links are indices.
#[derive(Clone, Debug)]
pub struct AccountTree {
    nodes: Vec<HierarchyNode>,
    index: HashMap<String, usize>,
    root: usize,
}

impl AccountTree {
    /// Builds the hierarchy in two passes so that a child may be declared
    /// before its parent. Records sharing an id collapse into one node.
    pub fn build(records: &[AccountRecord]) -> Result<AccountTree> {
        let mut tree = AccountTree {
            nodes: Vec::new(),
            index: HashMap::new(),
            root: 0,
        };

        for record in records {
            if tree.index.contains_key(&record.id) {
                continue;
            }
            tree.index.insert(record.id.clone(), tree.nodes.len());
            tree.nodes.push(HierarchyNode {
                record: record.clone(),
                parent: None,
                children: Vec::new(),
            });
        }

        for record in records {
            if let Some(parent_id) = &record.parent_id {
                let child = tree.index[&record.id];
                let parent = *tree
                    .index
                    .get(parent_id)
                    .ok_or_else(|| Error::UnknownParent {
                        account: record.id.clone(),
                        parent: parent_id.clone(),
                    })?;
                tree.attach(child, parent)?;
            }
        }

        tree.sort_children();
        tree.root = tree.find_root()?;
        debug!(accounts = tree.nodes.len(), "account hierarchy built");
        Ok(tree)
    }

    fn attach(&mut self, child: usize, parent: usize) -> Result<()> {
        match self.nodes[child].parent {
            Some(existing) if existing == parent => return Ok(()),
            Some(existing) => {
                return Err(Error::ConflictingParent {
                    account: self.nodes[child].record.id.clone(),
                    existing: self.nodes[existing].record.id.clone(),
                    requested: self.nodes[parent].record.id.clone(),
                })
            }
            None => {}
        }

        let mut cursor = Some(parent);
        while let Some(idx) = cursor {
            if idx == child {
                return Err(Error::CyclicParent {
                    account: self.nodes[child].record.id.clone(),
                    parent: self.nodes[parent].record.id.clone(),
                });
            }
            cursor = self.nodes[idx].parent;
        }

        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
        Ok(())
    }

    // Stable sort: accounts sharing a name keep document order.
    fn sort_children(&mut self) {
        for idx in 0..self.nodes.len() {
            let mut children = mem::take(&mut self.nodes[idx].children);
            children.sort_by(|&a, &b| self.nodes[a].name().cmp(self.nodes[b].name()));
            self.nodes[idx].children = children;
        }
    }

    fn find_root(&self) -> Result<usize> {
        let roots: Vec<usize> = (0..self.nodes.len())
            .filter(|&idx| self.nodes[idx].parent.is_none())
            .collect();
        match roots.as_slice() {
            [] => Err(Error::MissingRoot),
            [root] => Ok(*root),
            _ => Err(Error::MultipleRoots(
                roots
                    .iter()
                    .map(|&idx| self.nodes[idx].name().to_string())
                    .collect(),
            )),
        }
    }

    pub fn root(&self) -> usize {
        self.root
    }

    pub fn node(&self, idx: usize) -> &HierarchyNode {
        &self.nodes[idx]
    }

    pub fn find(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn depth(&self, idx: usize) -> usize {
        let mut depth = 0;
        let mut cursor = self.nodes[idx].parent;
        while let Some(parent) = cursor {
            depth += 1;
            cursor = self.nodes[parent].parent;
        }
        depth
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
