//src/taxtree.rs

//! Taxonomy tree rebuilt from the indentation of a Kraken-style report.
//!
//! Nodes live in an arena (`Vec<TaxonNode>`) and refer to each other by
//! [`NodeId`]. Children are owned by the tree in report order; the parent
//! link is a plain index used only for walking upwards.

use ahash::AHashSet;

use crate::error::FilterError;
use crate::types::{KrakenReportRow, TaxId, ROOT_TAXID, VIRUSES_TAXID};

/// Index of a node in a [`TaxonomyTree`].
pub type NodeId = usize;

/// Spaces added to the name column per level of the hierarchy.
pub const INDENT_STEP: usize = 2;

/// One taxon in the hierarchy.
#[derive(Debug, Clone)]
pub struct TaxonNode {
    /// `None` only for synthetic roots
    pub tax_id: Option<TaxId>,
    pub name: String,
    pub rank: String,
    /// Level in the tree; the root is 0
    pub depth: usize,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
}

/// Rooted n-ary taxonomy tree.
#[derive(Debug, Clone)]
pub struct TaxonomyTree {
    nodes: Vec<TaxonNode>,
}

/// Result of resolving target taxids against a tree.
#[derive(Debug, Clone, Default)]
pub struct TaxonClosure {
    /// Target taxids plus all of their descendants
    pub taxids: AHashSet<TaxId>,
    /// Requested taxids that were not found in the tree
    pub unmatched: Vec<TaxId>,
}

impl TaxonClosure {
    pub fn contains(&self, taxid: TaxId) -> bool {
        self.taxids.contains(&taxid)
    }

    pub fn len(&self) -> usize {
        self.taxids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taxids.is_empty()
    }
}

pub const ROOT: NodeId = 0;

impl TaxonomyTree {
    /// A tree holding only the synthetic root.
    pub fn new() -> Self {
        Self {
            nodes: vec![TaxonNode {
                tax_id: Some(ROOT_TAXID),
                name: "root".to_string(),
                rank: "R".to_string(),
                depth: 0,
                children: Vec::new(),
                parent: None,
            }],
        }
    }

    /// Construct a taxonomy tree from Kraken-style report rows.
    ///
    /// Rows must follow the report's depth-first layout. `levels[d]` holds the
    /// most recent node at depth `d`; placing a node at depth `d` discards
    /// every deeper entry so a later row can never attach to a stale node
    /// from another branch.
    pub fn build(rows: &[KrakenReportRow]) -> Result<Self, FilterError> {
        let mut tree = Self::new();
        let mut levels: Vec<NodeId> = vec![ROOT];

        for row in rows {
            if row.tax_name == "unclassified" || row.tax_name == "root" {
                continue;
            }
            if row.indent % INDENT_STEP != 0 {
                return Err(FilterError::MalformedReport {
                    line: row.line,
                    reason: format!(
                        "'{}' is indented by {} spaces, not a multiple of {}",
                        row.tax_name, row.indent, INDENT_STEP
                    ),
                });
            }
            let depth = row.indent / INDENT_STEP;
            if depth == 0 || depth > levels.len() {
                return Err(FilterError::MalformedReport {
                    line: row.line,
                    reason: format!(
                        "'{}' at depth {} has no parent at depth {}",
                        row.tax_name,
                        depth,
                        depth as isize - 1
                    ),
                });
            }

            let parent = levels[depth - 1];
            let id = tree.nodes.len();
            tree.nodes.push(TaxonNode {
                tax_id: Some(row.tax_id),
                name: row.tax_name.clone(),
                rank: row.rank.clone(),
                depth,
                children: Vec::new(),
                parent: Some(parent),
            });
            tree.nodes[parent].children.push(id);

            levels.truncate(depth);
            levels.push(id);
        }

        log::debug!("Built taxonomy tree with {} nodes", tree.nodes.len());
        Ok(tree)
    }

    pub fn root(&self) -> &TaxonNode {
        &self.nodes[ROOT]
    }

    pub fn node(&self, id: NodeId) -> &TaxonNode {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    /// Depth-first search from the root; the first match wins.
    pub fn search(&self, taxid: TaxId) -> Option<NodeId> {
        let mut stack = vec![ROOT];
        while let Some(id) = stack.pop() {
            if self.nodes[id].tax_id == Some(taxid) {
                return Some(id);
            }
            // Reverse so children are visited in report order
            stack.extend(self.nodes[id].children.iter().rev());
        }
        None
    }

    /// All nodes below `id`, depth-first in report order (excluding `id`).
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.nodes[id].children.clone();
        stack.reverse();
        Descendants { tree: self, stack }
    }

    /// Walk from `id` up to the root, inclusive at both ends.
    pub fn lineage(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut cur = id;
        while let Some(p) = self.nodes[cur].parent {
            path.push(p);
            cur = p;
        }
        path
    }

    /// Taxid of a node plus those of all its descendants.
    pub fn taxids_set(&self, id: NodeId) -> AHashSet<TaxId> {
        let mut taxids: AHashSet<TaxId> = self
            .descendants(id)
            .filter_map(|d| self.nodes[d].tax_id)
            .collect();
        if let Some(taxid) = self.nodes[id].tax_id {
            taxids.insert(taxid);
        }
        taxids
    }

    /// Superkingdom Viruses, if present in this tree.
    pub fn viral_tax_node(&self) -> Option<NodeId> {
        self.search(VIRUSES_TAXID)
    }

    /// Resolve target taxids (or Viruses if none are given) into the set of
    /// taxids in their subtrees. Missing targets only produce a warning.
    pub fn closure(&self, targets: Option<&[TaxId]>) -> TaxonClosure {
        let mut closure = TaxonClosure::default();
        match targets {
            Some(taxids) if !taxids.is_empty() => {
                for &taxid in taxids {
                    match self.search(taxid) {
                        Some(node) => closure.taxids.extend(self.taxids_set(node)),
                        None => closure.unmatched.push(taxid),
                    }
                }
                if closure.is_empty() {
                    log::warn!("None of the requested taxids {taxids:?} were found in the taxonomy tree");
                } else {
                    log::info!(
                        "From input taxids ({taxids:?}), found {} unique taxids including descendants.",
                        closure.len()
                    );
                }
            }
            _ => match self.viral_tax_node() {
                Some(node) => {
                    closure.taxids = self.taxids_set(node);
                    log::info!("Found {} unique viral Taxonomy IDs", closure.len());
                }
                None => {
                    closure.unmatched.push(VIRUSES_TAXID);
                    log::warn!("Viruses taxid={VIRUSES_TAXID} not found in the taxonomy tree");
                }
            },
        }
        closure
    }
}

impl Default for TaxonomyTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator returned by [`TaxonomyTree::descendants`].
pub struct Descendants<'a> {
    tree: &'a TaxonomyTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack.extend(self.tree.nodes[id].children.iter().rev());
        Some(id)
    }
}
