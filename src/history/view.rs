//! Expandable view over a history forest
//!
//! Wraps each record with an "unrolled" flag that decides whether the script
//! builder inlines its children. Flags are presentation state only; the
//! records themselves never change. Node ids are pre-order indices over the
//! whole forest.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::log::HistoryLog;
use super::record::AlgorithmHistory;
use crate::error::AlgoError;

pub type NodeId = usize;

#[derive(Debug, Clone)]
struct ViewNode {
    record: Arc<AlgorithmHistory>,
    unrolled: bool,
    depth: usize,
    children: Vec<NodeId>,
}

/// A node as currently displayed
#[derive(Debug, Clone)]
pub struct VisibleNode {
    pub id: NodeId,
    pub depth: usize,
    pub record: Arc<AlgorithmHistory>,
}

#[derive(Debug, Clone, Default)]
pub struct HistoryView {
    nodes: Vec<ViewNode>,
    roots: Vec<NodeId>,
}

impl HistoryView {
    /// Fully rolled view over top-level records
    pub fn new(records: &[Arc<AlgorithmHistory>]) -> Self {
        let mut view = Self::default();
        for record in records {
            let id = view.push(record, 0);
            view.roots.push(id);
        }
        view
    }

    pub fn from_log(log: &HistoryLog) -> Self {
        Self::new(&log.records())
    }

    fn push(&mut self, record: &Arc<AlgorithmHistory>, depth: usize) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(ViewNode {
            record: Arc::clone(record),
            unrolled: false,
            depth,
            children: Vec::new(),
        });
        let children: Vec<NodeId> = record
            .children()
            .iter()
            .map(|child| self.push(child, depth + 1))
            .collect();
        self.nodes[id].children = children;
        id
    }

    fn node(&self, id: NodeId) -> Result<&ViewNode, AlgoError> {
        self.nodes.get(id).ok_or(AlgoError::UnknownHistoryNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut ViewNode, AlgoError> {
        self.nodes.get_mut(id).ok_or(AlgoError::UnknownHistoryNode(id))
    }

    /// Total node count, hidden nodes included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn record(&self, id: NodeId) -> Result<&Arc<AlgorithmHistory>, AlgoError> {
        self.node(id).map(|n| &n.record)
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId], AlgoError> {
        self.node(id).map(|n| n.children.as_slice())
    }

    pub fn depth(&self, id: NodeId) -> Result<usize, AlgoError> {
        self.node(id).map(|n| n.depth)
    }

    pub fn is_unrolled(&self, id: NodeId) -> Result<bool, AlgoError> {
        self.node(id).map(|n| n.unrolled)
    }

    /// Expand one node; childless nodes stay rolled
    pub fn unroll(&mut self, id: NodeId) -> Result<(), AlgoError> {
        let node = self.node_mut(id)?;
        node.unrolled = !node.children.is_empty();
        Ok(())
    }

    pub fn roll(&mut self, id: NodeId) -> Result<(), AlgoError> {
        self.node_mut(id)?.unrolled = false;
        Ok(())
    }

    pub fn toggle(&mut self, id: NodeId) -> Result<(), AlgoError> {
        if self.is_unrolled(id)? {
            self.roll(id)
        } else {
            self.unroll(id)
        }
    }

    /// Expand a node and every descendant
    pub fn unroll_recursive(&mut self, id: NodeId) -> Result<(), AlgoError> {
        self.unroll(id)?;
        let children = self.node(id)?.children.clone();
        for child in children {
            self.unroll_recursive(child)?;
        }
        Ok(())
    }

    pub fn unroll_all(&mut self) {
        for node in &mut self.nodes {
            node.unrolled = !node.children.is_empty();
        }
    }

    pub fn roll_all(&mut self) {
        for node in &mut self.nodes {
            node.unrolled = false;
        }
    }

    /// Nodes shown under the current flags, in display order
    pub fn visible(&self) -> Vec<VisibleNode> {
        let mut out = Vec::new();
        for &root in &self.roots {
            self.collect_visible(root, &mut out);
        }
        out
    }

    fn collect_visible(&self, id: NodeId, out: &mut Vec<VisibleNode>) {
        let node = &self.nodes[id];
        out.push(VisibleNode {
            id,
            depth: node.depth,
            record: Arc::clone(&node.record),
        });
        if node.unrolled {
            for &child in &node.children {
                self.collect_visible(child, out);
            }
        }
    }

    /// Keep only top-level records executed within `[start, end]`
    ///
    /// Flags of the surviving nodes are preserved; ids are renumbered.
    pub fn filter_between(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) {
        let old = std::mem::take(self);
        for &root in &old.roots {
            let date = old.nodes[root].record.exec_date();
            if date >= start && date <= end {
                let id = self.copy_subtree(&old, root);
                self.roots.push(id);
            }
        }
    }

    fn copy_subtree(&mut self, old: &HistoryView, old_id: NodeId) -> NodeId {
        let src = &old.nodes[old_id];
        let id = self.nodes.len();
        self.nodes.push(ViewNode {
            record: Arc::clone(&src.record),
            unrolled: src.unrolled,
            depth: src.depth,
            children: Vec::new(),
        });
        let children: Vec<NodeId> = src
            .children
            .iter()
            .map(|&c| self.copy_subtree(old, c))
            .collect();
        self.nodes[id].children = children;
        id
    }
}
