//! Linked pickup chain as reported by the driver monitoring system
//!
//! The monitoring system hands over routes as a singly linked list of pickup
//! snapshots. `RouteChain` stores the nodes in an arena and links them by
//! index, so a chain may legitimately contain unreachable nodes or even a
//! pointer loop back to an earlier node. Walking a chain is forward-only and
//! follows `next` links from the chosen start node.

use crate::domain::types::VisitRecord;
use thiserror::Error;

/// Index of a node inside a `RouteChain`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("unknown chain node {0}")]
    UnknownNode(NodeId),
}

#[derive(Debug, Clone)]
struct PickupNode {
    visit: VisitRecord,
    next: Option<NodeId>,
}

/// Arena-backed singly linked chain of pickup snapshots
#[derive(Debug, Clone, Default)]
pub struct RouteChain {
    nodes: Vec<PickupNode>,
}

impl RouteChain {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Build a linear chain in the given order, returning its head (None if empty)
    pub fn from_visits<I>(visits: I) -> (Self, Option<NodeId>)
    where
        I: IntoIterator<Item = VisitRecord>,
    {
        let mut chain = Self::new();
        let mut head = None;
        let mut tail: Option<NodeId> = None;

        for visit in visits {
            let id = chain.push(visit);
            match tail {
                Some(prev) => chain.nodes[prev.0].next = Some(id),
                None => head = Some(id),
            }
            tail = Some(id);
        }

        (chain, head)
    }

    /// Add an unlinked node
    pub fn push(&mut self, visit: VisitRecord) -> NodeId {
        self.nodes.push(PickupNode { visit, next: None });
        NodeId(self.nodes.len() - 1)
    }

    /// Point `from` at `to`, replacing any previous link
    pub fn link(&mut self, from: NodeId, to: NodeId) -> Result<(), RouteError> {
        self.check(to)?;
        self.node_mut(from)?.next = Some(to);
        Ok(())
    }

    /// Make `from` the tail of whatever chain passes through it
    pub fn unlink(&mut self, from: NodeId) -> Result<(), RouteError> {
        self.node_mut(from)?.next = None;
        Ok(())
    }

    pub fn visit(&self, id: NodeId) -> Result<VisitRecord, RouteError> {
        self.nodes.get(id.0).map(|n| n.visit).ok_or(RouteError::UnknownNode(id))
    }

    pub fn next(&self, id: NodeId) -> Result<Option<NodeId>, RouteError> {
        self.nodes.get(id.0).map(|n| n.next).ok_or(RouteError::UnknownNode(id))
    }

    /// Number of nodes stored, reachable or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Walk the chain from `start` by following `next` links.
    ///
    /// The walk is unbounded if the links form a loop; consumers must stop on
    /// their own (the auditor always does, see `services::route_auditor`).
    /// An unknown start node yields an empty walk.
    pub fn walk(&self, start: NodeId) -> ChainWalk<'_> {
        ChainWalk { chain: self, cursor: Some(start) }
    }

    fn check(&self, id: NodeId) -> Result<(), RouteError> {
        if id.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(RouteError::UnknownNode(id))
        }
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut PickupNode, RouteError> {
        self.nodes.get_mut(id.0).ok_or(RouteError::UnknownNode(id))
    }
}

/// Forward-only iterator over a `RouteChain`
#[derive(Debug, Clone)]
pub struct ChainWalk<'a> {
    chain: &'a RouteChain,
    cursor: Option<NodeId>,
}

impl Iterator for ChainWalk<'_> {
    type Item = VisitRecord;

    fn next(&mut self) -> Option<VisitRecord> {
        let id = self.cursor?;
        let visit = self.chain.visit(id).ok()?;
        self.cursor = self.chain.next(id).ok().flatten();
        Some(visit)
    }
}
