//! Read-only index over a snapshot of the location table.
//!
//! Rows are addressed by `LocationId`; parent and child links are ids, so
//! the self-referential tree needs no shared ownership. Traversals carry a
//! visited set and stop on a revisit even if the stored links are corrupt.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use super::models::Location;
use crate::common::LocationId;

pub struct LocationArena {
    nodes: HashMap<LocationId, Location>,
    by_name: HashMap<String, LocationId>,
    children: HashMap<LocationId, Vec<LocationId>>,
}

impl LocationArena {
    pub fn build(locations: Vec<Location>) -> Self {
        let mut nodes = HashMap::with_capacity(locations.len());
        let mut by_name = HashMap::with_capacity(locations.len());
        let mut children: HashMap<LocationId, Vec<LocationId>> = HashMap::new();

        for location in locations {
            if let Some(parent_id) = location.parent_id {
                children.entry(parent_id).or_default().push(location.id);
            }
            by_name.insert(location.name.clone(), location.id);
            nodes.insert(location.id, location);
        }

        Self {
            nodes,
            by_name,
            children,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Location> {
        self.by_name.get(name).and_then(|id| self.nodes.get(id))
    }

    /// `name` and everything nested beneath it; empty when `name` is unknown
    pub fn descendants(&self, name: &str) -> BTreeSet<String> {
        let mut found = BTreeSet::new();
        let Some(start) = self.by_name.get(name) else {
            return found;
        };

        let mut seen: HashSet<LocationId> = HashSet::new();
        let mut queue = VecDeque::from([*start]);
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            if let Some(node) = self.nodes.get(&id) {
                found.insert(node.name.clone());
            }
            if let Some(kids) = self.children.get(&id) {
                queue.extend(kids.iter().copied());
            }
        }

        found
    }

    /// `[name, parent, grandparent, ...]` up to the root; empty when unknown
    pub fn ancestors(&self, name: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut seen: HashSet<LocationId> = HashSet::new();
        let mut current = self.get(name);

        while let Some(node) = current {
            if !seen.insert(node.id) {
                break;
            }
            chain.push(node.name.clone());
            current = node.parent_id.and_then(|id| self.nodes.get(&id));
        }

        chain
    }
}
