//! Reference graph over a collection (referrer -> referenced).

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::HashMap;

use super::{EntryCollection, ResolvedRef};
use crate::entries::{EntryKey, EntrySupertype};

/// Snapshot of resolvable references. Edges carry the field name.
pub struct ReferenceGraph {
    graph: DiGraph<EntryKey, &'static str>,
    nodes: HashMap<EntryKey, NodeIndex>,
}

impl ReferenceGraph {
    pub fn build(collection: &EntryCollection) -> Self {
        let mut graph = DiGraph::new();
        let mut nodes = HashMap::new();
        for entry in collection.entries() {
            nodes.insert(entry.key(), graph.add_node(entry.key()));
        }
        for entry in collection.entries() {
            let from = nodes[&entry.key()];
            for field in entry.references() {
                if let ResolvedRef::Entry(target) =
                    collection.resolve_ref(field.reference, field.target)
                {
                    graph.add_edge(from, nodes[&target.key()], field.field);
                }
            }
        }
        Self { graph, nodes }
    }

    /// Entries holding a reference to `key`
    pub fn referrers_of(&self, key: EntryKey) -> Vec<EntryKey> {
        self.neighbors(key, Direction::Incoming)
    }

    /// Entries referenced by `key`
    pub fn references_from(&self, key: EntryKey) -> Vec<EntryKey> {
        self.neighbors(key, Direction::Outgoing)
    }

    /// Entries of `supertype` nothing refers to (e.g. unused models)
    pub fn unreferenced(
        &self,
        collection: &EntryCollection,
        supertype: EntrySupertype,
    ) -> Vec<EntryKey> {
        collection
            .iter_supertype(supertype)
            .map(|entry| entry.key())
            .filter(|key| self.referrers_of(*key).is_empty())
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn neighbors(&self, key: EntryKey, direction: Direction) -> Vec<EntryKey> {
        let Some(&node) = self.nodes.get(&key) else {
            return Vec::new();
        };
        let mut keys: Vec<EntryKey> = self
            .graph
            .neighbors_directed(node, direction)
            .map(|n| self.graph[n])
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entries::{EntryRef, EventKind, ModelKind, MsbEntry, PartKind, Placement};

    #[test]
    fn test_referrers_and_unreferenced() {
        let mut msb = EntryCollection::with_default_schema();
        let used = msb
            .add_entry("object_models", MsbEntry::model("o0000", ModelKind::Object, ""))
            .unwrap();
        let unused = msb
            .add_entry("object_models", MsbEntry::model("o9999", ModelKind::Object, ""))
            .unwrap();
        let mut object = MsbEntry::part(
            "o0000_0000",
            PartKind::Object {
                draw_parent: EntryRef::None,
            },
            Placement::default(),
        );
        object.as_part_mut().unwrap().model = EntryRef::to("o0000");
        let object_key = msb.add_entry("objects", object).unwrap();
        let mut event = MsbEntry::event("act", EventKind::ObjectAction {
            object_act_param_id: 100,
            event_flag: 11000100,
        });
        event.as_event_mut().unwrap().part = EntryRef::to("o0000_0000");
        let event_key = msb.add_entry("object_actions", event).unwrap();

        let graph = ReferenceGraph::build(&msb);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.referrers_of(used), vec![object_key]);
        assert_eq!(graph.referrers_of(object_key), vec![event_key]);
        assert_eq!(graph.references_from(object_key), vec![used]);
        assert_eq!(graph.unreferenced(&msb, EntrySupertype::Models), vec![unused]);
        assert!(graph.referrers_of(EntryKey::next()).is_empty());
    }
}
