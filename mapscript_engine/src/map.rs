//! The event graph of one map.

use std::collections::HashMap;

use crate::error::EventError;
use crate::event::{EventId, EventNode, MapId, NodeId};

/// A map's flat node table, its chain heads, and the event ids placed on tiles.
#[derive(Debug, Clone, Default)]
pub struct EventMap {
    pub index: MapId,
    pub name: String,
    pub is_3d: bool,
    pub width: u8,
    pub height: u8,
    pub battle_background: u8,
    nodes: Vec<EventNode>,
    chain_heads: Vec<NodeId>,
    tiles: HashMap<(u8, u8), EventId>,
    pub texts: Vec<String>,
}

impl EventMap {
    pub fn new(index: MapId, nodes: Vec<EventNode>, chain_heads: Vec<NodeId>) -> Self {
        Self {
            index,
            nodes,
            chain_heads,
            ..Self::default()
        }
    }

    /// Look up a node.
    ///
    /// # Errors
    /// - `CorruptData` if `id` is outside the node table
    pub fn node(&self, id: NodeId) -> Result<&EventNode, EventError> {
        self.nodes
            .get(id.index())
            .ok_or_else(|| EventError::corrupt(id, format!("link outside node table of {}", self.nodes.len())))
    }

    pub fn nodes(&self) -> &[EventNode] {
        &self.nodes
    }

    /// First node of the chain with 1-based `event_id`.
    ///
    /// # Errors
    /// - `UnknownEvent` if the id has no chain on this map
    pub fn chain_head(&self, event_id: EventId) -> Result<NodeId, EventError> {
        usize::from(event_id)
            .checked_sub(1)
            .and_then(|slot| self.chain_heads.get(slot))
            .copied()
            .ok_or(EventError::UnknownEvent(event_id))
    }

    pub fn event_count(&self) -> usize {
        self.chain_heads.len()
    }

    /// Event id on the 0-based tile `(x, y)`, if any.
    pub fn tile_event(&self, x: u8, y: u8) -> Option<EventId> {
        self.tiles.get(&(x, y)).copied()
    }

    pub fn place_event(&mut self, x: u8, y: u8, event_id: EventId) {
        self.tiles.insert((x, y), event_id);
    }

    /// Tiles carrying an event, sorted by position.
    pub fn event_tiles(&self) -> Vec<((u8, u8), EventId)> {
        let mut tiles: Vec<_> = self.tiles.iter().map(|(pos, id)| (*pos, *id)).collect();
        tiles.sort_unstable();
        tiles
    }

    pub fn text(&self, index: u16) -> Option<&str> {
        self.texts.get(usize::from(index)).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventPayload, SpinnerEvent};

    fn map() -> EventMap {
        let spinner = EventPayload::Spinner(SpinnerEvent { direction: None });
        let mut map = EventMap::new(4, vec![EventNode::new(0, None, spinner)], vec![NodeId(0)]);
        map.place_event(2, 3, 1);
        map
    }

    #[test]
    fn chain_heads_are_one_based() {
        let map = map();
        assert_eq!(map.chain_head(1), Ok(NodeId(0)));
        assert_eq!(map.chain_head(0), Err(EventError::UnknownEvent(0)));
        assert_eq!(map.chain_head(2), Err(EventError::UnknownEvent(2)));
    }

    #[test]
    fn dangling_node_is_corrupt() {
        let map = map();
        assert!(map.node(NodeId(0)).is_ok());
        assert!(matches!(map.node(NodeId(5)), Err(EventError::CorruptData { node: NodeId(5), .. })));
    }

    #[test]
    fn tiles_map_to_event_ids() {
        let map = map();
        assert_eq!(map.tile_event(2, 3), Some(1));
        assert_eq!(map.tile_event(3, 2), None);
        assert_eq!(map.event_tiles(), vec![((2, 3), 1)]);
    }
}
