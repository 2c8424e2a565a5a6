//! Suppresses repeated movement triggers of the same tile event.
//!
//! While the party keeps standing on (or stepping back onto) the tile it last
//! triggered, plain text and award chains must not fire again. Doors,
//! teleports, chests, places, buff removal, riddles and 3D traps always fire.

use log::debug;

use crate::error::EventError;
use crate::event::{EventId, EventType, MapId};
use crate::map::EventMap;
use crate::trigger::EventTrigger;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupGuard {
    last_map: Option<MapId>,
    last_event: Option<EventId>,
}

impl DedupGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget both the map and the event.
    pub fn reset(&mut self) {
        self.last_map = None;
        self.last_event = None;
    }

    /// Forget the event but keep the map.
    pub fn clear_last_event(&mut self, map: MapId) {
        self.last_map = Some(map);
        self.last_event = None;
    }

    pub fn last(&self) -> (Option<MapId>, Option<EventId>) {
        (self.last_map, self.last_event)
    }

    /// Decide whether this trigger of `event_id` is a repeat to swallow.
    ///
    /// When not suppressed, the remembered pair becomes `(map, event_id)`.
    ///
    /// # Errors
    /// - `UnknownEvent` / `CorruptData` if the chain cannot be followed
    pub fn should_suppress(
        &mut self,
        map: &EventMap,
        event_id: EventId,
        trigger: EventTrigger,
    ) -> Result<bool, EventError> {
        if trigger == EventTrigger::Move
            && self.last_map == Some(map.index)
            && self.last_event == Some(event_id)
            && !refires_on_move(map, first_real_node_type(map, event_id)?)
        {
            debug!("suppressing repeated move trigger of event {event_id} on map {}", map.index);
            return Ok(true);
        }
        self.last_map = Some(map.index);
        self.last_event = Some(event_id);
        Ok(false)
    }
}

/// Follow `next` past leading condition and dice nodes.
fn first_real_node_type(map: &EventMap, event_id: EventId) -> Result<Option<EventType>, EventError> {
    let mut current = Some(map.chain_head(event_id)?);
    let mut hops = 0;
    while let Some(id) = current {
        let node = map.node(id)?;
        match node.event_type {
            EventType::Condition | EventType::Dice100Roll if hops < map.nodes().len() => {
                current = node.next;
                hops += 1;
            },
            EventType::Condition | EventType::Dice100Roll => return Ok(None),
            other => return Ok(Some(other)),
        }
    }
    Ok(None)
}

fn refires_on_move(map: &EventMap, event_type: Option<EventType>) -> bool {
    match event_type {
        Some(
            EventType::Teleport
            | EventType::Chest
            | EventType::Door
            | EventType::EnterPlace
            | EventType::RemoveBuffs
            | EventType::Riddlemouth,
        ) => true,
        Some(EventType::Trap) => map.is_3d,
        _ => false,
    }
}
