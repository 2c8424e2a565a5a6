//! World and presentation callbacks the interpreter fires while walking a chain.
//!
//! None of these block. Anything that needs an answer from the player is
//! returned as a [`crate::chain::Suspension`] instead.

use crate::event::{Direction, MapId, TileTarget, Transition};

/// A message the host should show without waiting for input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
    /// Index into the current map's text table.
    MapText(u16),
    /// Built-in engine text from the configuration.
    Engine(String),
}

pub trait WorldHooks {
    /// Move the party. `map_index` is already resolved (never 0); `x`/`y` are 1-based.
    fn teleport(&mut self, map_index: MapId, x: u8, y: u8, direction: Option<Direction>, transition: Transition);

    fn update_map_tile(&mut self, target: TileTarget, tile_index: u16);

    fn spin(&mut self, direction: Direction);

    /// Try to enter a place; `false` means the host refused entry.
    fn enter_place(&mut self, place_type: u8, place_index: u16, used_map: Option<MapId>) -> bool;

    fn play_music(&mut self, song_index: u16, volume: u8);

    fn spawn(&mut self, map_index: MapId, x: u8, y: u8, travel_type: u8);

    fn show_message(&mut self, message: Message);

    /// A cursed item was stripped from a member's equipment by an event.
    fn item_uncursed(&mut self, member: usize, item_index: u16);
}

/// Hooks that record every call, for tests and headless runs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordingHooks {
    pub calls: Vec<HookCall>,
    /// Answer given to `enter_place`.
    pub allow_entry: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HookCall {
    Teleport {
        map_index: MapId,
        x: u8,
        y: u8,
        direction: Option<Direction>,
        transition: Transition,
    },
    UpdateMapTile(TileTarget, u16),
    Spin(Direction),
    EnterPlace(u8, u16),
    PlayMusic(u16, u8),
    Spawn(MapId, u8, u8, u8),
    Message(Message),
    ItemUncursed(usize, u16),
}

impl WorldHooks for RecordingHooks {
    fn teleport(&mut self, map_index: MapId, x: u8, y: u8, direction: Option<Direction>, transition: Transition) {
        self.calls.push(HookCall::Teleport {
            map_index,
            x,
            y,
            direction,
            transition,
        });
    }

    fn update_map_tile(&mut self, target: TileTarget, tile_index: u16) {
        self.calls.push(HookCall::UpdateMapTile(target, tile_index));
    }

    fn spin(&mut self, direction: Direction) {
        self.calls.push(HookCall::Spin(direction));
    }

    fn enter_place(&mut self, place_type: u8, place_index: u16, _used_map: Option<MapId>) -> bool {
        self.calls.push(HookCall::EnterPlace(place_type, place_index));
        self.allow_entry
    }

    fn play_music(&mut self, song_index: u16, volume: u8) {
        self.calls.push(HookCall::PlayMusic(song_index, volume));
    }

    fn spawn(&mut self, map_index: MapId, x: u8, y: u8, travel_type: u8) {
        self.calls.push(HookCall::Spawn(map_index, x, y, travel_type));
    }

    fn show_message(&mut self, message: Message) {
        self.calls.push(HookCall::Message(message));
    }

    fn item_uncursed(&mut self, member: usize, item_index: u16) {
        self.calls.push(HookCall::ItemUncursed(member, item_index));
    }
}
