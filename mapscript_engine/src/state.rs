//! Persistent world state read and written by event chains.
//!
//! The interpreter only talks to [`StateStore`]. [`Savegame`] is the in-memory
//! implementation used by the console and the tests; it serializes to RON.

use std::collections::BTreeSet;

use log::info;
use serde::{Deserialize, Serialize};
use variantly::Variantly;

use crate::event::{Direction, MapId, TileTarget};

/// Party-member ailments, stored as bit flags in [`PartyMember::ailments`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Variantly)]
pub enum Ailment {
    Irritated,
    Crazy,
    Blind,
    Drugged,
    Lamed,
    Poisoned,
    Petrified,
    Diseased,
    Aging,
    Exhausted,
    Dead,
}

impl Ailment {
    pub const ALL: [Ailment; 11] = [
        Ailment::Irritated,
        Ailment::Crazy,
        Ailment::Blind,
        Ailment::Drugged,
        Ailment::Lamed,
        Ailment::Poisoned,
        Ailment::Petrified,
        Ailment::Diseased,
        Ailment::Aging,
        Ailment::Exhausted,
        Ailment::Dead,
    ];

    pub fn from_index(index: u8) -> Option<Ailment> {
        Self::ALL.get(usize::from(index)).copied()
    }

    pub fn bit(self) -> u16 {
        let index = Self::ALL.iter().position(|a| *a == self).unwrap_or_default();
        1 << index
    }
}

/// A stat with a current and a maximum value.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatValue {
    pub current: u32,
    pub max: u32,
}

impl StatValue {
    pub fn new(current: u32, max: u32) -> Self {
        Self { current, max }
    }
}

/// A stack of items in an inventory or equipment slot.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSlot {
    pub item_index: u16,
    pub amount: u16,
    #[serde(default)]
    pub cursed: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartyMember {
    /// Global character index, checked by the party-membership condition.
    pub character_index: u16,
    pub name: String,
    pub gold: u32,
    pub food: u32,
    /// Carried weight in weight units.
    pub total_weight: u32,
    pub hit_points: StatValue,
    pub spell_points: StatValue,
    pub attributes: Vec<StatValue>,
    pub skills: Vec<StatValue>,
    pub ailments: u16,
    pub languages: u8,
    pub spell_schools: u8,
    pub experience: u32,
    pub training_points: u32,
    pub spell_learning_points: u32,
    pub inventory: Vec<ItemSlot>,
    pub equipment: Vec<ItemSlot>,
}

impl PartyMember {
    pub fn has_ailment(&self, ailment: Ailment) -> bool {
        self.ailments & ailment.bit() != 0
    }

    pub fn set_ailment(&mut self, ailment: Ailment, on: bool) {
        if on {
            self.ailments |= ailment.bit();
        } else {
            self.ailments &= !ailment.bit();
        }
    }

    pub fn is_alive(&self) -> bool {
        !self.has_ailment(Ailment::Dead)
    }

    /// Count of `item_index` across inventory and equipment.
    pub fn item_count(&self, item_index: u16) -> u32 {
        self.inventory
            .iter()
            .chain(self.equipment.iter())
            .filter(|slot| slot.item_index == item_index)
            .map(|slot| u32::from(slot.amount))
            .sum()
    }

    /// Lose hit points; a member reduced to zero becomes dead. Returns damage taken.
    pub fn take_damage(&mut self, damage: u32) -> u32 {
        let taken = damage.min(self.hit_points.current);
        self.hit_points.current -= taken;
        if self.hit_points.current == 0 {
            self.set_ailment(Ailment::Dead, true);
        }
        taken
    }
}

/// A recorded tile replacement, replayed by the host when a map is reloaded.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileChange {
    pub target: TileTarget,
    pub tile_index: u16,
}

/// Capability interface over persistent game state.
///
/// Event bits are "deactivated" flags: a set bit turns the matching tile event off.
pub trait StateStore {
    fn global_variable(&self, index: u16) -> bool;
    fn set_global_variable(&mut self, index: u16, value: bool);

    fn event_bit(&self, map: MapId, bit: u16) -> bool;
    fn set_event_bit(&mut self, map: MapId, bit: u16, value: bool);

    fn character_bit(&self, map: MapId, bit: u16) -> bool;
    fn set_character_bit(&mut self, map: MapId, bit: u16, value: bool);

    fn is_door_locked(&self, door: u16) -> bool;
    fn set_door_locked(&mut self, door: u16, locked: bool);

    fn is_chest_locked(&self, chest: u16) -> bool;
    fn set_chest_locked(&mut self, chest: u16, locked: bool);

    fn knows_word(&self, word: u16) -> bool;
    fn add_word(&mut self, word: u16);

    fn game_option(&self, bit: u16) -> bool;
    fn set_game_option(&mut self, bit: u16, value: bool);

    fn direction(&self) -> Direction;
    fn set_direction(&mut self, direction: Direction);

    /// Clear one timed buff, or all of them for `None`. Returns how many were cleared.
    fn remove_buffs(&mut self, buff: Option<u8>) -> usize;

    /// In-game hour of day, 0-23.
    fn hour(&self) -> u8;

    fn party(&self) -> &[PartyMember];
    fn party_mut(&mut self) -> &mut [PartyMember];
    /// Index into `party()` of the member currently acting.
    fn active_member(&self) -> usize;

    fn record_tile_change(&mut self, target: TileTarget, tile_index: u16);
}

/// In-memory game state.
///
/// Doors and chests start locked; the savegame stores the ones that were opened.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Savegame {
    pub global_variables: BTreeSet<u16>,
    pub event_bits: BTreeSet<(MapId, u16)>,
    pub character_bits: BTreeSet<(MapId, u16)>,
    pub unlocked_doors: BTreeSet<u16>,
    pub unlocked_chests: BTreeSet<u16>,
    pub known_words: BTreeSet<u16>,
    pub game_options: u32,
    pub direction: Direction,
    pub active_buffs: BTreeSet<u8>,
    pub hour: u8,
    pub party: Vec<PartyMember>,
    pub active_member: usize,
    pub tile_changes: Vec<TileChange>,
}

fn set_membership<T: Ord>(set: &mut BTreeSet<T>, key: T, present: bool) {
    if present {
        set.insert(key);
    } else {
        set.remove(&key);
    }
}

impl StateStore for Savegame {
    fn global_variable(&self, index: u16) -> bool {
        self.global_variables.contains(&index)
    }

    fn set_global_variable(&mut self, index: u16, value: bool) {
        set_membership(&mut self.global_variables, index, value);
    }

    fn event_bit(&self, map: MapId, bit: u16) -> bool {
        self.event_bits.contains(&(map, bit))
    }

    fn set_event_bit(&mut self, map: MapId, bit: u16, value: bool) {
        set_membership(&mut self.event_bits, (map, bit), value);
    }

    fn character_bit(&self, map: MapId, bit: u16) -> bool {
        self.character_bits.contains(&(map, bit))
    }

    fn set_character_bit(&mut self, map: MapId, bit: u16, value: bool) {
        set_membership(&mut self.character_bits, (map, bit), value);
    }

    fn is_door_locked(&self, door: u16) -> bool {
        !self.unlocked_doors.contains(&door)
    }

    fn set_door_locked(&mut self, door: u16, locked: bool) {
        set_membership(&mut self.unlocked_doors, door, !locked);
    }

    fn is_chest_locked(&self, chest: u16) -> bool {
        !self.unlocked_chests.contains(&chest)
    }

    fn set_chest_locked(&mut self, chest: u16, locked: bool) {
        set_membership(&mut self.unlocked_chests, chest, !locked);
    }

    fn knows_word(&self, word: u16) -> bool {
        self.known_words.contains(&word)
    }

    fn add_word(&mut self, word: u16) {
        self.known_words.insert(word);
    }

    fn game_option(&self, bit: u16) -> bool {
        bit < 32 && self.game_options & (1 << bit) != 0
    }

    fn set_game_option(&mut self, bit: u16, value: bool) {
        if bit >= 32 {
            return;
        }
        if value {
            self.game_options |= 1 << bit;
        } else {
            self.game_options &= !(1 << bit);
        }
    }

    fn direction(&self) -> Direction {
        self.direction
    }

    fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    fn remove_buffs(&mut self, buff: Option<u8>) -> usize {
        match buff {
            Some(buff) => usize::from(self.active_buffs.remove(&buff)),
            None => {
                let cleared = self.active_buffs.len();
                self.active_buffs.clear();
                cleared
            },
        }
    }

    fn hour(&self) -> u8 {
        self.hour
    }

    fn party(&self) -> &[PartyMember] {
        &self.party
    }

    fn party_mut(&mut self) -> &mut [PartyMember] {
        &mut self.party
    }

    fn active_member(&self) -> usize {
        self.active_member
    }

    fn record_tile_change(&mut self, target: TileTarget, tile_index: u16) {
        info!(
            "recording tile change at map {} ({}, {}) -> tile {tile_index}",
            target.map_index, target.x, target.y
        );
        if let Some(existing) = self.tile_changes.iter_mut().find(|change| change.target == target) {
            existing.tile_index = tile_index;
        } else {
            self.tile_changes.push(TileChange { target, tile_index });
        }
    }
}
