//! Action nodes: write persistent state.
//!
//! Most actions share the [`clear_set_toggle_leave`] policy on the node's
//! `value`. Item, gold and food actions use `value` as add (1) or remove (0)
//! and leave state alone for anything else.
//!
//! Gold and food are spread over the whole party with the remainder going to
//! the first members in party order; see [`remove_distributed`].

use log::{info, warn};

use crate::env::EventEnv;
use crate::error::EventError;
use crate::event::condition::BitAddress;
use crate::event::{Direction, NodeId};
use crate::state::{Ailment, ItemSlot, PartyMember, StateStore};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ActionType {
    SetGlobalVariable,
    SetEventBit,
    LockDoor,
    LockChest,
    SetCharacterBit,
    AddItem,
    AddKeyword,
    SetGameOption,
    SetDirection,
    AddAilment,
    AddGold,
    AddFood,
}

impl ActionType {
    pub fn from_code(code: u8) -> Option<ActionType> {
        use ActionType::*;
        [
            SetGlobalVariable,
            SetEventBit,
            LockDoor,
            LockChest,
            SetCharacterBit,
            AddItem,
            AddKeyword,
            SetGameOption,
            SetDirection,
            AddAilment,
            AddGold,
            AddFood,
        ]
        .get(usize::from(code))
        .copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionEvent {
    pub action_type: ActionType,
    pub object_index: u16,
    /// 0 clear / 1 set / 2 toggle / other leave; add-remove kinds use 0 remove / 1 add.
    pub value: u16,
    pub count: u16,
}

/// New value of a flag under a clear/set/toggle/leave operation.
pub fn clear_set_toggle_leave(operation: u16, current: bool) -> bool {
    match operation {
        0 => false,
        1 => true,
        2 => !current,
        _ => current,
    }
}

/// Remove up to `amount` from `balances`, spread across members.
///
/// The request is capped at the combined total. Each member owes
/// `amount / n`, the first `amount % n` members one more, clamped to their own
/// balance; a second pass takes any shortfall from whoever still has some.
/// Returns the amount actually removed.
pub fn remove_distributed(balances: &mut [u32], amount: u32) -> u32 {
    let total: u32 = balances.iter().copied().fold(0, u32::saturating_add);
    let amount = amount.min(total);
    let Ok(members) = u32::try_from(balances.len()) else {
        return 0;
    };
    if members == 0 || amount == 0 {
        return 0;
    }

    let per_member = amount / members;
    let remainder = amount % members;
    let mut removed = 0;
    for (slot, balance) in (0..members).zip(balances.iter_mut()) {
        let share = per_member + u32::from(slot < remainder);
        let taken = share.min(*balance);
        *balance -= taken;
        removed += taken;
    }

    for balance in balances.iter_mut() {
        if removed == amount {
            break;
        }
        let taken = (amount - removed).min(*balance);
        *balance -= taken;
        removed += taken;
    }
    removed
}

/// Add `amount` across members, remainder first.
pub fn add_distributed(balances: &mut [u32], amount: u32) {
    let Ok(members) = u32::try_from(balances.len()) else {
        return;
    };
    if members == 0 {
        return;
    }
    let per_member = amount / members;
    let remainder = amount % members;
    for (slot, balance) in (0..members).zip(balances.iter_mut()) {
        *balance = balance.saturating_add(per_member + u32::from(slot < remainder));
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Currency {
    Gold,
    Food,
}

impl Currency {
    fn balance(self, member: &PartyMember) -> u32 {
        match self {
            Currency::Gold => member.gold,
            Currency::Food => member.food,
        }
    }

    fn balance_mut(self, member: &mut PartyMember) -> &mut u32 {
        match self {
            Currency::Gold => &mut member.gold,
            Currency::Food => &mut member.food,
        }
    }
}

impl ActionEvent {
    /// Apply the action to the store.
    ///
    /// # Errors
    /// - `CorruptData` when a direction or ailment index is out of range
    pub fn apply(&self, node: NodeId, env: &mut EventEnv<'_>) -> Result<(), EventError> {
        let state = &mut *env.state;
        let (index, op) = (self.object_index, self.value);
        match self.action_type {
            ActionType::SetGlobalVariable => {
                let value = clear_set_toggle_leave(op, state.global_variable(index));
                state.set_global_variable(index, value);
                info!("└─ node {node}: global variable {index} = {value}");
            },
            ActionType::SetEventBit => {
                let at = BitAddress::event_bit(index);
                let value = clear_set_toggle_leave(op, state.event_bit(at.map, at.bit));
                state.set_event_bit(at.map, at.bit, value);
                info!("└─ node {node}: event bit {}:{} = {value}", at.map, at.bit);
            },
            ActionType::SetCharacterBit => {
                let at = BitAddress::character_bit(index);
                let value = clear_set_toggle_leave(op, state.character_bit(at.map, at.bit));
                state.set_character_bit(at.map, at.bit, value);
                info!("└─ node {node}: character bit {}:{} = {value}", at.map, at.bit);
            },
            ActionType::LockDoor => {
                let locked = clear_set_toggle_leave(op, state.is_door_locked(index));
                state.set_door_locked(index, locked);
                info!("└─ node {node}: door {index} locked = {locked}");
            },
            ActionType::LockChest => {
                let locked = clear_set_toggle_leave(op, state.is_chest_locked(index));
                state.set_chest_locked(index, locked);
                info!("└─ node {node}: chest {index} locked = {locked}");
            },
            ActionType::SetGameOption => {
                let value = clear_set_toggle_leave(op, state.game_option(index));
                state.set_game_option(index, value);
                info!("└─ node {node}: game option {index} = {value}");
            },
            ActionType::AddKeyword => {
                state.add_word(index);
                info!("└─ node {node}: learned word {index}");
            },
            ActionType::SetDirection => {
                let direction = u8::try_from(index)
                    .ok()
                    .and_then(Direction::from_code)
                    .ok_or_else(|| EventError::corrupt(node, format!("invalid direction {index}")))?;
                state.set_direction(direction);
                info!("└─ node {node}: facing {direction:?}");
            },
            ActionType::AddAilment => {
                let ailment = u8::try_from(index)
                    .ok()
                    .and_then(Ailment::from_index)
                    .ok_or_else(|| EventError::corrupt(node, format!("invalid ailment {index}")))?;
                let active = state.active_member();
                if let Some(member) = state.party_mut().get_mut(active) {
                    let value = clear_set_toggle_leave(op, member.has_ailment(ailment));
                    member.set_ailment(ailment, value);
                    info!("└─ node {node}: {} {ailment:?} = {value}", member.name);
                } else {
                    warn!("└─ node {node}: no active party member for ailment change");
                }
            },
            ActionType::AddItem => self.apply_item(node, env),
            ActionType::AddGold => self.apply_currency(node, env, Currency::Gold),
            ActionType::AddFood => self.apply_currency(node, env, Currency::Food),
        }
        Ok(())
    }

    fn apply_item(&self, node: NodeId, env: &mut EventEnv<'_>) {
        let item = self.object_index;
        let count = self.count.max(1);
        match self.value {
            1 => {
                add_item(env.state, item, count);
                info!("└─ node {node}: added {count}x item {item}");
            },
            0 => {
                let (removed, uncursed) = remove_items(env.state, item, count);
                for member in uncursed {
                    env.world.item_uncursed(member, item);
                }
                info!("└─ node {node}: removed {removed}/{count}x item {item}");
            },
            other => info!("└─ node {node}: item {item} left unchanged (operation {other})"),
        }
    }

    fn apply_currency(&self, node: NodeId, env: &mut EventEnv<'_>, currency: Currency) {
        let amount = u32::from(self.object_index);
        let unit_weight = match currency {
            Currency::Gold => env.config.gold_weight,
            Currency::Food => env.config.food_weight,
        };
        let party = env.state.party_mut();
        let before: Vec<u32> = party.iter().map(|m| currency.balance(m)).collect();
        let mut after = before.clone();
        match self.value {
            1 => add_distributed(&mut after, amount),
            0 => {
                let removed = remove_distributed(&mut after, amount);
                if removed < amount {
                    info!("└─ node {node}: party could only give up {removed} of {amount} {currency:?}");
                }
            },
            other => {
                info!("└─ node {node}: {currency:?} left unchanged (operation {other})");
                return;
            },
        }
        for ((member, old), new) in party.iter_mut().zip(before).zip(after) {
            *currency.balance_mut(member) = new;
            if new >= old {
                member.total_weight = member.total_weight.saturating_add((new - old).saturating_mul(unit_weight));
            } else {
                member.total_weight = member.total_weight.saturating_sub((old - new).saturating_mul(unit_weight));
            }
        }
        info!("└─ node {node}: {currency:?} {} {amount}", if self.value == 1 { "+" } else { "-" });
    }
}

/// Give items to the active member, stacking onto an uncursed slot of the same item.
fn add_item(state: &mut dyn StateStore, item_index: u16, count: u16) {
    let active = state.active_member();
    let Some(member) = state.party_mut().get_mut(active) else {
        warn!("no active party member to receive item {item_index}");
        return;
    };
    if let Some(slot) = member
        .inventory
        .iter_mut()
        .find(|slot| slot.item_index == item_index && !slot.cursed)
    {
        slot.amount = slot.amount.saturating_add(count);
    } else {
        member.inventory.push(ItemSlot {
            item_index,
            amount: count,
            cursed: false,
        });
    }
}

/// Remove up to `count` items, all inventories first, then equipment.
///
/// Returns how many were removed and which members lost a cursed equipped copy.
fn remove_items(state: &mut dyn StateStore, item_index: u16, count: u16) -> (u16, Vec<usize>) {
    let mut remaining = count;
    let mut uncursed = Vec::new();
    let party = state.party_mut();

    for member in party.iter_mut() {
        remaining = take_from_slots(&mut member.inventory, item_index, remaining).0;
    }
    for (index, member) in party.iter_mut().enumerate() {
        let (left, cursed_removed) = take_from_slots(&mut member.equipment, item_index, remaining);
        remaining = left;
        if cursed_removed {
            uncursed.push(index);
        }
    }
    (count - remaining, uncursed)
}

fn take_from_slots(slots: &mut Vec<ItemSlot>, item_index: u16, mut remaining: u16) -> (u16, bool) {
    let mut cursed_removed = false;
    for slot in slots.iter_mut().filter(|slot| slot.item_index == item_index) {
        if remaining == 0 {
            break;
        }
        let taken = remaining.min(slot.amount);
        slot.amount -= taken;
        remaining -= taken;
        if taken > 0 && slot.cursed {
            slot.cursed = false;
            cursed_removed = true;
        }
    }
    slots.retain(|slot| slot.amount > 0);
    (remaining, cursed_removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::dictionary::Dictionary;
    use crate::hooks::{HookCall, RecordingHooks};
    use crate::rng::ScriptedRng;
    use crate::state::Savegame;

    fn run(save: &mut Savegame, hooks: &mut RecordingHooks, action: &ActionEvent) -> Result<(), EventError> {
        let config = EngineConfig::default();
        let dictionary = Dictionary::default();
        let mut rng = ScriptedRng::default();
        let mut env = EventEnv {
            state: save,
            world: hooks,
            rng: &mut rng,
            config: &config,
            dictionary: &dictionary,
        };
        action.apply(NodeId(0), &mut env)
    }

    fn action(action_type: ActionType, object_index: u16, value: u16) -> ActionEvent {
        ActionEvent {
            action_type,
            object_index,
            value,
            count: 0,
        }
    }

    fn party_with_gold(gold: &[u32]) -> Savegame {
        Savegame {
            party: gold
                .iter()
                .map(|g| PartyMember {
                    gold: *g,
                    total_weight: *g * 5,
                    ..PartyMember::default()
                })
                .collect(),
            ..Savegame::default()
        }
    }

    #[test]
    fn clear_set_toggle_leave_table() {
        let results: Vec<bool> = (0..4).map(|op| clear_set_toggle_leave(op, true)).collect();
        assert_eq!(results, vec![false, true, false, true]);
        assert!(clear_set_toggle_leave(2, false));
        assert!(!clear_set_toggle_leave(9, false));
    }

    #[test]
    fn removal_is_capped_and_swept() {
        let mut balances = [5, 3, 0];
        assert_eq!(remove_distributed(&mut balances, 10), 8);
        assert_eq!(balances, [0, 0, 0]);
    }

    #[test]
    fn removal_gives_remainder_to_first_members() {
        let mut balances = [10, 10, 10];
        assert_eq!(remove_distributed(&mut balances, 7), 7);
        assert_eq!(balances, [7, 8, 8]);
    }

    #[test]
    fn removal_sweeps_shortfall_from_richer_members() {
        let mut balances = [1, 20, 20];
        assert_eq!(remove_distributed(&mut balances, 12), 12);
        assert_eq!(balances, [0, 13, 16]);
    }

    #[test]
    fn adding_splits_remainder_first() {
        let mut balances = [0; 4];
        add_distributed(&mut balances, 50);
        assert_eq!(balances, [13, 13, 12, 12]);
        let mut empty: [u32; 0] = [];
        add_distributed(&mut empty, 5);
        assert_eq!(remove_distributed(&mut empty, 5), 0);
    }

    #[test]
    fn gold_action_adjusts_weight() {
        let mut save = party_with_gold(&[5, 3, 0]);
        let mut hooks = RecordingHooks::default();
        run(&mut save, &mut hooks, &action(ActionType::AddGold, 10, 0)).expect("action");
        let gold: Vec<u32> = save.party.iter().map(|m| m.gold).collect();
        assert_eq!(gold, vec![0, 0, 0]);
        assert!(save.party.iter().all(|m| m.total_weight == 0));

        run(&mut save, &mut hooks, &action(ActionType::AddGold, 4, 1)).expect("action");
        assert_eq!(save.party[0].gold, 2);
        assert_eq!(save.party[0].total_weight, 10);
    }

    #[test]
    fn unknown_operation_leaves_gold_alone() {
        let mut save = party_with_gold(&[5]);
        let mut hooks = RecordingHooks::default();
        run(&mut save, &mut hooks, &action(ActionType::AddGold, 3, 7)).expect("action");
        assert_eq!(save.party[0].gold, 5);
    }

    #[test]
    fn flags_follow_the_shared_policy() {
        let mut save = Savegame::default();
        let mut hooks = RecordingHooks::default();
        run(&mut save, &mut hooks, &action(ActionType::SetGlobalVariable, 3, 2)).expect("action");
        assert!(save.global_variable(3));
        run(&mut save, &mut hooks, &action(ActionType::SetEventBit, 65, 1)).expect("action");
        assert!(save.event_bit(2, 1));
        run(&mut save, &mut hooks, &action(ActionType::LockDoor, 8, 0)).expect("action");
        assert!(!save.is_door_locked(8));
        run(&mut save, &mut hooks, &action(ActionType::AddKeyword, 11, 0)).expect("action");
        assert!(save.knows_word(11));
    }

    #[test]
    fn direction_out_of_range_is_corrupt() {
        let mut save = Savegame::default();
        let mut hooks = RecordingHooks::default();
        run(&mut save, &mut hooks, &action(ActionType::SetDirection, 2, 0)).expect("action");
        assert_eq!(save.direction, Direction::Down);
        let err = run(&mut save, &mut hooks, &action(ActionType::SetDirection, 9, 0)).unwrap_err();
        assert!(matches!(err, EventError::CorruptData { .. }));
    }

    #[test]
    fn item_removal_prefers_inventory_then_uncurses_equipment() {
        let mut save = Savegame {
            party: vec![
                PartyMember {
                    equipment: vec![ItemSlot { item_index: 9, amount: 1, cursed: true }],
                    ..PartyMember::default()
                },
                PartyMember {
                    inventory: vec![ItemSlot { item_index: 9, amount: 1, cursed: false }],
                    ..PartyMember::default()
                },
            ],
            ..Savegame::default()
        };
        let mut hooks = RecordingHooks::default();
        let mut remove = action(ActionType::AddItem, 9, 0);
        run(&mut save, &mut hooks, &remove).expect("action");
        assert!(save.party[1].inventory.is_empty());
        assert_eq!(save.party[0].equipment.len(), 1);
        assert!(hooks.calls.is_empty());

        remove.count = 1;
        run(&mut save, &mut hooks, &remove).expect("action");
        assert!(save.party[0].equipment.is_empty());
        assert_eq!(hooks.calls, vec![HookCall::ItemUncursed(0, 9)]);
    }

    #[test]
    fn item_add_stacks_on_active_member() {
        let mut save = Savegame {
            party: vec![PartyMember::default(), PartyMember::default()],
            active_member: 1,
            ..Savegame::default()
        };
        let mut hooks = RecordingHooks::default();
        let mut add = action(ActionType::AddItem, 2, 1);
        add.count = 3;
        run(&mut save, &mut hooks, &add).expect("action");
        run(&mut save, &mut hooks, &add).expect("action");
        assert_eq!(save.party[1].inventory, vec![ItemSlot { item_index: 2, amount: 6, cursed: false }]);
        assert!(save.party[0].inventory.is_empty());
    }
}
