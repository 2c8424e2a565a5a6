//! Award and trap nodes: change party-member stats.

use log::{info, warn};

use crate::env::EventEnv;
use crate::event::NodeId;
use crate::state::{Ailment, PartyMember, StatValue};

/// Which members an award or trap applies to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AwardTarget {
    ActivePlayer,
    /// Every living member.
    All,
}

impl AwardTarget {
    pub fn from_code(code: u8) -> Option<AwardTarget> {
        match code {
            0 => Some(AwardTarget::ActivePlayer),
            1 => Some(AwardTarget::All),
            _ => None,
        }
    }

    /// Party indices this target selects; dead members are skipped.
    pub fn members(self, party: &[PartyMember], active: usize) -> Vec<usize> {
        match self {
            AwardTarget::ActivePlayer => party
                .get(active)
                .filter(|member| member.is_alive())
                .map(|_| vec![active])
                .unwrap_or_default(),
            AwardTarget::All => party
                .iter()
                .enumerate()
                .filter(|(_, member)| member.is_alive())
                .map(|(index, _)| index)
                .collect(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AwardType {
    Attribute(u16),
    Skill(u16),
    HitPoints,
    SpellPoints,
    SpellLearningPoints,
    /// Ailment bit index.
    Ailments(u16),
    /// Spell school bit index.
    UsableSpellTypes(u16),
    /// Language bit index.
    Languages(u16),
    Experience,
    TrainingPoints,
}

impl AwardType {
    /// Decode from the raw type code and its `type_value` parameter.
    pub fn from_code(code: u8, type_value: u16) -> Option<AwardType> {
        let kind = match code {
            0 => AwardType::Attribute(type_value),
            1 => AwardType::Skill(type_value),
            2 => AwardType::HitPoints,
            3 => AwardType::SpellPoints,
            4 => AwardType::SpellLearningPoints,
            5 => AwardType::Ailments(type_value),
            6 => AwardType::UsableSpellTypes(type_value),
            7 => AwardType::Languages(type_value),
            8 => AwardType::Experience,
            9 => AwardType::TrainingPoints,
            _ => return None,
        };
        Some(kind)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AwardOperation {
    Increase,
    Decrease,
    IncreasePercentage,
    DecreasePercentage,
    Fill,
    Remove,
    Add,
}

impl AwardOperation {
    pub fn from_code(code: u8) -> Option<AwardOperation> {
        use AwardOperation::*;
        [Increase, Decrease, IncreasePercentage, DecreasePercentage, Fill, Remove, Add]
            .get(usize::from(code))
            .copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardEvent {
    pub target: AwardTarget,
    pub award_type: AwardType,
    pub operation: AwardOperation,
    /// Roll the amount in `1..=value` for each member.
    pub random: bool,
    pub value: u16,
}

/// One party member hit by a trap.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TrapHit {
    pub member: usize,
    pub damage: u32,
    pub ailment: Option<Ailment>,
}

impl AwardEvent {
    pub fn apply(&self, node: NodeId, env: &mut EventEnv<'_>) {
        if self.random && self.value == 0 {
            info!("└─ node {node}: random award {:?} rolls nothing (value 0)", self.award_type);
            return;
        }
        let targets = self.target.members(env.state.party(), env.state.active_member());
        if targets.is_empty() {
            warn!("└─ node {node}: award {:?} has no living target", self.award_type);
            return;
        }
        for index in targets {
            let amount = if self.random {
                env.rng.random_int(1, u32::from(self.value))
            } else {
                u32::from(self.value)
            };
            if let Some(member) = env.state.party_mut().get_mut(index) {
                self.apply_to(node, member, amount);
            }
        }
    }

    fn apply_to(&self, node: NodeId, member: &mut PartyMember, amount: u32) {
        use AwardOperation as Op;
        match self.award_type {
            AwardType::HitPoints if self.operation == Op::Decrease => {
                // silent damage: no host notification
                let taken = member.take_damage(amount);
                info!("└─ node {node}: {} loses {taken} HP", member.name);
            },
            AwardType::HitPoints => apply_stat(&mut member.hit_points, self.operation, amount),
            AwardType::SpellPoints => apply_stat(&mut member.spell_points, self.operation, amount),
            AwardType::Attribute(index) => match member.attributes.get_mut(usize::from(index)) {
                Some(stat) => apply_stat(stat, self.operation, amount),
                None => warn!("└─ node {node}: {} has no attribute {index}", member.name),
            },
            AwardType::Skill(index) => match member.skills.get_mut(usize::from(index)) {
                Some(stat) => apply_stat(stat, self.operation, amount),
                None => warn!("└─ node {node}: {} has no skill {index}", member.name),
            },
            AwardType::SpellLearningPoints => apply_counter(&mut member.spell_learning_points, self.operation, amount),
            AwardType::Experience => apply_counter(&mut member.experience, self.operation, amount),
            AwardType::TrainingPoints => apply_counter(&mut member.training_points, self.operation, amount),
            AwardType::Ailments(bit) => match (u8::try_from(bit).ok().and_then(Ailment::from_index), self.operation) {
                (Some(ailment), Op::Add) => member.set_ailment(ailment, true),
                (Some(ailment), Op::Remove) => member.set_ailment(ailment, false),
                _ => warn!("└─ node {node}: ailment award {bit} with {:?} ignored", self.operation),
            },
            AwardType::UsableSpellTypes(bit) => apply_bit(node, &mut member.spell_schools, bit, self.operation),
            AwardType::Languages(bit) => apply_bit(node, &mut member.languages, bit, self.operation),
        }
        info!(
            "└─ node {node}: award {:?} {:?} {amount} to {}",
            self.award_type, self.operation, member.name
        );
    }
}

fn percent_of(base: u32, percent: u32) -> u32 {
    u32::try_from(u64::from(base) * u64::from(percent) / 100).unwrap_or(u32::MAX)
}

fn apply_stat(stat: &mut StatValue, operation: AwardOperation, amount: u32) {
    let new = match operation {
        AwardOperation::Increase => stat.current.saturating_add(amount),
        AwardOperation::Decrease => stat.current.saturating_sub(amount),
        AwardOperation::IncreasePercentage => stat.current.saturating_add(percent_of(stat.max, amount)),
        AwardOperation::DecreasePercentage => stat.current.saturating_sub(percent_of(stat.max, amount)),
        AwardOperation::Fill => stat.max,
        AwardOperation::Remove | AwardOperation::Add => stat.current,
    };
    stat.current = new.min(stat.max);
}

fn apply_counter(counter: &mut u32, operation: AwardOperation, amount: u32) {
    *counter = match operation {
        AwardOperation::Increase => counter.saturating_add(amount),
        AwardOperation::Decrease => counter.saturating_sub(amount),
        AwardOperation::IncreasePercentage => counter.saturating_add(percent_of(*counter, amount)),
        AwardOperation::DecreasePercentage => counter.saturating_sub(percent_of(*counter, amount)),
        AwardOperation::Fill | AwardOperation::Remove | AwardOperation::Add => *counter,
    };
}

fn apply_bit(node: NodeId, bits: &mut u8, bit: u16, operation: AwardOperation) {
    let Some(mask) = (bit < 8).then(|| 1u8 << bit) else {
        warn!("└─ node {node}: bit {bit} out of range");
        return;
    };
    match operation {
        AwardOperation::Add => *bits |= mask,
        AwardOperation::Remove => *bits &= !mask,
        other => warn!("└─ node {node}: bit award with {other:?} ignored"),
    }
}

/// Damage the targeted living members and apply the trap's ailment.
pub fn spring_trap(node: NodeId, trap: &crate::event::TrapEvent, env: &mut EventEnv<'_>) -> Vec<TrapHit> {
    let targets = trap.target.members(env.state.party(), env.state.active_member());
    let mut hits = Vec::with_capacity(targets.len());
    for index in targets {
        let rolled = if trap.base_damage == 0 {
            0
        } else {
            env.rng.random_int(1, u32::from(trap.base_damage))
        };
        let Some(member) = env.state.party_mut().get_mut(index) else {
            continue;
        };
        let damage = member.take_damage(rolled);
        if let Some(ailment) = trap.ailment {
            member.set_ailment(ailment, true);
        }
        info!("└─ node {node}: trap hits {} for {damage}", member.name);
        hits.push(TrapHit {
            member: index,
            damage,
            ailment: trap.ailment,
        });
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::dictionary::Dictionary;
    use crate::event::TrapEvent;
    use crate::hooks::RecordingHooks;
    use crate::rng::ScriptedRng;
    use crate::state::Savegame;

    fn member(name: &str, hp: u32) -> PartyMember {
        PartyMember {
            name: name.to_string(),
            hit_points: StatValue::new(hp, 40),
            attributes: vec![StatValue::new(10, 50); 3],
            ..PartyMember::default()
        }
    }

    fn with_env<R>(save: &mut Savegame, rolls: &[u32], f: impl FnOnce(&mut EventEnv<'_>) -> R) -> R {
        let config = EngineConfig::default();
        let dictionary = Dictionary::default();
        let mut hooks = RecordingHooks::default();
        let mut rng = ScriptedRng::new(rolls.to_vec());
        let mut env = EventEnv {
            state: save,
            world: &mut hooks,
            rng: &mut rng,
            config: &config,
            dictionary: &dictionary,
        };
        f(&mut env)
    }

    fn award(target: AwardTarget, award_type: AwardType, operation: AwardOperation, value: u16) -> AwardEvent {
        AwardEvent {
            target,
            award_type,
            operation,
            random: false,
            value,
        }
    }

    #[test]
    fn all_target_skips_dead_members() {
        let mut dead = member("B", 0);
        dead.set_ailment(Ailment::Dead, true);
        let party = vec![member("A", 10), dead, member("C", 10)];
        assert_eq!(AwardTarget::All.members(&party, 0), vec![0, 2]);
        assert!(AwardTarget::ActivePlayer.members(&party, 1).is_empty());
    }

    #[test]
    fn attribute_increase_is_capped_at_max() {
        let mut save = Savegame {
            party: vec![member("A", 10)],
            ..Savegame::default()
        };
        let event = award(AwardTarget::ActivePlayer, AwardType::Attribute(1), AwardOperation::Increase, 100);
        with_env(&mut save, &[], |env| event.apply(NodeId(0), env));
        assert_eq!(save.party[0].attributes[1].current, 50);
        assert_eq!(save.party[0].attributes[0].current, 10);
    }

    #[test]
    fn hit_point_decrease_can_kill_silently() {
        let mut save = Savegame {
            party: vec![member("A", 6), member("B", 30)],
            ..Savegame::default()
        };
        let event = award(AwardTarget::All, AwardType::HitPoints, AwardOperation::Decrease, 10);
        with_env(&mut save, &[], |env| event.apply(NodeId(0), env));
        assert!(!save.party[0].is_alive());
        assert_eq!(save.party[1].hit_points.current, 20);
    }

    #[test]
    fn random_amount_is_rolled_per_member() {
        let mut save = Savegame {
            party: vec![member("A", 0), member("B", 0)],
            ..Savegame::default()
        };
        for m in &mut save.party {
            m.hit_points = StatValue::new(1, 40);
        }
        let mut event = award(AwardTarget::All, AwardType::HitPoints, AwardOperation::Increase, 10);
        event.random = true;
        with_env(&mut save, &[4, 7], |env| event.apply(NodeId(0), env));
        assert_eq!(save.party[0].hit_points.current, 5);
        assert_eq!(save.party[1].hit_points.current, 8);
    }

    #[test]
    fn random_award_of_zero_grants_nothing() {
        let mut save = Savegame {
            party: vec![member("A", 10)],
            ..Savegame::default()
        };
        let mut event = award(AwardTarget::ActivePlayer, AwardType::Experience, AwardOperation::Increase, 0);
        event.random = true;
        with_env(&mut save, &[1], |env| event.apply(NodeId(0), env));
        assert_eq!(save.party[0].experience, 0);
    }

    #[test]
    fn fill_and_language_bits() {
        let mut save = Savegame {
            party: vec![member("A", 3)],
            ..Savegame::default()
        };
        let fill = award(AwardTarget::ActivePlayer, AwardType::HitPoints, AwardOperation::Fill, 0);
        let language = award(AwardTarget::ActivePlayer, AwardType::Languages(2), AwardOperation::Add, 0);
        with_env(&mut save, &[], |env| {
            fill.apply(NodeId(0), env);
            language.apply(NodeId(1), env);
        });
        assert_eq!(save.party[0].hit_points.current, 40);
        assert_eq!(save.party[0].languages, 0b100);
    }

    #[test]
    fn trap_damages_and_afflicts_each_living_member() {
        let mut save = Savegame {
            party: vec![member("A", 20), member("B", 2)],
            ..Savegame::default()
        };
        let trap = TrapEvent {
            target: AwardTarget::All,
            base_damage: 8,
            ailment: Some(Ailment::Poisoned),
        };
        let hits = with_env(&mut save, &[5, 6], |env| spring_trap(NodeId(3), &trap, env));
        assert_eq!(
            hits,
            vec![
                TrapHit { member: 0, damage: 5, ailment: Some(Ailment::Poisoned) },
                TrapHit { member: 1, damage: 2, ailment: Some(Ailment::Poisoned) },
            ]
        );
        assert_eq!(save.party[0].hit_points.current, 15);
        assert!(save.party[0].has_ailment(Ailment::Poisoned));
        assert!(!save.party[1].is_alive());
    }
}
