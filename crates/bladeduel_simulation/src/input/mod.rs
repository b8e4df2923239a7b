//! Input adapter - человеческие интенты → Fighter
//!
//! Хост (клавиатура, скрипт, тест) кладёт `FighterIntents` в `PendingIntents`.
//! Следующий рабочий тик забирает их; во время hit-freeze они ждут в очереди.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::{AttackType, ControlKind, Fighter, FighterSlot};
use crate::events::{AttackSwing, FighterJumped};
use crate::{duel_running, DuelSet};

/// Ошибки на границе ввода.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentError {
    #[error("slot {0:?} is driven by the AI and accepts no external intents")]
    AiControlledSlot(FighterSlot),
    #[error("unknown attack type '{0}'")]
    UnknownAttackType(String),
}

/// Интенты одного бойца на один тик.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterIntents {
    pub move_left: bool,
    pub move_right: bool,
    /// Edge-triggered: только в тике нажатия
    pub jump: bool,
    pub block: bool,
    pub attack: Option<AttackType>,
}

impl FighterIntents {
    /// Объединить с более поздним вводом в пределах одного тика.
    /// Первая запрошенная атака остаётся.
    pub fn merge(&mut self, later: FighterIntents) {
        self.move_left |= later.move_left;
        self.move_right |= later.move_right;
        self.jump |= later.jump;
        self.block |= later.block;
        if self.attack.is_none() {
            self.attack = later.attack;
        }
    }
}

/// Очередь интентов по слотам.
#[derive(Resource, Debug, Default)]
pub struct PendingIntents {
    slots: [Option<FighterIntents>; 2],
    ai_slot: Option<FighterSlot>,
}

impl PendingIntents {
    pub fn submit(&mut self, slot: FighterSlot, intents: FighterIntents) -> Result<(), IntentError> {
        if self.ai_slot == Some(slot) {
            return Err(IntentError::AiControlledSlot(slot));
        }
        match &mut self.slots[slot.index()] {
            Some(queued) => queued.merge(intents),
            empty => *empty = Some(intents),
        }
        Ok(())
    }

    /// Запросить атаку по имени (строгий парсер).
    pub fn submit_attack_named(&mut self, slot: FighterSlot, name: &str) -> Result<(), IntentError> {
        let attack_type: AttackType = name.parse()?;
        self.submit(
            slot,
            FighterIntents {
                attack: Some(attack_type),
                ..Default::default()
            },
        )
    }

    pub fn take(&mut self, slot: FighterSlot) -> Option<FighterIntents> {
        self.slots[slot.index()].take()
    }

    pub fn peek(&self, slot: FighterSlot) -> Option<&FighterIntents> {
        self.slots[slot.index()].as_ref()
    }

    /// Новая расстановка (старт матча): очередь сбрасывается.
    pub fn configure(&mut self, ai_slot: Option<FighterSlot>) {
        self.slots = [None, None];
        self.ai_slot = ai_slot;
    }

    pub fn ai_slot(&self) -> Option<FighterSlot> {
        self.ai_slot
    }
}

/// Input plugin
///
/// DuelSet::Intents: human intents → (AI) → facing.
pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PendingIntents>()
            .add_event::<FighterJumped>()
            .add_event::<AttackSwing>();

        app.add_systems(
            FixedUpdate,
            (apply_human_intents, face_opponents)
                .chain()
                .in_set(DuelSet::Intents)
                .run_if(duel_running),
        );
    }
}

/// Применить интенты к бойцу в каноничном порядке.
/// Возвращает (прыжок начался, принятая атака).
pub fn apply_intents(fighter: &mut Fighter, intents: &FighterIntents) -> (bool, Option<AttackType>) {
    if intents.move_left {
        fighter.move_left();
    }
    if intents.move_right {
        fighter.move_right();
    }
    let jumped = intents.jump && fighter.jump();
    fighter.block(intents.block);
    let swung = intents
        .attack
        .filter(|attack_type| fighter.attack(*attack_type));
    (jumped, swung)
}

/// Система: забрать pending интенты и применить к человеческим бойцам
pub fn apply_human_intents(
    mut fighters: Query<&mut Fighter>,
    mut pending: ResMut<PendingIntents>,
    mut jump_events: EventWriter<FighterJumped>,
    mut swing_events: EventWriter<AttackSwing>,
) {
    for mut fighter in fighters.iter_mut() {
        if fighter.control != ControlKind::Human {
            continue;
        }
        // Интенты забираем всегда, даже если боец повержен
        let intents = pending.take(fighter.slot).unwrap_or_default();
        if fighter.defeated {
            continue;
        }

        let (jumped, swung) = apply_intents(&mut fighter, &intents);
        if jumped {
            jump_events.write(FighterJumped { slot: fighter.slot });
        }
        if let Some(attack_type) = swung {
            swing_events.write(AttackSwing {
                slot: fighter.slot,
                attack_type,
            });
        }
    }
}

/// Система: бойцы смотрят друг на друга (кроме атакующих)
pub fn face_opponents(mut fighters: Query<&mut Fighter>) {
    let mut pair: Vec<Mut<Fighter>> = fighters.iter_mut().collect();
    if pair.len() != 2 || pair.iter().any(|fighter| fighter.defeated) {
        return;
    }

    let xs = [pair[0].body.x, pair[1].body.x];
    for (i, fighter) in pair.iter_mut().enumerate() {
        if !fighter.is_attacking {
            fighter.facing_right = xs[i] < xs[1 - i];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_slot_rejects_intents() {
        let mut pending = PendingIntents::default();
        pending.configure(Some(FighterSlot::P2));
        assert_eq!(
            pending.submit(FighterSlot::P2, FighterIntents::default()),
            Err(IntentError::AiControlledSlot(FighterSlot::P2))
        );
        assert!(pending.submit(FighterSlot::P1, FighterIntents::default()).is_ok());
    }

    #[test]
    fn test_unknown_attack_name_rejected() {
        let mut pending = PendingIntents::default();
        assert_eq!(
            pending.submit_attack_named(FighterSlot::P1, "kick"),
            Err(IntentError::UnknownAttackType("kick".to_string()))
        );
        assert!(pending.peek(FighterSlot::P1).is_none());

        pending.submit_attack_named(FighterSlot::P1, "special").unwrap();
        assert_eq!(
            pending.take(FighterSlot::P1).and_then(|i| i.attack),
            Some(AttackType::Special)
        );
        assert!(pending.take(FighterSlot::P1).is_none());
    }

    #[test]
    fn test_merge_keeps_first_attack() {
        let mut pending = PendingIntents::default();
        pending
            .submit(FighterSlot::P1, FighterIntents { attack: Some(AttackType::Light), ..Default::default() })
            .unwrap();
        pending
            .submit(
                FighterSlot::P1,
                FighterIntents { move_right: true, attack: Some(AttackType::Heavy), ..Default::default() },
            )
            .unwrap();
        let merged = pending.take(FighterSlot::P1).unwrap();
        assert!(merged.move_right);
        assert_eq!(merged.attack, Some(AttackType::Light));
    }

    #[test]
    fn test_apply_intents_order() {
        let mut fighter = Fighter::new(FighterSlot::P1, ControlKind::Human, 300.0, 420.0, true);
        let intents = FighterIntents {
            jump: true,
            block: true,
            attack: Some(AttackType::Heavy),
            ..Default::default()
        };
        let (jumped, swung) = apply_intents(&mut fighter, &intents);
        assert!(jumped);
        assert_eq!(swung, Some(AttackType::Heavy));
        // Атака после блока снимает блок
        assert!(!fighter.is_blocking);
    }
}
