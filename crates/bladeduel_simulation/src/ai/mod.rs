//! AI decision-making module
//!
//! Decision tree для AI-бойца (1P режим). Интенты AI идут через те же
//! методы `Fighter`, что и человеческие.

use bevy::prelude::*;
use rand::Rng;

pub mod brain;

// Re-export основных типов
pub use brain::{ActionOutcome, AiAction, AiBrain};

use crate::components::Fighter;
use crate::config::DuelConfig;
use crate::events::{AttackSwing, FighterJumped};
use crate::logger;
use crate::{duel_running, DeterministicRng, DuelSet};

/// AI Plugin
///
/// Работает в DuelSet::Intents после человеческого ввода:
/// cadence → decision (roll из DeterministicRng) → execute.
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<FighterJumped>().add_event::<AttackSwing>();

        app.add_systems(
            FixedUpdate,
            drive_ai_fighters
                .in_set(DuelSet::Intents)
                .after(crate::input::apply_human_intents)
                .before(crate::input::face_opponents)
                .run_if(duel_running),
        );
    }
}

/// Система: AI cadence + decision + execution
pub fn drive_ai_fighters(
    mut fighters: Query<(&mut Fighter, Option<&mut AiBrain>)>,
    config: Res<DuelConfig>,
    mut rng: ResMut<DeterministicRng>,
    mut jump_events: EventWriter<FighterJumped>,
    mut swing_events: EventWriter<AttackSwing>,
) {
    let mut pair: Vec<(Mut<Fighter>, Option<Mut<AiBrain>>)> = fighters.iter_mut().collect();
    if pair.len() != 2 {
        return;
    }
    pair.sort_by_key(|(fighter, _)| fighter.slot);

    let (first, second) = pair.split_at_mut(1);
    let (p1, p1_brain) = &mut first[0];
    let (p2, p2_brain) = &mut second[0];

    let outcomes = [
        p1_brain
            .as_deref_mut()
            .map(|brain| drive_brain(brain, p1, p2, config.stage_width, &mut rng)),
        p2_brain
            .as_deref_mut()
            .map(|brain| drive_brain(brain, p2, p1, config.stage_width, &mut rng)),
    ];

    for (outcome, slot) in outcomes.into_iter().zip([p1.slot, p2.slot]) {
        let Some(outcome) = outcome else {
            continue;
        };
        if outcome.jumped {
            jump_events.write(FighterJumped { slot });
        }
        if let Some(attack_type) = outcome.swung {
            swing_events.write(AttackSwing { slot, attack_type });
        }
    }
}

fn drive_brain(
    brain: &mut AiBrain,
    me: &mut Fighter,
    opponent: &Fighter,
    stage_width: f32,
    rng: &mut DeterministicRng,
) -> ActionOutcome {
    if me.defeated {
        return ActionOutcome::default();
    }

    if brain.tick() {
        let roll: f32 = rng.rng.gen();
        let previous = brain.action;
        brain.decide(me, opponent, stage_width, roll);
        if brain.action != previous {
            logger::log(&format!(
                "{:?} AI: {:?} → {:?} (roll {:.3})",
                me.slot, previous, brain.action, roll
            ));
        }
    }

    brain.execute(me, stage_width)
}
