//! Combat system module
//!
//! ECS ответственность:
//! - Таймеры бойцов (attack/cooldown/invuln/stun/defeat)
//! - Обмен ударами в обе стороны каждый тик
//! - Hit-freeze и очки за попадания (через MatchState)
//! - Events: HitLanded, HealthChanged, ScoreChanged

use bevy::prelude::*;

pub mod resolver;

pub use resolver::{hit_freeze_for, resolve_exchange, resolve_trade, score_for, HitReport};

use crate::components::{ControlKind, Fighter};
use crate::events::{HealthChanged, HitLanded, ScoreChanged};
use crate::logger;
use crate::match_flow::{GameMode, MatchState};
use crate::{duel_running, DuelSet};

/// Combat Plugin
///
/// Порядок выполнения (внутри цепочки DuelSet):
/// 1. tick_fighters (Timers) - таймеры и метка действия
/// 2. resolve_combat (Combat) - размен P1⇄P2
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<HitLanded>()
            .add_event::<HealthChanged>()
            .add_event::<ScoreChanged>();

        app.add_systems(
            FixedUpdate,
            (
                tick_fighters.in_set(DuelSet::Timers),
                resolve_combat.in_set(DuelSet::Combat),
            )
                .run_if(duel_running),
        );
    }
}

/// Система: per-tick update каждого бойца
pub fn tick_fighters(mut fighters: Query<&mut Fighter>) {
    for mut fighter in fighters.iter_mut() {
        fighter.update();
    }
}

/// Система: combat resolution
///
/// Оба направления оцениваются по состоянию на начало обмена, поэтому
/// встречный размен (и двойной KO) возможен. Порядок событий фиксирован по слоту.
pub fn resolve_combat(
    mut fighters: Query<&mut Fighter>,
    mut state: ResMut<MatchState>,
    mut hit_events: EventWriter<HitLanded>,
    mut health_events: EventWriter<HealthChanged>,
    mut score_events: EventWriter<ScoreChanged>,
) {
    let mut pair: Vec<Mut<Fighter>> = fighters.iter_mut().collect();
    if pair.len() != 2 {
        logger::log_warning(&format!("resolve_combat: expected 2 fighters, found {}", pair.len()));
        return;
    }
    pair.sort_by_key(|fighter| fighter.slot);

    let (first, second) = pair.split_at_mut(1);
    let p1: &mut Fighter = &mut first[0];
    let p2: &mut Fighter = &mut second[0];

    let reports = resolve_trade(p1, p2);
    let controls = [p1.control, p2.control];

    for (report, attacker_control) in reports.into_iter().zip(controls) {
        let Some(report) = report else {
            continue;
        };

        state.trigger_hit_freeze(hit_freeze_for(report.damage));

        if state.mode == Some(GameMode::OnePlayer) && attacker_control == ControlKind::Human {
            let score = state.award_hit(score_for(report.damage));
            score_events.write(ScoreChanged { score });
        }

        hit_events.write(HitLanded {
            attacker: report.attacker,
            defender: report.defender,
            attack_type: report.attack_type,
            damage: report.damage,
            blocked: report.blocked,
            lethal: report.lethal,
        });
        health_events.write(HealthChanged {
            slot: report.defender,
            health: report.defender_health,
        });

        if report.lethal {
            logger::log_info(&format!(
                "{:?} defeated by {:?} ({})",
                report.defender,
                report.attacker,
                report.attack_type.as_str()
            ));
        }
    }
}
