//! Match / round controller
//!
//! ECS ответственность:
//! - MatchCommand (start / rematch / menu) → spawn/despawn бойцов
//! - Часы раунда, проверка KO, итог раунда, пауза между раундами
//! - UI events: TimerChanged, ScoreChanged, RoundChanged, RoundEnded, MatchEnded

use bevy::prelude::*;

pub mod state;

pub use state::{ClockTick, GameMode, MatchPhase, MatchState, RoundVerdict, ROUND_WIN_BONUS};

use crate::ai::AiBrain;
use crate::components::{ControlKind, Fighter, FighterSlot};
use crate::config::DuelConfig;
use crate::events::{
    HealthChanged, MatchCommand, MatchEnded, RoundChanged, RoundEnded, ScoreChanged, TimerChanged,
};
use crate::input::PendingIntents;
use crate::logger;
use crate::{duel_running, intermission_running, DuelSet};

/// Match Plugin
///
/// Порядок выполнения:
/// 1. process_match_commands (Commands) - всегда, даже во время freeze
/// 2. run_intermission (Flow) - только RoundEnd и не frozen
/// 3. tick_round_clock (Flow) - только Playing и не frozen
/// 4. referee_defeats (Referee) - KO → итог раунда
pub struct MatchPlugin;

impl Plugin for MatchPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MatchState>()
            .add_event::<MatchCommand>()
            .add_event::<HealthChanged>()
            .add_event::<TimerChanged>()
            .add_event::<ScoreChanged>()
            .add_event::<RoundChanged>()
            .add_event::<RoundEnded>()
            .add_event::<MatchEnded>();

        app.add_systems(
            FixedUpdate,
            (
                process_match_commands.in_set(DuelSet::Commands),
                // Пауза раньше часов: новый раунд начинает отсчёт в том же тике
                (
                    run_intermission.run_if(intermission_running),
                    tick_round_clock.run_if(duel_running),
                )
                    .chain()
                    .in_set(DuelSet::Flow),
                referee_defeats
                    .in_set(DuelSet::Referee)
                    .run_if(duel_running),
            ),
        );
    }
}

/// Spawn позиция и направление для слота.
pub fn spawn_placement(slot: FighterSlot, config: &DuelConfig) -> (f32, bool) {
    match slot {
        FighterSlot::P1 => (config.p1_spawn_x, true),
        FighterSlot::P2 => (config.p2_spawn_x(), false),
    }
}

/// Система: команды хоста (последняя команда тика побеждает)
#[allow(clippy::too_many_arguments)]
pub fn process_match_commands(
    mut commands: Commands,
    mut requests: EventReader<MatchCommand>,
    mut state: ResMut<MatchState>,
    config: Res<DuelConfig>,
    mut pending: ResMut<PendingIntents>,
    existing: Query<Entity, With<Fighter>>,
    mut health_events: EventWriter<HealthChanged>,
    mut timer_events: EventWriter<TimerChanged>,
    mut score_events: EventWriter<ScoreChanged>,
    mut round_events: EventWriter<RoundChanged>,
) {
    let Some(command) = requests.read().last().copied() else {
        return;
    };

    let mode = match command {
        MatchCommand::Start(mode) => mode,
        MatchCommand::Restart => match state.mode {
            Some(mode) => mode,
            None => {
                logger::log_warning("Restart requested with no match to replay");
                return;
            }
        },
        MatchCommand::ReturnToMenu => {
            for entity in existing.iter() {
                commands.entity(entity).despawn();
            }
            pending.configure(None);
            state.return_to_menu();
            logger::log_info("Returned to menu");
            return;
        }
    };

    // Полный reset: старые бойцы удаляются, новые создаются с нуля
    for entity in existing.iter() {
        commands.entity(entity).despawn();
    }

    for slot in FighterSlot::ALL {
        let (x, facing_right) = spawn_placement(slot, &config);
        if mode.ai_slot() == Some(slot) {
            commands.spawn((
                Fighter::new(slot, ControlKind::Ai, x, 0.0, facing_right),
                AiBrain::new(config.ai),
            ));
        } else {
            commands.spawn(Fighter::new(slot, ControlKind::Human, x, 0.0, facing_right));
        }
        health_events.write(HealthChanged {
            slot,
            health: crate::components::MAX_HEALTH,
        });
    }

    pending.configure(mode.ai_slot());
    state.begin(mode, &config);

    timer_events.write(TimerChanged { seconds: state.timer });
    score_events.write(ScoreChanged { score: state.score });
    round_events.write(RoundChanged { round: state.round });

    logger::log_info(&format!("Match started: {:?}", mode));
}

/// Система: часы раунда (тик-счётчик, секунда = tick_rate тиков)
#[allow(clippy::too_many_arguments)]
pub fn tick_round_clock(
    mut state: ResMut<MatchState>,
    config: Res<DuelConfig>,
    mut fighters: Query<(&Fighter, Option<&mut AiBrain>)>,
    mut timer_events: EventWriter<TimerChanged>,
    mut score_events: EventWriter<ScoreChanged>,
    mut round_ended_events: EventWriter<RoundEnded>,
    mut match_ended_events: EventWriter<MatchEnded>,
) {
    match state.tick_clock(config.tick_rate) {
        ClockTick::Running => {}
        ClockTick::SecondElapsed(seconds) => {
            timer_events.write(TimerChanged { seconds });
        }
        ClockTick::Expired => {
            timer_events.write(TimerChanged { seconds: 0 });
            logger::log_info("Round timer expired");
            settle_round(
                &mut state,
                &config,
                &mut fighters,
                &mut score_events,
                &mut round_ended_events,
                &mut match_ended_events,
            );
        }
    }
}

/// Система: KO → конец раунда после задержки
pub fn referee_defeats(
    mut state: ResMut<MatchState>,
    config: Res<DuelConfig>,
    mut fighters: Query<(&Fighter, Option<&mut AiBrain>)>,
    mut score_events: EventWriter<ScoreChanged>,
    mut round_ended_events: EventWriter<RoundEnded>,
    mut match_ended_events: EventWriter<MatchEnded>,
) {
    let knocked_out = fighters
        .iter()
        .any(|(fighter, _)| fighter.defeated && fighter.defeat_timer > config.defeat_end_delay);
    if !knocked_out {
        return;
    }

    settle_round(
        &mut state,
        &config,
        &mut fighters,
        &mut score_events,
        &mut round_ended_events,
        &mut match_ended_events,
    );
}

fn settle_round(
    state: &mut MatchState,
    config: &DuelConfig,
    fighters: &mut Query<(&Fighter, Option<&mut AiBrain>)>,
    score_events: &mut EventWriter<ScoreChanged>,
    round_ended_events: &mut EventWriter<RoundEnded>,
    match_ended_events: &mut EventWriter<MatchEnded>,
) {
    let mut health = [0u32; 2];
    for (fighter, _) in fighters.iter() {
        health[fighter.slot.index()] = fighter.health;
    }

    let score_before = state.score;
    let Some(verdict) = state.conclude_round(health, config) else {
        return;
    };

    logger::log_info(&format!(
        "Round {} over: winner {:?} (health P1={} P2={})",
        verdict.round, verdict.winner, health[0], health[1]
    ));

    if verdict.escalate_ai {
        for (_, brain) in fighters.iter_mut() {
            if let Some(mut brain) = brain {
                brain.increase_difficulty();
                logger::log(&format!(
                    "AI escalated: aggression {:.2}, interval {}",
                    brain.aggression, brain.decision_interval
                ));
            }
        }
    }

    if state.score != score_before {
        score_events.write(ScoreChanged { score: state.score });
    }
    round_ended_events.write(RoundEnded {
        round: verdict.round,
        winner: verdict.winner,
    });
    if let Some(outcome) = verdict.outcome {
        logger::log_info(&format!("Match over: {:?}", outcome));
        match_ended_events.write(MatchEnded { outcome });
    }
}

/// Система: пауза между раундами → reset бойцов и новый раунд
pub fn run_intermission(
    mut state: ResMut<MatchState>,
    config: Res<DuelConfig>,
    mut fighters: Query<(&mut Fighter, Option<&mut AiBrain>)>,
    mut health_events: EventWriter<HealthChanged>,
    mut timer_events: EventWriter<TimerChanged>,
    mut round_events: EventWriter<RoundChanged>,
) {
    if !state.tick_intermission() {
        return;
    }

    state.begin_next_round(&config);

    for (mut fighter, brain) in fighters.iter_mut() {
        let (x, facing_right) = spawn_placement(fighter.slot, &config);
        fighter.reset(x, facing_right);
        if let Some(mut brain) = brain {
            brain.reset();
        }
        health_events.write(HealthChanged {
            slot: fighter.slot,
            health: fighter.health,
        });
    }

    timer_events.write(TimerChanged { seconds: state.timer });
    round_events.write(RoundChanged { round: state.round });

    logger::log_info(&format!("Round {} begins", state.round));
}
