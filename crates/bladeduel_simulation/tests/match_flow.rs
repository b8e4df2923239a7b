//! Integration тесты раундов и матча
//!
//! Проверяем переходы menu → playing ⇄ roundEnd → gameover через
//! MatchCommand, истечение таймера и паузу между раундами.

use bevy::prelude::*;
use bladeduel_simulation::{
    create_headless_app, run_ticks, send_match_command, AiBrain, DuelConfig, DuelSet, Fighter,
    FighterIntents, FighterSlot, GameMode, IntentError, MatchCommand, MatchEnded, MatchOutcome,
    MatchPhase, MatchState, PendingIntents, PresentationFrame, RoundChanged, RoundEnded,
    TimerChanged, MAX_HEALTH,
};

#[derive(Resource, Default)]
struct Feed {
    rounds_ended: Vec<RoundEnded>,
    rounds_started: Vec<RoundChanged>,
    matches: Vec<MatchEnded>,
    timers: Vec<TimerChanged>,
}

fn collect_feed(
    mut feed: ResMut<Feed>,
    mut ended: EventReader<RoundEnded>,
    mut started: EventReader<RoundChanged>,
    mut matches: EventReader<MatchEnded>,
    mut timers: EventReader<TimerChanged>,
) {
    feed.rounds_ended.extend(ended.read().copied());
    feed.rounds_started.extend(started.read().copied());
    feed.matches.extend(matches.read().copied());
    feed.timers.extend(timers.read().copied());
}

fn start_duel(mode: GameMode) -> App {
    let mut app = create_headless_app(21);
    app.init_resource::<Feed>();
    app.add_systems(FixedUpdate, collect_feed.after(DuelSet::Present));
    send_match_command(&mut app, MatchCommand::Start(mode));
    run_ticks(&mut app, 1);
    app
}

fn set_health(app: &mut App, slot: FighterSlot, health: u32) {
    let world = app.world_mut();
    let mut query = world.query::<&mut Fighter>();
    for mut fighter in query.iter_mut(world) {
        if fighter.slot == slot {
            fighter.health = health;
        }
    }
}

fn brain(app: &mut App) -> AiBrain {
    let world = app.world_mut();
    let mut query = world.query::<&AiBrain>();
    query.iter(world).next().cloned().expect("AI brain present")
}

fn phase(app: &App) -> MatchPhase {
    app.world().resource::<MatchState>().phase
}

/// Довести раунд до истечения таймера (последняя секунда).
fn expire_round(app: &mut App) {
    {
        let mut state = app.world_mut().resource_mut::<MatchState>();
        state.timer = 1;
        state.second_ticks = 0;
    }
    let tick_rate = app.world().resource::<DuelConfig>().tick_rate as u64;
    run_ticks(app, tick_rate);
    assert_ne!(phase(app), MatchPhase::Playing, "round should be over");
}

fn finish_intermission(app: &mut App) {
    let delay = app.world().resource::<DuelConfig>().round_end_delay as u64;
    run_ticks(app, delay - 1);
    assert_eq!(phase(app), MatchPhase::RoundEnd);
    run_ticks(app, 1);
    assert_eq!(phase(app), MatchPhase::Playing);
}

#[test]
fn test_start_publishes_fresh_match() {
    let app = start_duel(GameMode::TwoPlayer);
    let frame = app.world().resource::<PresentationFrame>();
    assert_eq!(frame.fighters.len(), 2);
    assert_eq!(frame.duel.round, 1);
    assert_eq!(frame.duel.timer, 99);
    assert!(frame.fighters.iter().all(|f| f.health == MAX_HEALTH));
    assert_eq!(frame.fighters[0].slot, FighterSlot::P1);
    assert!(frame.fighters[0].facing_right);
    assert!(!frame.fighters[1].facing_right);
}

#[test]
fn test_timer_expiry_draw_then_next_round() {
    let mut app = start_duel(GameMode::TwoPlayer);
    expire_round(&mut app);

    {
        let feed = app.world().resource::<Feed>();
        assert_eq!(feed.rounds_ended.len(), 1);
        assert_eq!(feed.rounds_ended[0].winner, None);
        assert_eq!(feed.timers.last(), Some(&TimerChanged { seconds: 0 }));
    }
    let state = app.world().resource::<MatchState>();
    assert_eq!(state.phase, MatchPhase::RoundEnd);
    assert_eq!(state.wins, [0, 0]);

    finish_intermission(&mut app);
    let state = app.world().resource::<MatchState>();
    assert_eq!(state.round, 2);
    assert_eq!(state.timer, 99);
    assert_eq!(
        app.world().resource::<Feed>().rounds_started.last(),
        Some(&RoundChanged { round: 2 })
    );
}

#[test]
fn test_two_player_first_to_two_wins() {
    let mut app = start_duel(GameMode::TwoPlayer);

    set_health(&mut app, FighterSlot::P2, 50);
    expire_round(&mut app);
    assert_eq!(app.world().resource::<MatchState>().wins, [1, 0]);
    finish_intermission(&mut app);

    // Здоровье восстановлено после reset
    let frame = app.world().resource::<PresentationFrame>().clone();
    assert!(frame.fighters.iter().all(|f| f.health == MAX_HEALTH));

    set_health(&mut app, FighterSlot::P2, 10);
    expire_round(&mut app);

    assert_eq!(phase(&app), MatchPhase::GameOver);
    let feed = app.world().resource::<Feed>();
    assert_eq!(
        feed.matches,
        vec![MatchEnded {
            outcome: MatchOutcome::Victory {
                winner: FighterSlot::P1
            }
        }]
    );
}

#[test]
fn test_one_player_win_escalates_ai() {
    let mut app = start_duel(GameMode::OnePlayer);
    let before = brain(&mut app);

    set_health(&mut app, FighterSlot::P2, 40);
    expire_round(&mut app);

    let state = app.world().resource::<MatchState>();
    assert_eq!(state.phase, MatchPhase::RoundEnd);
    assert!(state.score >= 100);

    let escalated = brain(&mut app);
    assert!(escalated.aggression > before.aggression);
    assert_eq!(escalated.decision_interval, before.decision_interval - 3);

    // Сложность переживает reset раунда
    finish_intermission(&mut app);
    let after_reset = brain(&mut app);
    assert_eq!(after_reset.aggression, escalated.aggression);
    assert_eq!(after_reset.decision_interval, escalated.decision_interval);
}

#[test]
fn test_one_player_loss_is_game_over_then_rematch() {
    let mut app = start_duel(GameMode::OnePlayer);
    set_health(&mut app, FighterSlot::P1, 30);
    expire_round(&mut app);

    assert_eq!(phase(&app), MatchPhase::GameOver);
    assert!(matches!(
        app.world().resource::<Feed>().matches.as_slice(),
        [MatchEnded {
            outcome: MatchOutcome::Defeated { .. }
        }]
    ));

    // Game over: ничего не тикает
    let frozen_frame = app.world().resource::<PresentationFrame>().fighters.clone();
    run_ticks(&mut app, 10);
    assert_eq!(app.world().resource::<PresentationFrame>().fighters, frozen_frame);

    send_match_command(&mut app, MatchCommand::Restart);
    run_ticks(&mut app, 1);

    let state = app.world().resource::<MatchState>();
    assert_eq!(state.phase, MatchPhase::Playing);
    assert_eq!(state.mode, Some(GameMode::OnePlayer));
    assert_eq!(state.round, 1);
    assert_eq!(state.score, 0);
    assert_eq!(brain(&mut app), AiBrain {
        decision_timer: 1,
        ..AiBrain::default()
    });
}

#[test]
fn test_return_to_menu_clears_fighters() {
    let mut app = start_duel(GameMode::TwoPlayer);
    set_health(&mut app, FighterSlot::P2, 50);
    expire_round(&mut app);
    assert_eq!(app.world().resource::<MatchState>().wins, [1, 0]);

    send_match_command(&mut app, MatchCommand::ReturnToMenu);
    run_ticks(&mut app, 2);

    assert_eq!(phase(&app), MatchPhase::Menu);
    let frame = app.world().resource::<PresentationFrame>();
    assert!(frame.fighters.is_empty());
    // Меню не показывает цифры прошлого матча
    assert_eq!(frame.duel.wins, [0, 0]);
    assert_eq!(frame.duel.round, 0);
    assert_eq!(frame.duel.timer, 0);
    assert_eq!(frame.duel.score, 0);
    assert_eq!(frame.duel.mode, None);
    assert_eq!(app.world().resource::<PendingIntents>().ai_slot(), None);
}

#[test]
fn test_ai_slot_refuses_human_intents() {
    let mut app = start_duel(GameMode::OnePlayer);
    let mut pending = app.world_mut().resource_mut::<PendingIntents>();
    assert_eq!(pending.ai_slot(), Some(FighterSlot::P2));
    assert_eq!(
        pending.submit(FighterSlot::P2, FighterIntents::default()),
        Err(IntentError::AiControlledSlot(FighterSlot::P2))
    );
    assert!(pending.submit(FighterSlot::P1, FighterIntents::default()).is_ok());
}
