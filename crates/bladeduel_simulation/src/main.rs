//! Headless симуляция BLADEDUEL
//!
//! Скриптованный игрок (P1) против AI (P2) без рендера. Печатает ход матча
//! и итог; полезно для проверки баланса и детерминизма.

use bladeduel_simulation::logger::{log_error, log_info};
use bladeduel_simulation::{
    create_headless_app, run_ticks, send_match_command, AttackType, FighterIntents, FighterSlot,
    GameMode, MatchCommand, MatchPhase, PendingIntents, PresentationFrame,
};

const MAX_TICKS: u64 = 60 * 60 * 10;
const ATTACK_RANGE: f32 = 90.0;

/// Простой игрок: идёт к противнику, рубит по кругу light → heavy → special,
/// закрывается блоком, когда противник замахивается.
fn scripted_player(frame: &PresentationFrame) -> FighterIntents {
    let (Some(me), Some(foe)) = (frame.fighter(FighterSlot::P1), frame.fighter(FighterSlot::P2)) else {
        return FighterIntents::default();
    };

    let gap = foe.x - me.x;
    let mut intents = FighterIntents::default();

    if gap.abs() > ATTACK_RANGE {
        intents.move_right = gap > 0.0;
        intents.move_left = gap < 0.0;
        // Иногда прыжок для разнообразия
        intents.jump = frame.tick % 97 == 0;
    } else if foe.attack_phase.is_some() {
        intents.block = true;
    } else {
        intents.attack = Some(match (frame.tick / 40) % 3 {
            0 => AttackType::Light,
            1 => AttackType::Heavy,
            _ => AttackType::Special,
        });
    }

    intents
}

fn main() {
    let seed = 42;
    println!("Starting BLADEDUEL headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    send_match_command(&mut app, MatchCommand::Start(GameMode::OnePlayer));
    run_ticks(&mut app, 1);

    for tick in 0..MAX_TICKS {
        let frame = app.world().resource::<PresentationFrame>().clone();
        if frame.duel.phase == MatchPhase::GameOver {
            break;
        }

        let intents = scripted_player(&frame);
        if let Err(err) = app
            .world_mut()
            .resource_mut::<PendingIntents>()
            .submit(FighterSlot::P1, intents)
        {
            log_error(&format!("Intent rejected: {}", err));
        }

        run_ticks(&mut app, 1);

        if tick % 300 == 0 {
            let health: Vec<u32> = frame.fighters.iter().map(|f| f.health).collect();
            log_info(&format!(
                "Tick {}: round {} timer {} health {:?} score {}",
                frame.tick, frame.duel.round, frame.duel.timer, health, frame.duel.score
            ));
        }
    }

    let frame = app.world().resource::<PresentationFrame>();
    println!(
        "Simulation complete! phase {:?}, round {}, score {} after {} ticks",
        frame.duel.phase, frame.duel.round, frame.duel.score, frame.tick
    );
}
