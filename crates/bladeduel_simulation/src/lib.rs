//! BLADEDUEL Simulation Core
//!
//! ECS-симуляция дуэли на Bevy 0.16: два бойца, kinematic физика,
//! hit windows, AI decision tree, раунды и матч.
//!
//! Один тик FixedUpdate (60Hz) = один кадр игры. Порядок внутри тика
//! задаётся цепочкой `DuelSet`:
//! Commands → Freeze → Flow → Intents → Physics → Timers → Combat → Referee → Present

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

// Публичные модули
pub mod ai;
pub mod combat;
pub mod components;
pub mod config;
pub mod events;
pub mod input;
pub mod logger;
pub mod match_flow;
pub mod physics;
pub mod presentation;

// Re-export для удобства хоста
pub use ai::{AIPlugin, AiAction, AiBrain};
pub use combat::CombatPlugin;
pub use components::*;
pub use config::{AiTuning, ConfigError, DuelConfig};
pub use events::*;
pub use input::{FighterIntents, InputPlugin, IntentError, PendingIntents};
pub use match_flow::{GameMode, MatchPhase, MatchPlugin, MatchState};
pub use physics::PhysicsPlugin;
pub use presentation::{FighterSnapshot, MatchSnapshot, PresentationFrame, PresentationPlugin};

/// Порядок фаз одного тика.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DuelSet {
    /// Команды хоста (всегда)
    Commands,
    /// Hit-freeze счётчик (всегда)
    Freeze,
    /// Часы раунда / пауза между раундами
    Flow,
    /// Human + AI интенты, facing
    Intents,
    Physics,
    /// Fighter::update
    Timers,
    Combat,
    /// Проверка KO
    Referee,
    /// Snapshot для рендера (всегда)
    Present,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let requested = app
            .world()
            .get_resource::<DuelConfig>()
            .cloned()
            .unwrap_or_default();
        let config = match requested.validate() {
            Ok(()) => requested,
            Err(err) => {
                logger::log_error(&format!("Invalid DuelConfig ({}), falling back to defaults", err));
                DuelConfig::default()
            }
        };

        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(config.seed));
        }

        app
            // Fixed timestep: один тик = один кадр дуэли
            .insert_resource(Time::<Fixed>::from_hz(config.tick_rate as f64))
            .insert_resource(config)
            .init_resource::<SimulationClock>()
            .register_type::<Fighter>()
            .register_type::<AiBrain>()
            .register_type::<MatchState>()
            .register_type::<DuelConfig>()
            .configure_sets(
                FixedUpdate,
                (
                    DuelSet::Commands,
                    DuelSet::Freeze,
                    DuelSet::Flow,
                    DuelSet::Intents,
                    DuelSet::Physics,
                    DuelSet::Timers,
                    DuelSet::Combat,
                    DuelSet::Referee,
                    DuelSet::Present,
                )
                    .chain(),
            )
            .add_systems(Startup, apply_frame_clamp)
            .add_systems(FixedUpdate, advance_simulation_tick.in_set(DuelSet::Freeze))
            // Подсистемы
            .add_plugins((
                MatchPlugin,
                InputPlugin,
                AIPlugin,
                PhysicsPlugin,
                CombatPlugin,
                PresentationPlugin,
            ));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Счётчик fixed тиков с момента запуска (включая замороженные).
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SimulationClock {
    pub tick: u64,
}

/// Run condition: идёт раунд и тик не заморожен
pub fn duel_running(state: Res<MatchState>) -> bool {
    state.is_running()
}

/// Run condition: пауза между раундами и тик не заморожен
pub fn intermission_running(state: Res<MatchState>) -> bool {
    state.phase == MatchPhase::RoundEnd && !state.frozen
}

/// Система: счётчик тиков + hit-freeze
pub fn advance_simulation_tick(mut clock: ResMut<SimulationClock>, mut state: ResMut<MatchState>) {
    clock.tick += 1;
    state.advance_freeze();
}

/// Ограничение catch-up: не больше max_frame_delta_ms за один кадр
fn apply_frame_clamp(config: Res<DuelConfig>, time: Option<ResMut<Time<Virtual>>>) {
    if let Some(mut time) = time {
        time.set_max_delta(Duration::from_millis(config.max_frame_delta_ms));
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Каждый `app.update()` продвигает время ровно на один fixed тик.
pub fn create_headless_app(seed: u64) -> App {
    create_headless_app_with_config(DuelConfig {
        seed,
        ..Default::default()
    })
}

pub fn create_headless_app_with_config(config: DuelConfig) -> App {
    logger::init_logger();

    let step = Duration::from_secs_f64(1.0 / config.tick_rate.max(1) as f64);
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(step))
        .insert_resource(DeterministicRng::new(config.seed))
        .insert_resource(config)
        .add_plugins(SimulationPlugin);

    app
}

/// Прогнать ровно `ticks` fixed тиков (первый `update` может не дать тика).
pub fn run_ticks(app: &mut App, ticks: u64) {
    let current = |app: &App| app.world().get_resource::<SimulationClock>().map(|clock| clock.tick);
    let Some(start) = current(app) else {
        logger::log_error("run_ticks: SimulationPlugin is not installed");
        return;
    };
    let target = start + ticks;

    // Страховка от зависания, если fixed loop не тикает
    let mut budget = ticks * 2 + 4;
    while current(app).unwrap_or(target) < target && budget > 0 {
        app.update();
        budget -= 1;
    }
}

/// Отправить команду матча (обработается в начале следующего тика).
pub fn send_match_command(app: &mut App, command: MatchCommand) {
    app.world_mut().send_event(command);
}

