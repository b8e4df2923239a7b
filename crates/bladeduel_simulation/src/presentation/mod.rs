//! Presentation snapshot (core → renderer/UI)
//!
//! Публикуется каждый тик, включая замороженные: рендер продолжает рисовать
//! последний кадр во время hit-freeze. Только чтение состояния.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::{Action, AttackPhase, AttackType, DustMote, Fighter, FighterSlot};
use crate::match_flow::{GameMode, MatchPhase, MatchState};
use crate::{DuelSet, SimulationClock};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FighterSnapshot {
    pub slot: FighterSlot,
    pub x: f32,
    pub y: f32,
    pub facing_right: bool,
    pub action: Action,
    pub health: u32,
    pub attack_type: AttackType,
    pub attack_timer: u32,
    pub attack_phase: Option<AttackPhase>,
    pub blocking: bool,
    pub invulnerable: bool,
    /// Для мигания спрайта во время неуязвимости
    pub invuln_timer: u32,
    pub defeat_timer: u32,
    pub dust: Vec<DustMote>,
}

impl From<&Fighter> for FighterSnapshot {
    fn from(fighter: &Fighter) -> Self {
        Self {
            slot: fighter.slot,
            x: fighter.body.x,
            y: fighter.body.y,
            facing_right: fighter.facing_right,
            action: fighter.action,
            health: fighter.health,
            attack_type: fighter.attack_type,
            attack_timer: fighter.attack_timer,
            attack_phase: fighter.attack_phase(),
            blocking: fighter.is_blocking,
            invulnerable: fighter.invulnerable,
            invuln_timer: fighter.invuln_timer,
            defeat_timer: fighter.defeat_timer,
            dust: fighter.dust.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub mode: Option<GameMode>,
    pub phase: MatchPhase,
    pub timer: u32,
    pub round: u32,
    /// 2P счёт побед
    pub wins: [u32; 2],
    /// 1P очки
    pub score: u32,
    pub frozen: bool,
}

impl From<&MatchState> for MatchSnapshot {
    fn from(state: &MatchState) -> Self {
        Self {
            mode: state.mode,
            phase: state.phase,
            timer: state.timer,
            round: state.round,
            wins: state.wins,
            score: state.score,
            frozen: state.frozen,
        }
    }
}

/// Последний опубликованный кадр.
#[derive(Resource, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PresentationFrame {
    pub tick: u64,
    /// Отсортированы по слоту
    pub fighters: Vec<FighterSnapshot>,
    pub duel: MatchSnapshot,
}

impl PresentationFrame {
    pub fn fighter(&self, slot: FighterSlot) -> Option<&FighterSnapshot> {
        self.fighters.iter().find(|snapshot| snapshot.slot == slot)
    }
}

pub struct PresentationPlugin;

impl Plugin for PresentationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PresentationFrame>();
        app.add_systems(FixedUpdate, publish_frame.in_set(DuelSet::Present));
    }
}

/// Система: собрать кадр (без run_if - работает и в freeze, и в меню)
pub fn publish_frame(
    fighters: Query<&Fighter>,
    state: Res<MatchState>,
    clock: Res<SimulationClock>,
    mut frame: ResMut<PresentationFrame>,
) {
    let mut snapshots: Vec<FighterSnapshot> = fighters.iter().map(FighterSnapshot::from).collect();
    snapshots.sort_by_key(|snapshot| snapshot.slot);

    *frame = PresentationFrame {
        tick: clock.tick,
        fighters: snapshots,
        duel: MatchSnapshot::from(&*state),
    };
}
