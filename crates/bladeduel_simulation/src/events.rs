//! Gameplay events для внешних слоёв (audio, UI, renderer)
//!
//! Симуляция только пишет эти события; потребители читают через EventReader.
//! Порядок записи внутри тика детерминирован (цепочка DuelSet).

use bevy::prelude::*;

use crate::components::{AttackType, FighterSlot};
use crate::match_flow::GameMode;

// ============================================================================
// Audio cues
// ============================================================================

/// Боец оторвался от земли.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct FighterJumped {
    pub slot: FighterSlot,
}

/// Боец начал замах (атака принята).
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct AttackSwing {
    pub slot: FighterSlot,
    pub attack_type: AttackType,
}

/// Удар достиг цели и был применён.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct HitLanded {
    pub attacker: FighterSlot,
    pub defender: FighterSlot,
    pub attack_type: AttackType,
    /// Номинальный урон атаки (до блока)
    pub damage: u32,
    pub blocked: bool,
    /// Удар оказался смертельным
    pub lethal: bool,
}

/// Приземление после прыжка/падения.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct FighterLanded {
    pub slot: FighterSlot,
}

// ============================================================================
// UI feed
// ============================================================================

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct HealthChanged {
    pub slot: FighterSlot,
    pub health: u32,
}

/// Секунды до конца раунда.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct TimerChanged {
    pub seconds: u32,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ScoreChanged {
    pub score: u32,
}

/// Новый раунд начался.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct RoundChanged {
    pub round: u32,
}

/// Раунд закончился (None = ничья).
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct RoundEnded {
    pub round: u32,
    pub winner: Option<FighterSlot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// 1P: игрок проиграл раунд (поражение или ничья)
    Defeated { score: u32 },
    /// 2P: один из игроков набрал нужное число побед
    Victory { winner: FighterSlot },
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct MatchEnded {
    pub outcome: MatchOutcome,
}

// ============================================================================
// Host commands
// ============================================================================

/// Команды хоста (меню, кнопка рестарта).
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchCommand {
    Start(GameMode),
    Restart,
    ReturnToMenu,
}
