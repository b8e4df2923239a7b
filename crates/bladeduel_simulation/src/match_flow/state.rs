//! MatchState - состояние матча и чистые переходы
//!
//! `menu → playing ⇄ roundEnd → playing | gameover`, `gameover → menu | rematch`.
//! Системы в `match_flow` только применяют результаты этих методов к бойцам
//! и пишут события.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::FighterSlot;
use crate::config::DuelConfig;
use crate::events::MatchOutcome;

/// Бонус за выигранный раунд (1P)
pub const ROUND_WIN_BONUS: u32 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Reflect)]
pub enum GameMode {
    /// Человек (P1) против AI (P2)
    OnePlayer,
    /// Два человека, best-of-3
    TwoPlayer,
}

impl GameMode {
    pub fn ai_slot(self) -> Option<FighterSlot> {
        match self {
            GameMode::OnePlayer => Some(FighterSlot::P2),
            GameMode::TwoPlayer => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Reflect)]
pub enum MatchPhase {
    #[default]
    Menu,
    Playing,
    RoundEnd,
    GameOver,
}

/// Результат одного тика часов раунда.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockTick {
    Running,
    SecondElapsed(u32),
    Expired,
}

/// Итог раунда.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundVerdict {
    pub round: u32,
    /// None = ничья
    pub winner: Option<FighterSlot>,
    /// 1P: человек выиграл → AI усложняется
    pub escalate_ai: bool,
    pub outcome: Option<MatchOutcome>,
}

#[derive(Resource, Clone, Debug, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct MatchState {
    pub mode: Option<GameMode>,
    pub phase: MatchPhase,
    /// Секунды до конца раунда
    pub timer: u32,
    /// Тики внутри текущей секунды
    pub second_ticks: u32,
    pub round: u32,
    /// 2P счёт побед [P1, P2]
    pub wins: [u32; 2],
    /// 1P очки
    pub score: u32,
    pub hit_freeze: u32,
    /// Текущий тик заморожен (выставляется в начале тика)
    pub frozen: bool,
    pub round_end_timer: u32,
}

impl Default for MatchState {
    fn default() -> Self {
        Self {
            mode: None,
            phase: MatchPhase::Menu,
            timer: 0,
            second_ticks: 0,
            round: 0,
            wins: [0, 0],
            score: 0,
            hit_freeze: 0,
            frozen: false,
            round_end_timer: 0,
        }
    }
}

impl MatchState {
    /// Новый матч (start или rematch).
    pub fn begin(&mut self, mode: GameMode, config: &DuelConfig) {
        *self = Self {
            mode: Some(mode),
            phase: MatchPhase::Playing,
            timer: config.round_seconds,
            round: 1,
            ..Self::default()
        };
    }

    /// Меню не хранит итог прошлого матча: счёт, раунд и таймер обнуляются.
    pub fn return_to_menu(&mut self) {
        *self = Self::default();
    }

    pub fn is_running(&self) -> bool {
        self.phase == MatchPhase::Playing && !self.frozen
    }

    // ------------------------------------------------------------------------
    // Hit freeze
    // ------------------------------------------------------------------------

    /// Перекрывающиеся freeze не суммируются: берётся максимум.
    pub fn trigger_hit_freeze(&mut self, frames: u32) {
        self.hit_freeze = self.hit_freeze.max(frames);
    }

    /// Вызывается каждый реальный тик. true = этот тик заморожен.
    pub fn advance_freeze(&mut self) -> bool {
        self.frozen = self.hit_freeze > 0;
        if self.frozen {
            self.hit_freeze -= 1;
        }
        self.frozen
    }

    // ------------------------------------------------------------------------
    // Clock / score
    // ------------------------------------------------------------------------

    pub fn tick_clock(&mut self, tick_rate: u32) -> ClockTick {
        self.second_ticks += 1;
        if self.second_ticks < tick_rate {
            return ClockTick::Running;
        }
        self.second_ticks = 0;
        self.timer = self.timer.saturating_sub(1);
        if self.timer == 0 {
            ClockTick::Expired
        } else {
            ClockTick::SecondElapsed(self.timer)
        }
    }

    pub fn award_hit(&mut self, points: u32) -> u32 {
        self.score += points;
        self.score
    }

    // ------------------------------------------------------------------------
    // Round transitions
    // ------------------------------------------------------------------------

    /// Завершить раунд по здоровью [P1, P2]. None если раунд уже не идёт.
    pub fn conclude_round(&mut self, health: [u32; 2], config: &DuelConfig) -> Option<RoundVerdict> {
        if self.phase != MatchPhase::Playing {
            return None;
        }
        let mode = self.mode?;

        let winner = match health[0].cmp(&health[1]) {
            std::cmp::Ordering::Greater => Some(FighterSlot::P1),
            std::cmp::Ordering::Less => Some(FighterSlot::P2),
            std::cmp::Ordering::Equal => None,
        };

        let round = self.round;
        let mut verdict = RoundVerdict {
            round,
            winner,
            escalate_ai: false,
            outcome: None,
        };

        match mode {
            GameMode::OnePlayer => {
                if winner == Some(FighterSlot::P1) {
                    self.score += ROUND_WIN_BONUS;
                    verdict.escalate_ai = true;
                    self.enter_intermission(config);
                } else {
                    self.phase = MatchPhase::GameOver;
                    verdict.outcome = Some(MatchOutcome::Defeated { score: self.score });
                }
            }
            GameMode::TwoPlayer => {
                if let Some(slot) = winner {
                    self.wins[slot.index()] += 1;
                }
                let champion = FighterSlot::ALL
                    .into_iter()
                    .find(|slot| self.wins[slot.index()] >= config.wins_to_take_match);
                match champion {
                    Some(slot) => {
                        self.phase = MatchPhase::GameOver;
                        verdict.outcome = Some(MatchOutcome::Victory { winner: slot });
                    }
                    None => self.enter_intermission(config),
                }
            }
        }

        Some(verdict)
    }

    fn enter_intermission(&mut self, config: &DuelConfig) {
        self.phase = MatchPhase::RoundEnd;
        self.round_end_timer = config.round_end_delay;
        self.round += 1;
    }

    /// Тик паузы между раундами. true = пора начинать следующий раунд.
    pub fn tick_intermission(&mut self) -> bool {
        self.round_end_timer = self.round_end_timer.saturating_sub(1);
        self.round_end_timer == 0
    }

    pub fn begin_next_round(&mut self, config: &DuelConfig) {
        self.phase = MatchPhase::Playing;
        self.timer = config.round_seconds;
        self.second_ticks = 0;
        self.hit_freeze = 0;
        self.round_end_timer = 0;
    }
}
