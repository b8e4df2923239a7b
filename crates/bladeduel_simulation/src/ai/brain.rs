//! AiBrain - decision tree AI-бойца
//!
//! Решение принимается раз в `decision_interval` тиков по одному броску
//! `roll ∈ [0, 1)`; выбранное действие исполняется каждый тик теми же
//! интентами, что и у человека.
//!
//! Дистанции (по левым краям тел):
//! - near (< 80): атака / блок / отход
//! - mid (< 200): сближение / прыжок с атакой / стойка
//! - far: сближение / стойка
//! - угол сцены (60px) и roll < 0.5 → к центру сцены

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::{AttackType, Fighter};
use crate::config::AiTuning;

pub const NEAR_DISTANCE: f32 = 80.0;
pub const MID_DISTANCE: f32 = 200.0;
pub const CORNER_MARGIN: f32 = 60.0;

pub const MIN_DECISION_INTERVAL: u32 = 15;
pub const MAX_AGGRESSION: f32 = 1.0;
pub const AGGRESSION_STEP: f32 = 0.1;
pub const INTERVAL_STEP: u32 = 3;

/// Пороги броска для выбора удара вблизи: special < heavy < остальное light
pub const SPECIAL_ROLL: f32 = 0.1;
pub const HEAVY_ROLL: f32 = 0.2;

/// Текущее действие AI (держится до следующего решения).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Reflect)]
pub enum AiAction {
    #[default]
    Idle,
    Approach,
    Retreat,
    /// Уйти из угла к центру сцены
    Recenter,
    Light,
    Heavy,
    Special,
    Block,
    JumpAttack,
}

/// Что произошло при исполнении действия (для audio events).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActionOutcome {
    pub jumped: bool,
    pub swung: Option<AttackType>,
}

/// AI state (только у AI-бойца). Переживает reset раунда.
#[derive(Component, Clone, Debug, PartialEq, Reflect)]
#[reflect(Component)]
pub struct AiBrain {
    pub aggression: f32,
    pub decision_interval: u32,
    pub decision_timer: u32,
    pub action: AiAction,
}

impl Default for AiBrain {
    fn default() -> Self {
        Self::new(AiTuning::default())
    }
}

impl AiBrain {
    pub fn new(tuning: AiTuning) -> Self {
        Self {
            aggression: tuning.aggression.clamp(0.0, MAX_AGGRESSION),
            decision_interval: tuning.decision_interval.max(MIN_DECISION_INTERVAL),
            decision_timer: 0,
            action: AiAction::Idle,
        }
    }

    /// Продвинуть счётчик. true = пора принимать решение (счётчик сброшен).
    pub fn tick(&mut self) -> bool {
        self.decision_timer += 1;
        if self.decision_timer >= self.decision_interval {
            self.decision_timer = 0;
            return true;
        }
        false
    }

    /// Выбрать действие по броску `roll ∈ [0, 1)`.
    pub fn decide(&mut self, me: &Fighter, opponent: &Fighter, stage_width: f32, roll: f32) {
        let dx = opponent.body.x - me.body.x;
        let dist = dx.abs();

        if me.hit_stun > 0 {
            self.action = AiAction::Idle;
            return;
        }

        let aggression = self.aggression;
        self.action = if dist < NEAR_DISTANCE {
            if roll < aggression * 0.6 {
                if roll < SPECIAL_ROLL {
                    AiAction::Special
                } else if roll < HEAVY_ROLL {
                    AiAction::Heavy
                } else {
                    AiAction::Light
                }
            } else if roll < 0.85 {
                AiAction::Block
            } else {
                AiAction::Retreat
            }
        } else if dist < MID_DISTANCE {
            if roll < aggression * 0.5 {
                AiAction::Approach
            } else if roll < aggression * 0.7 {
                AiAction::JumpAttack
            } else {
                AiAction::Idle
            }
        } else if roll < aggression * 0.8 {
            AiAction::Approach
        } else {
            AiAction::Idle
        };

        let cornered = me.body.x < CORNER_MARGIN || me.body.x > stage_width - CORNER_MARGIN;
        if cornered && roll < 0.5 {
            self.action = AiAction::Recenter;
        }
    }

    /// Исполнить текущее действие как интенты бойца.
    pub fn execute(&self, me: &mut Fighter, stage_width: f32) -> ActionOutcome {
        let mut outcome = ActionOutcome::default();
        match self.action {
            AiAction::Approach => {
                if me.facing_right {
                    me.move_right();
                } else {
                    me.move_left();
                }
            }
            AiAction::Retreat => {
                if me.facing_right {
                    me.move_left();
                } else {
                    me.move_right();
                }
            }
            AiAction::Recenter => {
                if me.body.center_x() < stage_width / 2.0 {
                    me.move_right();
                } else {
                    me.move_left();
                }
            }
            AiAction::Light => outcome.swung = swing(me, AttackType::Light),
            AiAction::Heavy => outcome.swung = swing(me, AttackType::Heavy),
            AiAction::Special => outcome.swung = swing(me, AttackType::Special),
            AiAction::Block => me.block(true),
            AiAction::JumpAttack => {
                outcome.jumped = me.jump();
                outcome.swung = swing(me, AttackType::Heavy);
            }
            AiAction::Idle => me.block(false),
        }
        outcome
    }

    /// Эскалация после раунда, выигранного человеком (1P).
    pub fn increase_difficulty(&mut self) {
        self.aggression = (self.aggression + AGGRESSION_STEP).min(MAX_AGGRESSION);
        self.decision_interval = self
            .decision_interval
            .saturating_sub(INTERVAL_STEP)
            .max(MIN_DECISION_INTERVAL);
    }

    /// Reset между раундами: сложность сохраняется.
    pub fn reset(&mut self) {
        self.decision_timer = 0;
        self.action = AiAction::Idle;
    }
}

fn swing(me: &mut Fighter, attack_type: AttackType) -> Option<AttackType> {
    me.attack(attack_type).then_some(attack_type)
}
