//! Конфигурация дуэли (stage, clock, round rules, AI tuning)
//!
//! Значения по умолчанию совпадают с оригинальной игрой: сцена 1200×600,
//! земля на 60px выше нижнего края, раунд 99 секунд, 60 тиков в секунду.
//! Свойства ударов (урон, окна, cooldown) - константы в `components::fighter`,
//! они не настраиваются.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::fighter::CHAR_HEIGHT;
use crate::components::fighter::CHAR_WIDTH;

/// Ошибки валидации `DuelConfig`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("tick rate must be positive")]
    ZeroTickRate,
    #[error("round length must be at least one second")]
    ZeroRoundLength,
    #[error("stage width {width} cannot hold two fighters of width {fighter_width}")]
    StageTooNarrow { width: f32, fighter_width: f32 },
    #[error("ground line {ground_y} leaves no room for a fighter of height {fighter_height}")]
    GroundTooHigh { ground_y: f32, fighter_height: f32 },
    #[error("spawn x {x} lies outside the stage")]
    SpawnOutsideStage { x: f32 },
    #[error("frame clamp must be positive")]
    ZeroFrameClamp,
    #[error("wins needed to take the match must be positive")]
    ZeroWinsToTakeMatch,
    #[error("AI decision interval {interval} is below the floor {floor}")]
    DecisionIntervalBelowFloor { interval: u32, floor: u32 },
    #[error("AI aggression {0} outside [0, 1]")]
    AggressionOutOfRange(f32),
}

/// Стартовые параметры AI (эскалация сложности - в `ai::brain`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
pub struct AiTuning {
    pub aggression: f32,
    pub decision_interval: u32,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            aggression: 0.7,
            decision_interval: 30,
        }
    }
}

/// Глобальная конфигурация дуэли.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[reflect(Resource)]
pub struct DuelConfig {
    /// Ширина сцены (px)
    pub stage_width: f32,
    /// Линия земли (px, ось Y вниз)
    pub ground_y: f32,
    /// Fixed timestep частота (тиков в секунду)
    pub tick_rate: u32,
    /// Максимальный wall-clock шаг за кадр (ms), ограничивает catch-up
    pub max_frame_delta_ms: u64,
    /// Длина раунда (секунды)
    pub round_seconds: u32,
    /// Пауза между раундами (тики)
    pub round_end_delay: u32,
    /// Сколько тиков поверженный боец лежит до конца раунда
    pub defeat_end_delay: u32,
    /// Побед для выигрыша матча (2P, best-of-3 → 2)
    pub wins_to_take_match: u32,
    /// Spawn X первого бойца
    pub p1_spawn_x: f32,
    /// Отступ spawn второго бойца от правого края
    pub p2_spawn_inset: f32,
    /// Seed для DeterministicRng
    pub seed: u64,
    pub ai: AiTuning,
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            stage_width: 1200.0,
            ground_y: 540.0,
            tick_rate: 60,
            max_frame_delta_ms: 50,
            round_seconds: 99,
            round_end_delay: 120,
            defeat_end_delay: 80,
            wins_to_take_match: 2,
            p1_spawn_x: 200.0,
            p2_spawn_inset: 250.0,
            seed: 42,
            ai: AiTuning::default(),
        }
    }
}

impl DuelConfig {
    pub fn p2_spawn_x(&self) -> f32 {
        self.stage_width - self.p2_spawn_inset
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        if self.round_seconds == 0 {
            return Err(ConfigError::ZeroRoundLength);
        }
        if self.stage_width < CHAR_WIDTH * 2.0 {
            return Err(ConfigError::StageTooNarrow {
                width: self.stage_width,
                fighter_width: CHAR_WIDTH,
            });
        }
        if self.ground_y < CHAR_HEIGHT {
            return Err(ConfigError::GroundTooHigh {
                ground_y: self.ground_y,
                fighter_height: CHAR_HEIGHT,
            });
        }
        for x in [self.p1_spawn_x, self.p2_spawn_x()] {
            if x < 0.0 || x + CHAR_WIDTH > self.stage_width {
                return Err(ConfigError::SpawnOutsideStage { x });
            }
        }
        if self.max_frame_delta_ms == 0 {
            return Err(ConfigError::ZeroFrameClamp);
        }
        if self.wins_to_take_match == 0 {
            return Err(ConfigError::ZeroWinsToTakeMatch);
        }
        if self.ai.decision_interval < crate::ai::brain::MIN_DECISION_INTERVAL {
            return Err(ConfigError::DecisionIntervalBelowFloor {
                interval: self.ai.decision_interval,
                floor: crate::ai::brain::MIN_DECISION_INTERVAL,
            });
        }
        if !(0.0..=1.0).contains(&self.ai.aggression) {
            return Err(ConfigError::AggressionOutOfRange(self.ai.aggression));
        }
        Ok(())
    }
}
