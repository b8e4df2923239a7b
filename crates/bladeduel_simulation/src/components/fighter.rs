//! Fighter - единая запись бойца: кинематика, здоровье, боевые таймеры
//!
//! Оба варианта (человек и AI) используют одну и ту же логику; различие только
//! в `ControlKind` и в наличии компонента `AiBrain` у AI-бойца.
//!
//! Все таймеры - целочисленные счётчики кадров:
//! - `attack_timer`: 0 → ATTACK_DURATION (count-up, только пока атакуем)
//! - `attack_cooldown`: ATTACK_COOLDOWN → 0
//! - `invuln_timer`: INVULN_FRAMES → 0
//! - `hit_stun`: HIT_STUN_FRAMES → 0
//! - `defeat_timer`: 0 → ∞ (count-up после KO, до reset)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::input::IntentError;

// ============================================================================
// Constants
// ============================================================================

pub const CHAR_WIDTH: f32 = 50.0;
pub const CHAR_HEIGHT: f32 = 120.0;
pub const MAX_HEALTH: u32 = 100;

// Movement
pub const MOVE_ACCEL: f32 = 1.2;
pub const MAX_SPEED: f32 = 6.0;
pub const JUMP_POWER: f32 = 18.0;
pub const LUNGE_SPEED: f32 = 4.0;
/// |vx| выше порога → анимация ходьбы
pub const WALK_THRESHOLD: f32 = 0.5;

// Damage tiers (light < heavy < special)
pub const LIGHT_DMG: u32 = 8;
pub const HEAVY_DMG: u32 = 15;
pub const SPECIAL_DMG: u32 = 22;

// Attack timing (ticks)
pub const ATTACK_COOLDOWN: u32 = 28;
pub const ATTACK_DURATION: u32 = 18;
pub const HIT_ACTIVE_START: u32 = 5;
pub const HIT_ACTIVE_END: u32 = 12;

// Hit reaction
pub const KNOCKBACK_FORCE: f32 = 10.0;
pub const KNOCKBACK_VERT: f32 = -5.0;
pub const DEATH_KNOCKBACK_FORCE: f32 = 8.0;
pub const DEATH_KNOCKBACK_VERT: f32 = -10.0;
pub const INVULN_FRAMES: u32 = 25;
pub const HIT_STUN_FRAMES: u32 = 12;
pub const BLOCK_REDUCTION: f32 = 0.25;

// Landing dust (presentation only)
pub const DUST_PER_LANDING: usize = 8;
pub const DUST_GRAVITY: f32 = 0.15;
pub const DUST_FADE: f32 = 0.04;

// ============================================================================
// Identity
// ============================================================================

/// Слот бойца в дуэли. P1 всегда человек; P2 - человек (2P) или AI (1P).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Reflect)]
pub enum FighterSlot {
    P1,
    P2,
}

impl FighterSlot {
    pub const ALL: [FighterSlot; 2] = [FighterSlot::P1, FighterSlot::P2];

    pub fn index(self) -> usize {
        match self {
            FighterSlot::P1 => 0,
            FighterSlot::P2 => 1,
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            FighterSlot::P1 => FighterSlot::P2,
            FighterSlot::P2 => FighterSlot::P1,
        }
    }
}

/// Кто управляет бойцом.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Reflect)]
pub enum ControlKind {
    Human,
    Ai,
}

// ============================================================================
// Attack / action enums
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Reflect)]
pub enum AttackType {
    #[default]
    Light,
    Heavy,
    Special,
}

impl AttackType {
    pub fn damage(self) -> u32 {
        match self {
            AttackType::Light => LIGHT_DMG,
            AttackType::Heavy => HEAVY_DMG,
            AttackType::Special => SPECIAL_DMG,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AttackType::Light => "light",
            AttackType::Heavy => "heavy",
            AttackType::Special => "special",
        }
    }

    /// Неизвестное имя → самый лёгкий удар (не ошибка).
    pub fn parse_or_light(name: &str) -> Self {
        name.parse().unwrap_or(AttackType::Light)
    }
}

impl FromStr for AttackType {
    type Err = IntentError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(AttackType::Light),
            "heavy" => Ok(AttackType::Heavy),
            "special" => Ok(AttackType::Special),
            _ => Err(IntentError::UnknownAttackType(name.to_string())),
        }
    }
}

/// Производная метка действия (для анимации).
///
/// Приоритет: Defeat > Hurt > Attack > Jump > Walk > Idle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Reflect)]
pub enum Action {
    #[default]
    Idle,
    Walk,
    Jump,
    Attack,
    Hurt,
    Defeat,
}

/// Фаза атаки, выводится из `attack_timer`.
///
/// - **Windup**: timer < HIT_ACTIVE_START
/// - **Active**: HIT_ACTIVE_START ≤ timer ≤ HIT_ACTIVE_END (хитбокс включён)
/// - **Recovery**: timer > HIT_ACTIVE_END
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Reflect)]
pub enum AttackPhase {
    Windup,
    Active,
    Recovery,
}

// ============================================================================
// Kinematics
// ============================================================================

/// Кинематическое состояние. Меняется только physics-функциями и самим бойцом.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Reflect)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub width: f32,
    pub height: f32,
    /// В воздухе (прыжок/падение)
    pub airborne: bool,
}

impl Body {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            width: CHAR_WIDTH,
            height: CHAR_HEIGHT,
            airborne: false,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }
}

/// Пылинка при приземлении. Только для рендера, на бой не влияет.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Reflect)]
pub struct DustMote {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
    pub life: f32,
}

// ============================================================================
// Fighter Component
// ============================================================================

#[derive(Component, Clone, Debug, Reflect)]
#[reflect(Component)]
pub struct Fighter {
    pub slot: FighterSlot,
    pub control: ControlKind,
    pub body: Body,

    /// Инвариант: 0 ≤ health ≤ MAX_HEALTH
    pub health: u32,
    pub facing_right: bool,

    // Attack
    pub is_attacking: bool,
    pub attack_timer: u32,
    pub attack_cooldown: u32,
    /// Удар уже попал (один хит за замах)
    pub attack_hit: bool,
    pub attack_type: AttackType,

    // Defense
    pub is_blocking: bool,

    // Survivability
    pub invulnerable: bool,
    pub invuln_timer: u32,
    pub hit_stun: u32,
    /// Повержен (для анимации падения)
    pub defeated: bool,
    pub is_dead: bool,
    pub defeat_timer: u32,

    pub action: Action,
    pub dust: Vec<DustMote>,
}

impl Fighter {
    pub fn new(slot: FighterSlot, control: ControlKind, x: f32, y: f32, facing_right: bool) -> Self {
        Self {
            slot,
            control,
            body: Body::new(x, y),
            health: MAX_HEALTH,
            facing_right,
            is_attacking: false,
            attack_timer: 0,
            attack_cooldown: 0,
            attack_hit: false,
            attack_type: AttackType::Light,
            is_blocking: false,
            invulnerable: false,
            invuln_timer: 0,
            hit_stun: 0,
            defeated: false,
            is_dead: false,
            defeat_timer: 0,
            action: Action::Idle,
            dust: Vec::new(),
        }
    }

    /// Полный reset между раундами (slot/control сохраняются).
    pub fn reset(&mut self, x: f32, facing_right: bool) {
        *self = Self::new(self.slot, self.control, x, 0.0, facing_right);
    }

    // ------------------------------------------------------------------------
    // Intents
    // ------------------------------------------------------------------------

    fn can_move(&self) -> bool {
        !self.defeated && self.hit_stun == 0 && !self.is_attacking
    }

    pub fn move_left(&mut self) {
        if !self.can_move() {
            return;
        }
        self.body.vx = (self.body.vx - MOVE_ACCEL).max(-MAX_SPEED);
    }

    pub fn move_right(&mut self) {
        if !self.can_move() {
            return;
        }
        self.body.vx = (self.body.vx + MOVE_ACCEL).min(MAX_SPEED);
    }

    /// Возвращает true если прыжок начался.
    pub fn jump(&mut self) -> bool {
        if self.defeated || self.body.airborne || self.hit_stun > 0 {
            return false;
        }
        self.body.vy = -JUMP_POWER;
        self.body.airborne = true;
        true
    }

    pub fn block(&mut self, active: bool) {
        if self.defeated || self.is_attacking {
            return;
        }
        self.is_blocking = active;
    }

    /// Начать атаку. false = отклонено (ничего не изменилось).
    pub fn attack(&mut self, attack_type: AttackType) -> bool {
        if self.defeated || self.is_attacking || self.attack_cooldown > 0 || self.hit_stun > 0 {
            return false;
        }

        self.is_attacking = true;
        self.attack_timer = 0;
        self.attack_hit = false;
        self.attack_type = attack_type;
        self.attack_cooldown = ATTACK_COOLDOWN;
        // Атака и блок взаимоисключающие
        self.is_blocking = false;

        // Lunge вперёд
        self.body.vx += if self.facing_right { LUNGE_SPEED } else { -LUNGE_SPEED };
        true
    }

    // ------------------------------------------------------------------------
    // Per-tick update
    // ------------------------------------------------------------------------

    /// Один дискретный тик: таймеры, пыль, метка действия.
    pub fn update(&mut self) {
        if self.is_attacking {
            self.attack_timer += 1;
            if self.attack_timer >= ATTACK_DURATION {
                self.is_attacking = false;
                self.attack_timer = 0;
                self.attack_hit = false;
            }
        }

        self.attack_cooldown = self.attack_cooldown.saturating_sub(1);

        if self.invuln_timer > 0 {
            self.invuln_timer -= 1;
            self.invulnerable = self.invuln_timer > 0;
        }

        self.hit_stun = self.hit_stun.saturating_sub(1);

        if self.defeated {
            self.defeat_timer += 1;
        }

        for mote in self.dust.iter_mut() {
            mote.x += mote.vx;
            mote.y += mote.vy;
            mote.vy += DUST_GRAVITY;
            mote.life -= DUST_FADE;
        }
        self.dust.retain(|mote| mote.life > 0.0);

        self.action = self.derive_action();
    }

    fn derive_action(&self) -> Action {
        if self.defeated {
            Action::Defeat
        } else if self.hit_stun > 0 {
            Action::Hurt
        } else if self.is_attacking {
            Action::Attack
        } else if self.body.airborne {
            Action::Jump
        } else if self.body.vx.abs() > WALK_THRESHOLD {
            Action::Walk
        } else {
            Action::Idle
        }
    }

    /// Landing callback (physics → fighter): веер пыли у ног.
    pub fn on_land(&mut self) {
        let foot_y = self.body.bottom();
        let cx = self.body.center_x();
        for i in 0..DUST_PER_LANDING {
            let spread = i as f32 / (DUST_PER_LANDING - 1) as f32 - 0.5;
            self.dust.push(DustMote {
                x: cx + spread * 20.0,
                y: foot_y,
                vx: spread * 4.0,
                vy: -0.5 - (i % 3) as f32 * 0.7,
                size: 2.0 + (i % 4) as f32,
                life: 1.0,
            });
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn is_in_hit_window(&self) -> bool {
        !self.defeated
            && self.hit_stun == 0
            && self.is_attacking
            && (HIT_ACTIVE_START..=HIT_ACTIVE_END).contains(&self.attack_timer)
            && !self.attack_hit
    }

    pub fn attack_phase(&self) -> Option<AttackPhase> {
        if !self.is_attacking {
            return None;
        }
        Some(if self.attack_timer < HIT_ACTIVE_START {
            AttackPhase::Windup
        } else if self.attack_timer <= HIT_ACTIVE_END {
            AttackPhase::Active
        } else {
            AttackPhase::Recovery
        })
    }

    pub fn current_damage(&self) -> u32 {
        self.attack_type.damage()
    }

    // ------------------------------------------------------------------------
    // Damage
    // ------------------------------------------------------------------------

    /// Применить урон. false = отклонено (повержен или неуязвим).
    ///
    /// Направление отброса зависит только от позиции атакующего:
    /// атакующий левее → отлетаем вправо, иначе влево.
    pub fn take_damage(&mut self, amount: u32, attacker_x: f32) -> bool {
        if self.defeated || self.invulnerable {
            return false;
        }

        let applied = if self.is_blocking {
            (amount as f32 * BLOCK_REDUCTION).floor() as u32
        } else {
            amount
        };

        self.health = self.health.saturating_sub(applied);
        self.invulnerable = true;
        self.invuln_timer = INVULN_FRAMES;
        self.hit_stun = HIT_STUN_FRAMES;

        // Попадание срывает замах: атака и hit-stun не совместимы
        self.is_attacking = false;
        self.attack_timer = 0;
        self.attack_hit = false;

        let dir = if attacker_x < self.body.x { 1.0 } else { -1.0 };
        self.body.vx = dir * KNOCKBACK_FORCE;
        self.body.vy = KNOCKBACK_VERT;

        if self.health == 0 {
            self.defeated = true;
            self.is_dead = true;
            self.is_blocking = false;
            self.body.vx = dir * DEATH_KNOCKBACK_FORCE;
            self.body.vy = DEATH_KNOCKBACK_VERT;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fighter_at(x: f32) -> Fighter {
        Fighter::new(FighterSlot::P1, ControlKind::Human, x, 420.0, true)
    }

    #[test]
    fn test_blocked_damage_is_floored_quarter() {
        for damage in [LIGHT_DMG, HEAVY_DMG, SPECIAL_DMG, 1, 3, 99] {
            let mut blocked = fighter_at(300.0);
            blocked.block(true);
            assert!(blocked.take_damage(damage, 100.0));
            assert_eq!(blocked.health, MAX_HEALTH - damage / 4, "damage {}", damage);

            let mut open = fighter_at(300.0);
            assert!(open.take_damage(damage, 100.0));
            assert_eq!(open.health, MAX_HEALTH - damage);
        }
    }

    #[test]
    fn test_knockback_follows_attacker_position() {
        let mut f = fighter_at(300.0);
        f.facing_right = false;
        f.take_damage(LIGHT_DMG, 250.0);
        assert!(f.body.vx > 0.0);
        assert_eq!(f.body.vy, KNOCKBACK_VERT);

        // Та же сторона удара независимо от facing
        let mut g = fighter_at(300.0);
        g.facing_right = true;
        g.take_damage(LIGHT_DMG, 350.0);
        assert!(g.body.vx < 0.0);
    }

    #[test]
    fn test_invulnerability_window_is_exact() {
        let mut f = fighter_at(300.0);
        assert!(f.take_damage(LIGHT_DMG, 100.0));
        let health = f.health;

        for tick in 0..INVULN_FRAMES {
            assert!(f.invulnerable, "tick {}", tick);
            assert!(!f.take_damage(HEAVY_DMG, 100.0));
            assert_eq!(f.health, health);
            f.update();
        }

        assert!(!f.invulnerable);
        assert!(f.take_damage(LIGHT_DMG, 100.0));
        assert_eq!(f.health, health - LIGHT_DMG);
    }

    #[test]
    fn test_attack_rejected_during_cooldown() {
        let mut f = fighter_at(300.0);
        assert!(f.attack(AttackType::Heavy));
        for _ in 0..ATTACK_DURATION {
            f.update();
        }
        assert!(!f.is_attacking);
        assert!(f.attack_cooldown > 0);

        let before = f.clone();
        assert!(!f.attack(AttackType::Special));
        assert_eq!(f.is_attacking, before.is_attacking);
        assert_eq!(f.attack_timer, before.attack_timer);
        assert_eq!(f.attack_cooldown, before.attack_cooldown);
        assert_eq!(f.attack_type, AttackType::Heavy);
        assert_eq!(f.body.vx, before.body.vx);
    }

    #[test]
    fn test_attack_lunges_and_drops_block() {
        let mut f = fighter_at(300.0);
        f.block(true);
        assert!(f.attack(AttackType::Light));
        assert!(!f.is_blocking);
        assert_eq!(f.body.vx, LUNGE_SPEED);

        // Блок во время атаки игнорируется
        f.block(true);
        assert!(!f.is_blocking);
    }

    #[test]
    fn test_hit_window_bounds() {
        let mut f = fighter_at(300.0);
        f.attack(AttackType::Light);
        let mut open_ticks = Vec::new();
        for _ in 0..ATTACK_DURATION {
            f.update();
            if f.is_in_hit_window() {
                open_ticks.push(f.attack_timer);
            }
        }
        assert_eq!(open_ticks, (HIT_ACTIVE_START..=HIT_ACTIVE_END).collect::<Vec<_>>());
    }

    #[test]
    fn test_attack_phases() {
        let mut f = fighter_at(300.0);
        assert_eq!(f.attack_phase(), None);
        f.attack(AttackType::Light);
        assert_eq!(f.attack_phase(), Some(AttackPhase::Windup));
        for _ in 0..HIT_ACTIVE_START {
            f.update();
        }
        assert_eq!(f.attack_phase(), Some(AttackPhase::Active));
        for _ in HIT_ACTIVE_START..=HIT_ACTIVE_END {
            f.update();
        }
        assert_eq!(f.attack_phase(), Some(AttackPhase::Recovery));
    }

    #[test]
    fn test_intents_gated_by_hit_stun() {
        let mut f = fighter_at(300.0);
        f.take_damage(LIGHT_DMG, 100.0);
        let vx = f.body.vx;
        f.move_left();
        assert_eq!(f.body.vx, vx);
        assert!(!f.jump());
        assert!(!f.attack(AttackType::Light));

        for _ in 0..HIT_STUN_FRAMES {
            f.update();
        }
        assert_eq!(f.hit_stun, 0);
        assert!(f.attack(AttackType::Light));
    }

    #[test]
    fn test_jump_only_from_ground() {
        let mut f = fighter_at(300.0);
        assert!(f.jump());
        assert_eq!(f.body.vy, -JUMP_POWER);
        assert!(!f.jump());
    }

    #[test]
    fn test_lethal_hit_defeats_and_clamps() {
        let mut f = fighter_at(300.0);
        f.health = 8;
        assert!(f.take_damage(LIGHT_DMG, 400.0));
        assert_eq!(f.health, 0);
        assert!(f.defeated && f.is_dead);
        assert_eq!(f.body.vx, -DEATH_KNOCKBACK_FORCE);
        assert_eq!(f.body.vy, DEATH_KNOCKBACK_VERT);

        // Повержен - терминально до reset
        assert!(!f.take_damage(LIGHT_DMG, 400.0));
        assert!(!f.attack(AttackType::Light));
        f.update();
        assert_eq!(f.defeat_timer, 1);
        assert_eq!(f.action, Action::Defeat);

        f.reset(200.0, true);
        assert_eq!(f.health, MAX_HEALTH);
        assert!(!f.defeated);
        assert_eq!(f.defeat_timer, 0);
    }

    #[test]
    fn test_hit_cancels_windup() {
        let mut f = fighter_at(300.0);
        assert!(f.attack(AttackType::Heavy));
        f.update();
        assert_eq!(f.attack_phase(), Some(AttackPhase::Windup));

        assert!(f.take_damage(LIGHT_DMG, 100.0));
        assert!(!f.is_attacking);
        assert_eq!(f.attack_timer, 0);
        assert_eq!(f.attack_phase(), None);

        // Весь hit-stun окно удара закрыто, замах не возобновляется
        for _ in 0..HIT_STUN_FRAMES {
            assert!(!f.is_in_hit_window());
            f.update();
            assert_ne!(f.action, Action::Attack);
        }
        assert!(!f.is_attacking);
    }

    #[test]
    fn test_hit_window_closed_while_stunned_or_defeated() {
        let mut f = fighter_at(300.0);
        f.attack(AttackType::Light);
        for _ in 0..HIT_ACTIVE_START {
            f.update();
        }
        assert!(f.is_in_hit_window());

        f.hit_stun = 1;
        assert!(!f.is_in_hit_window());
        f.hit_stun = 0;
        f.defeated = true;
        assert!(!f.is_in_hit_window());
    }

    #[test]
    fn test_lethal_hit_drops_block() {
        let mut f = fighter_at(300.0);
        f.health = 2;
        f.block(true);
        assert!(f.take_damage(SPECIAL_DMG, 100.0));
        assert_eq!(f.health, 0);
        assert!(f.defeated);
        assert!(!f.is_blocking);
        assert!(!f.is_attacking);
    }

    #[test]
    fn test_attack_type_names() {
        for attack_type in [AttackType::Light, AttackType::Heavy, AttackType::Special] {
            assert_eq!(attack_type.as_str().parse::<AttackType>(), Ok(attack_type));
        }
    }

    #[test]
    fn test_overkill_never_negative() {
        let mut f = fighter_at(300.0);
        f.health = 3;
        f.take_damage(SPECIAL_DMG, 100.0);
        assert_eq!(f.health, 0);
    }

    #[test]
    fn test_action_priority() {
        let mut f = fighter_at(300.0);
        f.update();
        assert_eq!(f.action, Action::Idle);

        f.body.vx = 3.0;
        f.update();
        assert_eq!(f.action, Action::Walk);

        f.attack(AttackType::Light);
        f.update();
        assert_eq!(f.action, Action::Attack);

        f.take_damage(LIGHT_DMG, 100.0);
        f.update();
        assert_eq!(f.action, Action::Hurt);
    }

    #[test]
    fn test_dust_is_pruned() {
        let mut f = fighter_at(300.0);
        f.on_land();
        assert_eq!(f.dust.len(), DUST_PER_LANDING);
        for _ in 0..30 {
            f.update();
        }
        assert!(f.dust.is_empty());
    }

    #[test]
    fn test_attack_type_parsing() {
        assert_eq!("Heavy".parse::<AttackType>(), Ok(AttackType::Heavy));
        assert!("uppercut".parse::<AttackType>().is_err());
        assert_eq!(AttackType::parse_or_light("uppercut"), AttackType::Light);
        assert_eq!(AttackType::parse_or_light("special"), AttackType::Special);
        assert!(LIGHT_DMG < HEAVY_DMG && HEAVY_DMG < SPECIAL_DMG);
    }
}
