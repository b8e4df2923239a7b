//! Kinematic физика бойца (чистые функции)
//!
//! Ось Y направлена вниз, земля - горизонтальная линия `ground_y`.
//! Интеграция фиксированная: один вызов = один тик, без dt.

use serde::{Deserialize, Serialize};

use crate::components::{Body, Fighter};

pub const GRAVITY: f32 = 1.2;
pub const MAX_FALL_SPEED: f32 = 18.0;
pub const GROUND_FRICTION: f32 = 0.82;
pub const AIR_FRICTION: f32 = 0.95;
/// |v| ниже порога обнуляется
pub const MIN_VELOCITY: f32 = 0.1;

pub const KATANA_RANGE: f32 = 65.0;
pub const HITBOX_HEIGHT: f32 = 55.0;
/// Хитбокс начинается внутри тела на этот отступ
pub const HITBOX_INSET: f32 = 10.0;
pub const HITBOX_TOP_OFFSET: f32 = 10.0;

/// Axis-aligned прямоугольник (x, y = левый верхний угол).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Aabb {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Строгое пересечение: касание краями не считается.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}

impl From<&Body> for Aabb {
    fn from(body: &Body) -> Self {
        Aabb::new(body.x, body.y, body.width, body.height)
    }
}

/// Гравитация + посадка. Возвращает true в тике приземления.
///
/// Тик отрыва (на земле, но vy < 0) считается полётом: иначе
/// snap к земле съел бы импульс прыжка до интеграции позиции.
pub fn apply_gravity(body: &mut Body, ground_y: f32) -> bool {
    let above_ground = body.bottom() < ground_y;
    let taking_off = body.airborne && body.vy < 0.0;

    if above_ground || taking_off {
        body.vy = (body.vy + GRAVITY).min(MAX_FALL_SPEED);
        return false;
    }

    let landed = body.airborne && body.vy >= 0.0;
    body.y = ground_y - body.height;
    body.vy = 0.0;
    body.airborne = false;
    landed
}

pub fn apply_friction(body: &mut Body) {
    let friction = if body.airborne { AIR_FRICTION } else { GROUND_FRICTION };
    body.vx *= friction;
    if body.vx.abs() < MIN_VELOCITY {
        body.vx = 0.0;
    }
}

pub fn update_position(body: &mut Body) {
    body.x += body.vx;
    body.y += body.vy;
}

/// Клэмп к горизонтальным границам сцены; скорость в стену гасится.
pub fn keep_in_bounds(body: &mut Body, stage_width: f32) {
    if body.x < 0.0 {
        body.x = 0.0;
        body.vx = 0.0;
    }
    if body.x + body.width > stage_width {
        body.x = stage_width - body.width;
        body.vx = 0.0;
    }
}

/// Хитбокс катаны: полоса KATANA_RANGE перед бойцом.
pub fn attack_hitbox(attacker: &Fighter) -> Aabb {
    let body = &attacker.body;
    let x = if attacker.facing_right {
        body.x + body.width - HITBOX_INSET
    } else {
        body.x - KATANA_RANGE + HITBOX_INSET
    };
    Aabb::new(x, body.y + HITBOX_TOP_OFFSET, KATANA_RANGE, HITBOX_HEIGHT)
}

/// Катана попадает только в активном замахе, который ещё не попал.
pub fn check_attack_collision(attacker: &Fighter, defender: &Fighter) -> bool {
    if !attacker.is_attacking || attacker.attack_hit {
        return false;
    }
    attack_hitbox(attacker).overlaps(&Aabb::from(&defender.body))
}
