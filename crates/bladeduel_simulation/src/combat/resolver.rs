//! Combat resolver - обмен атакующий → защитник и встречный размен
//!
//! Порядок проверок: hit window → хитбокс/тело → неуязвимость.
//! Флаг `attack_hit` выставляется только если урон реально применён:
//! удар, пришедшийся в неуязвимость, может попасть позже в том же окне.

use crate::components::{AttackType, Fighter, FighterSlot, HEAVY_DMG, SPECIAL_DMG};
use crate::physics::check_attack_collision;

/// Hit-freeze для сильных ударов (heavy/special)
pub const HEAVY_HIT_FREEZE: u32 = 12;
pub const LIGHT_HIT_FREEZE: u32 = 8;

pub const SCORE_LIGHT: u32 = 10;
pub const SCORE_HEAVY: u32 = 15;
pub const SCORE_SPECIAL: u32 = 25;

/// Результат успешного обмена.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitReport {
    pub attacker: FighterSlot,
    pub defender: FighterSlot,
    pub attack_type: AttackType,
    /// Номинальный урон (до блока); по нему считаются freeze и очки
    pub damage: u32,
    pub blocked: bool,
    pub defender_health: u32,
    pub lethal: bool,
}

/// Замах, готовый попасть в этом тике (снимок до применения урона).
#[derive(Debug, Clone, Copy)]
struct Swing {
    attack_type: AttackType,
    damage: u32,
    origin_x: f32,
}

impl Swing {
    fn ready(attacker: &Fighter, defender: &Fighter) -> Option<Self> {
        if !attacker.is_in_hit_window() || !check_attack_collision(attacker, defender) {
            return None;
        }
        Some(Self {
            attack_type: attacker.attack_type,
            damage: attacker.current_damage(),
            origin_x: attacker.body.x,
        })
    }

    fn land(self, attacker: &mut Fighter, defender: &mut Fighter) -> Option<HitReport> {
        let blocked = defender.is_blocking;
        if !defender.take_damage(self.damage, self.origin_x) {
            return None;
        }
        // Замах мог быть сорван встречным ударом этого же тика
        if attacker.is_attacking {
            attacker.attack_hit = true;
        }

        Some(HitReport {
            attacker: attacker.slot,
            defender: defender.slot,
            attack_type: self.attack_type,
            damage: self.damage,
            blocked,
            defender_health: defender.health,
            lethal: defender.defeated,
        })
    }
}

/// Попытка удара `attacker` по `defender`. None = обмен не состоялся.
pub fn resolve_exchange(attacker: &mut Fighter, defender: &mut Fighter) -> Option<HitReport> {
    Swing::ready(attacker, defender)?.land(attacker, defender)
}

/// Обмен в обе стороны за один тик: `[first → second, second → first]`.
///
/// Оба замаха оцениваются до применения урона, поэтому встречный размен
/// (в том числе двойной KO) засчитывается обоим. Сорванный замах
/// в следующих тиках уже не попадает.
pub fn resolve_trade(first: &mut Fighter, second: &mut Fighter) -> [Option<HitReport>; 2] {
    let forward = Swing::ready(first, second);
    let backward = Swing::ready(second, first);
    [
        forward.and_then(|swing| swing.land(first, second)),
        backward.and_then(|swing| swing.land(second, first)),
    ]
}

/// Длительность hit-freeze по номинальному урону.
pub fn hit_freeze_for(damage: u32) -> u32 {
    if damage >= HEAVY_DMG {
        HEAVY_HIT_FREEZE
    } else {
        LIGHT_HIT_FREEZE
    }
}

/// Очки за попадание (1P, только удары игрока).
pub fn score_for(damage: u32) -> u32 {
    if damage >= SPECIAL_DMG {
        SCORE_SPECIAL
    } else if damage >= HEAVY_DMG {
        SCORE_HEAVY
    } else {
        SCORE_LIGHT
    }
}
