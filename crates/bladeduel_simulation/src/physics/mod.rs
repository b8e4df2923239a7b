//! Physics simulation module
//!
//! Kinematic 2D-физика бойцов: гравитация, трение, интеграция, границы сцены,
//! хитбокс катаны. Никакого physics-движка: два AABB и линия земли.

pub mod engine;

use bevy::prelude::*;

use crate::components::Fighter;
use crate::config::DuelConfig;
use crate::events::FighterLanded;
use crate::{duel_running, DuelSet};

pub use engine::{
    apply_friction, apply_gravity, attack_hitbox, check_attack_collision, keep_in_bounds,
    update_position, Aabb,
};

/// Physics plugin
pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<FighterLanded>();

        app.add_systems(
            FixedUpdate,
            step_fighter_bodies
                .in_set(DuelSet::Physics)
                .run_if(duel_running),
        );
    }
}

/// Один физический шаг: gravity → friction → position → bounds
pub fn step_fighter_bodies(
    mut fighters: Query<&mut Fighter>,
    config: Res<DuelConfig>,
    mut landed_events: EventWriter<FighterLanded>,
) {
    for mut fighter in fighters.iter_mut() {
        if apply_gravity(&mut fighter.body, config.ground_y) {
            fighter.on_land();
            landed_events.write(FighterLanded { slot: fighter.slot });
        }
        apply_friction(&mut fighter.body);
        update_position(&mut fighter.body);
        keep_in_bounds(&mut fighter.body, config.stage_width);
    }
}
