//! Per-frame simulation step
//!
//! Advances a match by one variable delta. The order matters: timers, focus,
//! integration, orientation, walls, the pair, bookkeeping, outcome, and
//! finally the speed floor.

use glam::Vec2;

use super::body::Body;
use super::collision::{HitTarget, classify_hit, resolve_pair};
use super::fighter::Side;
use super::state::{MatchPhase, MatchState, Outcome};

/// Input events forwarded by the presentation shell for one frame
#[derive(Debug, Clone, Default)]
pub struct MatchInput {
    pub toggle_pause: bool,
    pub toggle_slow_motion: bool,
    pub toggle_focus: bool,
    /// Pointer/click target to nudge the controlled fighter toward
    pub nudge_toward: Option<Vec2>,
    /// Start a fresh match
    pub restart: bool,
}

/// Apply one frame's worth of input
pub fn apply_input(state: &mut MatchState, input: &MatchInput) {
    if input.restart {
        state.reset();
        return;
    }
    if input.toggle_pause {
        state.toggle_pause();
    }
    if input.toggle_slow_motion {
        state.toggle_slow_motion();
    }
    if input.toggle_focus {
        state.toggle_focus();
    }
    if let Some(target) = input.nudge_toward {
        state.apply_directed_impulse(target);
    }
}

/// Advance the match by `dt` seconds.
///
/// No-op for non-positive or non-finite deltas and whenever the match is
/// paused or finished.
pub fn step(state: &mut MatchState, dt: f32) {
    if !(dt.is_finite() && dt > 0.0) {
        return;
    }
    if state.phase != MatchPhase::Running {
        return;
    }

    advance_timers(state, dt);
    apply_focus(state, dt);

    state.lancer.body.integrate(dt);
    state.shuriken.body.integrate(dt);

    state.lancer.update_orientation(dt);
    state.shuriken.update_orientation(dt);

    bounce_walls(state);
    resolve_fighters(state);

    if state.settings.health_enabled() && check_outcome(state) {
        return;
    }

    let min_speed = state.settings.physics.min_speed;
    state.lancer.body.ensure_minimum_speed(min_speed, &mut state.rng);
    state.shuriken.body.ensure_minimum_speed(min_speed, &mut state.rng);
}

fn advance_timers(state: &mut MatchState, dt: f32) {
    state.simulation_time += dt;
    state.collision_cooldown = (state.collision_cooldown - dt).max(0.0);

    if state.combo_timer > 0.0 {
        state.combo_timer = (state.combo_timer - dt).max(0.0);
        if state.combo_timer == 0.0 {
            state.stats.combo_chain = 0;
        }
    }
}

/// Drain energy into the slow-field, or regenerate while it is off
fn apply_focus(state: &mut MatchState, dt: f32) {
    let focus = state.settings.focus.clone();

    if state.focus_active {
        if state.stats.energy <= 0.0 {
            state.focus_active = false;
        } else {
            state.stats.energy = (state.stats.energy - focus.drain * dt).max(0.0);
            let damping = focus.damping.powf(dt * 60.0);
            state.fighter_mut(focus.controlled.opponent()).body.vel *= damping;

            if state.stats.energy == 0.0 {
                state.focus_active = false;
                log::debug!("Focus ran out of energy");
            }
            return;
        }
    }

    state.stats.energy = (state.stats.energy + focus.energy_regen * dt).min(focus.energy_max);
}

fn bounce_walls(state: &mut MatchState) {
    let arena = state.settings.arena;
    let wall = state.settings.physics.wall;

    for side in [Side::Lancer, Side::Shuriken] {
        let fighter = match side {
            Side::Lancer => &mut state.lancer,
            Side::Shuriken => &mut state.shuriken,
        };
        if arena.bounce(&mut fighter.body, &wall, &mut state.rng) {
            state.stats.wall_bounce_count += 1;
            fighter.on_wall_bounce(&mut state.rng);
        }
    }
}

/// Momentum exchange always happens; damage only once the cooldown elapsed
fn resolve_fighters(state: &mut MatchState) {
    let tip = state.lancer.tip_position();
    let combat = &state.settings.combat;
    let Some(contact) = resolve_pair(
        &mut state.lancer.body,
        &mut state.shuriken.body,
        tip,
        &combat.geometry,
        &combat.collision,
    ) else {
        return;
    };

    state.shuriken.on_contact(contact.normal, contact.relative_normal_velocity);
    state.lancer.on_contact(contact.normal, contact.relative_normal_velocity);

    if !state.settings.health_enabled() || state.collision_cooldown > 0.0 {
        return;
    }

    let target = classify_hit(&contact, combat.pressure_margin);
    let damage = combat.damage.damage(contact.closing_speed());
    let mut dealt = 0.0;
    if target.hits_a() {
        dealt += apply_damage(&mut state.lancer.body, damage);
    }
    if target.hits_b() {
        dealt += apply_damage(&mut state.shuriken.body, damage);
    }

    state.stats.collision_count += 1;
    state.stats.damage_dealt += dealt;
    state.collision_cooldown = combat.hit_cooldown;

    state.stats.combo_chain = if state.combo_timer > 0.0 {
        state.stats.combo_chain + 1
    } else {
        1
    };
    state.stats.max_combo = state.stats.max_combo.max(state.stats.combo_chain);
    state.combo_timer = combat.combo_window;

    log::debug!(
        "Hit #{} ({}) for {:.2}, combo {}",
        state.stats.collision_count,
        match target {
            HitTarget::A => "Lancer struck",
            HitTarget::B => "Shuriken struck",
            HitTarget::Both => "both struck",
        },
        damage,
        state.stats.combo_chain
    );
}

/// Returns hit points actually removed
fn apply_damage(body: &mut Body, damage: f32) -> f32 {
    let before = body.hp().unwrap_or(0.0);
    body.take_damage(damage);
    before - body.hp().unwrap_or(0.0)
}

/// Finish the match if anyone fell. Returns true once finished.
fn check_outcome(state: &mut MatchState) -> bool {
    let lancer_down = state.lancer.body.is_defeated();
    let shuriken_down = state.shuriken.body.is_defeated();
    let outcome = match (lancer_down, shuriken_down) {
        (true, true) => Outcome::Draw,
        (true, false) => Outcome::Winner(Side::Shuriken),
        (false, true) => Outcome::Winner(Side::Lancer),
        (false, false) => return false,
    };
    state.finish(outcome);
    true
}
