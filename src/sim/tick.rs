//! Fixed timestep simulation tick
//!
//! `GameLoop` owns one run: the run state, the player's facing, the bullet
//! lifecycle and the game-over transition timer. Build a new one per run.

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;

use super::bullet::{BulletEnd, BulletLifecycle, Collider, ColliderHandle};
use super::collision::circles_overlap;
use super::direction::{Direction, DirectionModel};
use super::state::{GameEvent, RunPhase, RunState, world_bounds};
use super::timer::DelayedCall;
use crate::consts::*;

/// Input snapshot for a single tick
///
/// Opposite directions may both be set; left wins over right and up wins
/// over down. `fire` is a one-tick pulse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub fire: bool,
}

impl TickInput {
    /// True if nothing is pressed
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Movement velocity for this input, diagonal-normalized
    pub fn velocity(&self, speed: f32) -> Vec2 {
        let mut vel = Vec2::ZERO;

        if self.left {
            vel.x = -speed;
        } else if self.right {
            vel.x = speed;
        }

        if self.up {
            vel.y = -speed;
        } else if self.down {
            vel.y = speed;
        }

        if vel.x != 0.0 && vel.y != 0.0 {
            vel *= DIAGONAL_MULTIPLIER;
        }
        vel
    }
}

/// One run of the game
#[derive(Debug)]
pub struct GameLoop {
    state: RunState,
    facing: DirectionModel,
    /// Set by the facing's redraw callback, drained each tick
    turned: Rc<Cell<Option<Direction>>>,
    bullets: BulletLifecycle,
    hazard_colliders: ColliderHandle,
    /// Started at game over, signals run completion
    transition: Option<DelayedCall>,
    torn_down: bool,
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl GameLoop {
    /// Start a fresh run
    pub fn new() -> Self {
        let state = RunState::new();
        let mut bullets = BulletLifecycle::new(world_bounds());

        // Shooting the hazard only costs the bullet
        let hazard_colliders = bullets.add_colliders(
            vec![Collider {
                id: state.hazard.id,
                shape: state.hazard.shape,
            }],
            None,
        );

        let turned = Rc::new(Cell::new(None));
        let facing = DirectionModel::new().with_on_change({
            let turned = Rc::clone(&turned);
            move |direction| turned.set(Some(direction))
        });

        log::info!("Run started");
        Self {
            state,
            facing,
            turned,
            bullets,
            hazard_colliders,
            transition: None,
            torn_down: false,
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn facing(&self) -> &DirectionModel {
        &self.facing
    }

    pub fn bullets(&self) -> &BulletLifecycle {
        &self.bullets
    }

    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// True while the game-over delay is still counting down
    pub fn transition_pending(&self) -> bool {
        self.transition.as_ref().is_some_and(DelayedCall::is_pending)
    }

    /// Advance the run by one fixed timestep
    pub fn tick(&mut self, input: &TickInput, dt: f32) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.torn_down {
            return events;
        }

        self.state.time_ticks += 1;

        match self.state.phase {
            RunPhase::Running => {
                self.apply_input(input, &mut events);
                self.step_physics(dt, &mut events);

                // The contact tick is not survived
                if circles_overlap(&self.state.player.body.circle(), &self.state.hazard.shape) {
                    self.enter_game_over(&mut events);
                } else {
                    self.state.score += SCORE_PER_TICK;
                }
            }
            RunPhase::GameOver => {
                // Input is ignored but the bullet finishes its flight
                self.step_physics(dt, &mut events);

                if let Some(timer) = self.transition.as_mut() {
                    if timer.advance(dt) {
                        log::info!("Run complete (final score {})", self.state.score);
                        events.push(GameEvent::RunComplete {
                            final_score: self.state.score,
                        });
                    }
                }
            }
        }

        events
    }

    fn apply_input(&mut self, input: &TickInput, events: &mut Vec<GameEvent>) {
        let vel = input.velocity(PLAYER_SPEED);

        if vel != Vec2::ZERO {
            self.facing.update_from_velocity(vel);
        }
        if let Some(direction) = self.turned.take() {
            self.state.player.rotation = direction.facing_radians();
            events.push(GameEvent::Turned { direction });
        }

        self.state.player.body.set_velocity(vel);

        if input.fire && self.bullets.can_fire() {
            let direction = self.facing.direction();
            if self.bullets.fire(self.state.player.pos(), direction) {
                if let Some(bullet) = self.bullets.bullet() {
                    events.push(GameEvent::Fired {
                        pos: bullet.pos,
                        direction,
                    });
                }
            }
        }
    }

    fn step_physics(&mut self, dt: f32, events: &mut Vec<GameEvent>) {
        self.state.player.body.integrate(dt);

        match self.bullets.step(dt) {
            Some(BulletEnd::Hit { pos, .. }) => events.push(GameEvent::BulletHit { pos }),
            Some(BulletEnd::OutOfBounds { pos }) => events.push(GameEvent::BulletExpired { pos }),
            None => {}
        }
    }

    fn enter_game_over(&mut self, events: &mut Vec<GameEvent>) {
        if self.state.phase == RunPhase::GameOver {
            return;
        }

        self.state.phase = RunPhase::GameOver;
        self.state.player.body.set_velocity(Vec2::ZERO);
        self.transition = Some(DelayedCall::new(GAME_OVER_TRANSITION_DELAY_MS));

        log::info!("Game over (score {})", self.state.score);
        events.push(GameEvent::GameOver {
            score: self.state.score,
        });
    }

    /// Cancel the pending transition and detach bullet handlers. Idempotent.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        if let Some(timer) = self.transition.as_mut() {
            timer.cancel();
        }
        self.bullets.remove_colliders(self.hazard_colliders);
        self.bullets.teardown();
        log::debug!("Run torn down at tick {}", self.state.time_ticks);
    }
}

impl Drop for GameLoop {
    fn drop(&mut self) {
        self.teardown();
    }
}
