//! Scripted walker that plays the headless session.

use std::collections::VecDeque;
use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::player::{MoveIntent, Player};
use crate::session::{FrameInput, SALOON_WINDOW};

/// Flat distance at which a `Goto` counts as reached.
const ARRIVE_DISTANCE: f32 = 0.3;
/// A `Goto` that takes longer than this is abandoned.
const GOTO_TIMEOUT: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Walk to a point on the ground.
    Goto(Vec3),
    /// Turn toward a point.
    Face(Vec3),
    /// Press the interact key once.
    Interact,
    /// Stand still for a number of seconds.
    Wait(f32),
    /// Walk straight ahead for a number of seconds.
    Walk(f32),
}

pub struct Autopilot {
    steps: VecDeque<Step>,
    /// Seconds spent on the current step.
    step_time: f32,
}

impl Autopilot {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self { steps: steps.into_iter().collect(), step_time: 0.0 }
    }

    /// Visit everything on the roadside: keys, the motel, the pool, the saloon
    /// window, the casino, and finally the cat.
    pub fn roadside_tour() -> Self {
        use Step::*;
        let mut steps = vec![
            Goto(Vec3::new(2.0, 0.0, 6.8)),
            Interact,
            // Motel corridor: two laps, answer the phone, leave through 217.
            Goto(Vec3::new(-20.0, 0.0, 14.0)),
            Interact,
            Wait(3.0),
        ];
        for _ in 0..2 {
            steps.extend([Goto(Vec3::new(200.0, 0.0, -25.0)), Walk(1.0)]);
        }
        steps.extend([
            Goto(Vec3::new(199.0, 0.0, -8.0)),
            Interact,
            Goto(Vec3::new(200.8, 0.0, -1.5)),
            Interact,
            Wait(3.0),
            // Drained pool: take the postcard, climb out.
            Goto(Vec3::new(22.0, 0.0, 11.0)),
            Interact,
            Wait(3.5),
            Goto(Vec3::new(-197.5, 0.0, 4.5)),
            Interact,
            Goto(Vec3::new(-200.0, 0.0, 3.6)),
            Interact,
            Wait(3.5),
            // Saloon window.
            Goto(Vec3::new(5.0, 0.0, -8.0)),
            Face(SALOON_WINDOW),
            Wait(3.0),
            // Casino.
            Goto(Vec3::new(-3.0, 0.0, -36.2)),
            Interact,
            Goto(Vec3::new(-4.0, 0.0, -36.3)),
            Interact,
            Wait(0.5),
            Interact,
            Goto(Vec3::new(0.0, 0.0, -36.3)),
            Interact,
            Goto(Vec3::new(4.0, 0.0, -36.3)),
            Interact,
            // Back up the road toward the cat.
            Goto(Vec3::new(0.0, 0.0, 28.0)),
            Wait(35.0),
        ]);
        Self::new(steps)
    }

    pub fn is_done(&self) -> bool {
        self.steps.is_empty()
    }

    fn finish_step(&mut self) {
        self.steps.pop_front();
        self.step_time = 0.0;
    }

    /// Input for this frame.
    pub fn next_input(&mut self, player: &Player, dt: f32) -> FrameInput {
        let Some(step) = self.steps.front().copied() else {
            return FrameInput::default();
        };
        self.step_time += dt;

        match step {
            Step::Goto(target) => {
                let mut to = target - player.position;
                to.y = 0.0;
                let distance = to.length();
                if distance < ARRIVE_DISTANCE {
                    self.finish_step();
                    return FrameInput::default();
                }
                if self.step_time > GOTO_TIMEOUT {
                    log::warn!("Autopilot gave up reaching {:?} from {:?}", target, player.position);
                    self.finish_step();
                    return FrameInput::default();
                }
                let stride = (player.move_speed * dt).max(1e-4);
                FrameInput {
                    movement: MoveIntent {
                        forward: (distance / stride).min(1.0),
                        strafe: 0.0,
                        turn: turn_toward(player, target),
                    },
                    interact: false,
                }
            }
            Step::Face(target) => {
                self.finish_step();
                FrameInput {
                    movement: MoveIntent { turn: turn_toward(player, target), ..Default::default() },
                    interact: false,
                }
            }
            Step::Interact => {
                self.finish_step();
                FrameInput { interact: true, ..Default::default() }
            }
            Step::Wait(seconds) => {
                if self.step_time >= seconds {
                    self.finish_step();
                }
                FrameInput::default()
            }
            Step::Walk(seconds) => {
                if self.step_time >= seconds {
                    self.finish_step();
                }
                FrameInput {
                    movement: MoveIntent { forward: 1.0, ..Default::default() },
                    interact: false,
                }
            }
        }
    }
}

/// Signed yaw change that points the player at `target`.
fn turn_toward(player: &Player, target: Vec3) -> f32 {
    match player.yaw_toward(target) {
        Some(desired) => (desired - player.yaw + PI).rem_euclid(TAU) - PI,
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::ghost::GhostPhase;
    use crate::liminal::AreaStatus;
    use crate::sequencer::CatPhase;
    use crate::session::Session;
    use crate::state::Item;
    use physics::ColliderSet;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn goto_arrives_and_stops() {
        let mut player = Player::new(Vec3::ZERO, 4.0);
        let mut pilot = Autopilot::new([Step::Goto(Vec3::new(3.0, 0.0, 4.0))]);
        let colliders = ColliderSet::new();
        for _ in 0..200 {
            let input = pilot.next_input(&player, 1.0 / 60.0);
            player.update(&input.movement, &colliders, 1.0 / 60.0);
            if pilot.is_done() {
                break;
            }
        }
        assert!(pilot.is_done());
        assert!(player.position.distance(Vec3::new(3.0, 0.0, 4.0)) < ARRIVE_DISTANCE);
    }

    #[test]
    fn turn_takes_the_short_way_round() {
        let mut player = Player::new(Vec3::ZERO, 4.0);
        player.yaw = 3.0;
        // Target straight behind the default heading, i.e. yaw = PI.
        let turn = turn_toward(&player, Vec3::new(0.0, 0.0, 5.0));
        assert!((turn - (PI - 3.0)).abs() < 1e-4);
        player.yaw = -3.0;
        let turn = turn_toward(&player, Vec3::new(0.0, 0.0, 5.0));
        assert!((turn - (3.0 - PI)).abs() < 1e-4);
    }

    #[test]
    fn roadside_tour_sees_everything() {
        let config = GameConfig::default();
        let seconds = config.session_seconds;
        let mut session = Session::new(config, StdRng::seed_from_u64(11)).unwrap();
        let mut pilot = Autopilot::roadside_tour();
        let dt = 1.0 / 60.0;
        let mut elapsed = 0.0;
        while elapsed < seconds && !pilot.is_done() {
            let input = pilot.next_input(&session.world.player, dt);
            session.frame(dt, &input).unwrap();
            elapsed += dt;
        }

        assert!(pilot.is_done(), "tour unfinished after {elapsed}s");
        let world = &session.world;
        assert!(world.inventory.has(Item::CarKeys));
        assert!(world.inventory.has(Item::Postcard));
        assert!(world.audio.has_played("phone_ring"));
        assert!(world.audio.has_played("phone_voice"));
        assert!(world.audio.has_played("water_drip"));
        assert!(session.areas.areas().all(|a| a.status == AreaStatus::Inactive));
        assert_eq!(session.ghost.phase(), GhostPhase::Gone);
        assert_eq!(session.cat.phase(), CatPhase::Watching);
    }
}
