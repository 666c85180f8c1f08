use crate::ball::{random_velocity, Ball, BallError};
use crate::config::ServerConfig;
use crate::replication::{BroadcastReport, ObserverChannel, ObserverSet};
use crate::world::World;
use ballpit_shared::config::ADDED_BALL_VELOCITY;
use rand_chacha::ChaCha8Rng;

/// Authoritative simulation state owned by the game loop task.
pub struct SimState {
    pub world: World,
    balls: Vec<Ball>,
    observers: ObserverSet,
    pub rng: ChaCha8Rng,
    spawn_point: (i32, i32),
    tick_count: u64,
}

impl SimState {
    /// State with the configured number of random seed balls at the spawn point.
    pub fn new(config: &ServerConfig) -> Self {
        use rand::SeedableRng;
        let mut rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        let (sx, sy) = config.spawn_point;
        let balls = (0..config.seed_ball_count)
            .map(|_| Ball::random(sx, sy, &mut rng))
            .collect();

        Self {
            world: World::new(config.border),
            balls,
            observers: ObserverSet::new(),
            rng,
            spawn_point: config.spawn_point,
            tick_count: 0,
        }
    }

    /// Empty state, for driving hand-placed scenarios.
    pub fn empty(config: &ServerConfig) -> Self {
        Self {
            balls: Vec::new(),
            ..Self::new(config)
        }
    }

    /// Advance one tick and broadcast the advanced collection before
    /// collisions are resolved.
    pub fn tick(&mut self) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        let observers = &mut self.observers;
        self.world
            .step(&mut self.balls, |balls| report = observers.broadcast(balls));
        self.tick_count += 1;
        report
    }

    /// Append a ball. Radius bounds are not checked here.
    pub fn add_ball(&mut self, ball: Ball) {
        self.balls.push(ball);
    }

    /// Build a ball of the given mass at the spawn point and append it.
    pub fn add_ball_of_mass(&mut self, mass: i32) -> Result<(), BallError> {
        let (sx, sy) = self.spawn_point;
        let (vx, vy) = ADDED_BALL_VELOCITY;
        let ball = Ball::with_radius(sx, sy, vx, vy, mass, &mut self.rng)?;
        self.add_ball(ball);
        Ok(())
    }

    /// Give ball `index` a fresh random velocity. Returns false if there is
    /// no such ball.
    pub fn shoot(&mut self, index: usize) -> bool {
        let (vx, vy) = random_velocity(&mut self.rng);
        self.set_velocity(index, vx, vy)
    }

    pub fn set_velocity(&mut self, index: usize, vx: i32, vy: i32) -> bool {
        match self.balls.get_mut(index) {
            Some(ball) => {
                ball.set_velocity(vx, vy);
                true
            }
            None => false,
        }
    }

    pub fn register_observer(&mut self, channel: ObserverChannel) {
        self.observers.register(channel);
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballpit_shared::config::{MAX_INITIAL_SPEED, MIN_INITIAL_SPEED};

    fn test_config() -> ServerConfig {
        ServerConfig {
            rng_seed: 12345,
            ..Default::default()
        }
    }

    #[test]
    fn seeds_configured_ball_count() {
        let state = SimState::new(&test_config());
        assert_eq!(state.balls().len(), 2);
        for ball in state.balls() {
            assert_eq!(ball.position(), (200, 200));
        }
    }

    #[test]
    fn same_seed_same_balls() {
        let a = SimState::new(&test_config());
        let b = SimState::new(&test_config());
        assert_eq!(a.balls(), b.balls());
    }

    #[test]
    fn add_ball_of_mass_appends_at_spawn() {
        let mut state = SimState::empty(&test_config());
        state.add_ball_of_mass(30).unwrap();
        state.add_ball_of_mass(45).unwrap();
        assert_eq!(state.balls().len(), 2);
        let last = &state.balls()[1];
        assert_eq!(last.position(), (200, 200));
        assert_eq!(last.velocity(), (2, 2));
        assert_eq!(last.radius(), 45);
    }

    #[test]
    fn add_ball_of_mass_rejects_zero() {
        let mut state = SimState::empty(&test_config());
        assert_eq!(
            state.add_ball_of_mass(0),
            Err(BallError::NonPositiveRadius(0))
        );
        assert!(state.balls().is_empty());
    }

    #[test]
    fn shoot_randomizes_within_range() {
        let mut state = SimState::new(&test_config());
        for _ in 0..50 {
            assert!(state.shoot(1));
            let (vx, vy) = state.balls()[1].velocity();
            assert!((MIN_INITIAL_SPEED..=MAX_INITIAL_SPEED).contains(&vx));
            assert!((MIN_INITIAL_SPEED..=MAX_INITIAL_SPEED).contains(&vy));
        }
    }

    #[test]
    fn shoot_missing_ball_is_noop() {
        let mut state = SimState::empty(&test_config());
        assert!(!state.shoot(0));
    }

    #[test]
    fn tick_broadcasts_pre_collision_snapshot() {
        let mut state = SimState::empty(&test_config());
        state.add_ball(Ball::new(200, 200, 2, 0, 20, [1, 1, 1]).unwrap());
        state.add_ball(Ball::new(222, 200, -2, 0, 20, [2, 2, 2]).unwrap());

        let (channel, mut rx) = ObserverChannel::new(1, 8);
        state.register_observer(channel);

        let report = state.tick();
        assert_eq!(report.delivered, 1);
        assert_eq!(state.tick_count(), 1);

        let snapshot = rx.try_recv().unwrap();
        assert_eq!((snapshot.balls[0].x, snapshot.balls[0].vx), (202, 2));
        assert_eq!((snapshot.balls[1].x, snapshot.balls[1].vx), (218, -2));

        assert_eq!(state.balls()[0].velocity(), (-2, 0));
        assert_eq!(state.balls()[1].velocity(), (2, 0));
    }

    #[test]
    fn tick_without_observers_still_advances() {
        let mut state = SimState::empty(&test_config());
        state.add_ball(Ball::new(300, 300, 5, -5, 20, [0, 0, 0]).unwrap());
        let report = state.tick();
        assert_eq!(report, BroadcastReport::default());
        assert_eq!(state.balls()[0].position(), (305, 295));
    }
}
