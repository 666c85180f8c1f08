use ballpit_shared::config::{MAX_BALL_RADIUS, MAX_INITIAL_SPEED, MIN_BALL_RADIUS, MIN_INITIAL_SPEED};
use ballpit_shared::protocol::BallWire;
use rand::Rng;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BallError {
    #[error("ball radius must be positive, got {0}")]
    NonPositiveRadius(i32),
}

/// A disk in the simulation. The radius doubles as the ball's mass.
///
/// `x`/`y` is the top-left corner of the bounding box. The center is cached
/// and refreshed by [`Ball::translate`]; border clamping moves the ball
/// without refreshing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ball {
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) vx: i32,
    pub(crate) vy: i32,
    radius: i32,
    center_x: i32,
    center_y: i32,
    color: [u8; 3],
}

impl Ball {
    pub fn new(x: i32, y: i32, vx: i32, vy: i32, radius: i32, color: [u8; 3]) -> Result<Self, BallError> {
        if radius <= 0 {
            return Err(BallError::NonPositiveRadius(radius));
        }
        Ok(Self {
            x,
            y,
            vx,
            vy,
            radius,
            center_x: x.saturating_add(radius),
            center_y: y.saturating_add(radius),
            color,
        })
    }

    /// Ball with the given kinematics and a random color.
    pub fn with_radius(
        x: i32,
        y: i32,
        vx: i32,
        vy: i32,
        radius: i32,
        rng: &mut impl Rng,
    ) -> Result<Self, BallError> {
        Self::new(x, y, vx, vy, radius, random_color(rng))
    }

    /// Ball with random velocity, radius and color.
    pub fn random(x: i32, y: i32, rng: &mut impl Rng) -> Self {
        let (vx, vy) = random_velocity(rng);
        let radius = rng.gen_range(MIN_BALL_RADIUS..=MAX_BALL_RADIUS);
        Self {
            x,
            y,
            vx,
            vy,
            radius,
            center_x: x.saturating_add(radius),
            center_y: y.saturating_add(radius),
            color: random_color(rng),
        }
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn velocity(&self) -> (i32, i32) {
        (self.vx, self.vy)
    }

    pub fn set_velocity(&mut self, vx: i32, vy: i32) {
        self.vx = vx;
        self.vy = vy;
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    pub fn center(&self) -> (i32, i32) {
        (self.center_x, self.center_y)
    }

    pub fn color(&self) -> [u8; 3] {
        self.color
    }

    /// Move by one tick of velocity and refresh the center. Coordinates
    /// saturate at the `i32` range.
    pub(crate) fn translate(&mut self) {
        self.x = self.x.saturating_add(self.vx);
        self.y = self.y.saturating_add(self.vy);
        self.center_x = self.x.saturating_add(self.radius);
        self.center_y = self.y.saturating_add(self.radius);
    }

    pub fn to_wire(&self) -> BallWire {
        BallWire {
            x: self.x,
            y: self.y,
            vx: self.vx,
            vy: self.vy,
            radius: self.radius,
            color: self.color,
        }
    }
}

impl fmt::Display for Ball {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "center_x: {} center_y: {} vx: {} vy: {}",
            self.center_x, self.center_y, self.vx, self.vy
        )
    }
}

/// Velocity with both components uniform in `MIN_INITIAL_SPEED..=MAX_INITIAL_SPEED`.
pub fn random_velocity(rng: &mut impl Rng) -> (i32, i32) {
    (
        rng.gen_range(MIN_INITIAL_SPEED..=MAX_INITIAL_SPEED),
        rng.gen_range(MIN_INITIAL_SPEED..=MAX_INITIAL_SPEED),
    )
}

/// Clamp a widened coordinate back into `i32`.
pub(crate) fn saturate(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

fn random_color(rng: &mut impl Rng) -> [u8; 3] {
    [rng.gen(), rng.gen(), rng.gen()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn center_is_offset_by_radius() {
        let ball = Ball::new(200, 150, 0, 0, 20, [0, 0, 0]).unwrap();
        assert_eq!(ball.center(), (220, 170));
    }

    #[test]
    fn rejects_non_positive_radius() {
        assert_eq!(
            Ball::new(0, 0, 0, 0, 0, [0, 0, 0]),
            Err(BallError::NonPositiveRadius(0))
        );
        let mut rng = test_rng();
        assert!(Ball::with_radius(0, 0, 1, 1, -5, &mut rng).is_err());
    }

    #[test]
    fn accepts_radius_outside_random_bounds() {
        let mut rng = test_rng();
        let ball = Ball::with_radius(200, 200, 2, 2, 500, &mut rng).unwrap();
        assert_eq!(ball.radius(), 500);
    }

    #[test]
    fn random_balls_stay_in_bounds() {
        let mut rng = test_rng();
        for _ in 0..500 {
            let ball = Ball::random(200, 200, &mut rng);
            assert!((MIN_BALL_RADIUS..=MAX_BALL_RADIUS).contains(&ball.radius()));
            let (vx, vy) = ball.velocity();
            assert!((MIN_INITIAL_SPEED..=MAX_INITIAL_SPEED).contains(&vx));
            assert!((MIN_INITIAL_SPEED..=MAX_INITIAL_SPEED).contains(&vy));
            assert_eq!(ball.center(), (200 + ball.radius(), 200 + ball.radius()));
        }
    }

    #[test]
    fn translate_refreshes_center() {
        let mut ball = Ball::new(200, 200, 3, -4, 10, [1, 2, 3]).unwrap();
        ball.translate();
        assert_eq!(ball.position(), (203, 196));
        assert_eq!(ball.center(), (213, 206));
    }

    #[test]
    fn huge_radius_center_saturates() {
        let ball = Ball::new(200, 200, 0, 0, i32::MAX, [0, 0, 0]).unwrap();
        assert_eq!(ball.center(), (i32::MAX, i32::MAX));

        let ball = Ball::new(200, 200, 0, 0, 1_500_000_000, [0, 0, 0]).unwrap();
        assert_eq!(ball.center(), (1_500_000_200, 1_500_000_200));
    }

    #[test]
    fn translate_saturates_at_i32_range() {
        let mut ball = Ball::new(200, -200, i32::MAX, i32::MIN, 20, [0, 0, 0]).unwrap();
        ball.translate();
        assert_eq!(ball.position(), (i32::MAX, i32::MIN));
        assert_eq!(ball.center(), (i32::MAX, i32::MIN + 20));
    }

    #[test]
    fn saturate_clamps_both_ends() {
        assert_eq!(saturate(-3_000_000_000), i32::MIN);
        assert_eq!(saturate(3_000_000_000), i32::MAX);
        assert_eq!(saturate(-42), -42);
    }

    #[test]
    fn display_reports_center_and_velocity() {
        let ball = Ball::new(200, 200, 2, -1, 20, [0, 0, 0]).unwrap();
        assert_eq!(ball.to_string(), "center_x: 220 center_y: 220 vx: 2 vy: -1");
    }

    #[test]
    fn wire_carries_all_fields() {
        let ball = Ball::new(5, 6, 7, 8, 30, [9, 10, 11]).unwrap();
        assert_eq!(
            ball.to_wire(),
            BallWire {
                x: 5,
                y: 6,
                vx: 7,
                vy: 8,
                radius: 30,
                color: [9, 10, 11],
            }
        );
    }
}
