//! Per-ball kinematics and pairwise collision rules.
//!
//! Detection works on ball centers; response works on the top-left
//! positions. Both are needed to reproduce the reference trajectories.

use crate::ball::{saturate, Ball};
use ballpit_shared::config::Border;

/// Move the ball by its velocity, then reflect it off the border.
///
/// The four edge checks are independent: a ball wider than the border
/// trips both the right and the left rule, and the left clamp wins.
/// Edge thresholds are computed in `i64` and clamped back into `i32`.
pub fn advance(ball: &mut Ball, border: &Border) {
    ball.translate();

    let diameter = 2 * i64::from(ball.radius());
    let right = i64::from(border.right());
    let bottom = i64::from(border.bottom());

    // right
    if i64::from(ball.x) + diameter >= right {
        ball.vx = ball.vx.saturating_neg();
        ball.x = saturate(right - diameter - 1);
    }
    // left
    if ball.x <= border.x {
        ball.vx = ball.vx.saturating_abs();
        ball.x = border.x + 1;
    }
    // bottom
    if i64::from(ball.y) + diameter >= bottom {
        ball.vy = ball.vy.saturating_neg();
        ball.y = saturate(bottom - diameter - 1);
    }
    // top
    if ball.y <= border.y {
        ball.vy = ball.vy.saturating_abs();
        ball.y = border.y + 1;
    }
}

/// Circle overlap test on centers, compared squared in `i128` so any pair
/// of `i32` geometries fits.
pub fn is_colliding(a: &Ball, b: &Ball) -> bool {
    let (ax, ay) = a.center();
    let (bx, by) = b.center();
    let dx = i128::from(ax) - i128::from(bx);
    let dy = i128::from(ay) - i128::from(by);
    let sum_radius = i128::from(a.radius()) + i128::from(b.radius());
    dx * dx + dy * dy <= sum_radius * sum_radius
}

/// Impulse exchange for a pair that is closing along the line between
/// their positions. Radius stands in for mass. Velocities are truncated
/// toward zero after the update.
pub fn collide(a: &mut Ball, b: &mut Ball) {
    let dx = f64::from(a.x) - f64::from(b.x);
    let dy = f64::from(a.y) - f64::from(b.y);
    let dvx = f64::from(b.vx) - f64::from(a.vx);
    let dvy = f64::from(b.vy) - f64::from(a.vy);
    let dot = dx * dvx + dy * dvy;
    if dot <= 0.0 {
        return;
    }

    // dot > 0 implies dx, dy are not both zero
    let scale = dot / (dx * dx + dy * dy);
    let cx = dx * scale;
    let cy = dy * scale;

    let combined = f64::from(a.radius()) + f64::from(b.radius());
    let weight_a = 2.0 * f64::from(b.radius()) / combined;
    let weight_b = 2.0 * f64::from(a.radius()) / combined;

    a.vx = (f64::from(a.vx) + weight_a * cx) as i32;
    a.vy = (f64::from(a.vy) + weight_a * cy) as i32;
    b.vx = (f64::from(b.vx) - weight_b * cx) as i32;
    b.vy = (f64::from(b.vy) - weight_b * cy) as i32;
}
