use crate::ball::Ball;
use crate::physics::{advance, collide, is_colliding};
use ballpit_shared::config::Border;

/// The bounded field and the per-tick rules applied to a ball collection.
#[derive(Debug, Clone, Copy, Default)]
pub struct World {
    pub border: Border,
}

impl World {
    pub fn new(border: Border) -> Self {
        Self { border }
    }

    /// One tick: advance every ball, hand the advanced collection to
    /// `publish`, then resolve collisions.
    ///
    /// Published snapshots therefore show this tick's positions with the
    /// previous tick's collision response.
    pub fn step<F>(&self, balls: &mut [Ball], publish: F)
    where
        F: FnOnce(&[Ball]),
    {
        for ball in balls.iter_mut() {
            advance(ball, &self.border);
        }
        publish(balls);
        self.resolve_collisions(balls);
    }

    /// Apply `collide` to every overlapping pair in `(i, j)` index order.
    ///
    /// Overlap depends on centers only, which `collide` never touches, so
    /// the pairs can be found before any response is applied.
    pub fn resolve_collisions(&self, balls: &mut [Ball]) {
        for (i, j) in Self::colliding_pairs(balls) {
            let (head, tail) = balls.split_at_mut(j);
            collide(&mut head[i], &mut tail[0]);
        }
    }

    /// Exhaustive scan over index pairs `(i, j)`, `i < j`, i outer.
    pub fn colliding_pairs(balls: &[Ball]) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for i in 0..balls.len() {
            for j in (i + 1)..balls.len() {
                if is_colliding(&balls[i], &balls[j]) {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }
}
