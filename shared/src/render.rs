//! Rendering collaborator shared by the server-side view and observers.

use crate::config::Border;
use crate::protocol::BallWire;

/// Draws the field. Called once per received snapshot with the border and
/// the full ordered ball list.
pub trait Renderer {
    fn render(&mut self, border: &Border, balls: &[BallWire]);
}

impl<F> Renderer for F
where
    F: FnMut(&Border, &[BallWire]),
{
    fn render(&mut self, border: &Border, balls: &[BallWire]) {
        self(border, balls)
    }
}

/// Headless renderer that logs a summary every `every` frames.
pub struct LogRenderer {
    every: u64,
    frames: u64,
}

impl LogRenderer {
    pub fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
            frames: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for LogRenderer {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Renderer for LogRenderer {
    fn render(&mut self, border: &Border, balls: &[BallWire]) {
        self.frames += 1;
        if self.frames % self.every != 0 {
            return;
        }
        tracing::info!(
            "Frame {}: {} balls inside {}x{} at ({}, {})",
            self.frames,
            balls.len(),
            border.width,
            border.height,
            border.x,
            border.y
        );
        for (i, ball) in balls.iter().enumerate() {
            let [r, g, b] = ball.color;
            tracing::debug!(
                "  circle #{} at ({}, {}) d={} fill=#{:02x}{:02x}{:02x}",
                i,
                ball.x,
                ball.y,
                2 * i64::from(ball.radius),
                r,
                g,
                b
            );
        }
    }
}
