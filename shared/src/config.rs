/// Left edge of the simulation border
pub const BORDER_X: i32 = 100;
/// Top edge of the simulation border
pub const BORDER_Y: i32 = 100;
pub const BORDER_WIDTH: i32 = 500;
pub const BORDER_HEIGHT: i32 = 500;

/// Period between two simulation ticks (milliseconds)
pub const TICK_PERIOD_MS: u64 = 10;

/// Smallest radius (and mass) a randomly generated ball gets
pub const MIN_BALL_RADIUS: i32 = 20;
/// Largest radius (and mass) a randomly generated ball gets
pub const MAX_BALL_RADIUS: i32 = 50;

/// Velocity components of random and shot balls are drawn from this range (inclusive)
pub const MIN_INITIAL_SPEED: i32 = -10;
pub const MAX_INITIAL_SPEED: i32 = 10;

/// Where seed balls and locally added balls appear (top-left of bounding box)
pub const SPAWN_X: i32 = 200;
pub const SPAWN_Y: i32 = 200;

/// Velocity given to a ball added through `add_ball_local`
pub const ADDED_BALL_VELOCITY: (i32, i32) = (2, 2);

pub const DEFAULT_PORT: u16 = 2345;
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1";

/// Axis-aligned rectangle the balls bounce inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Border {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Default for Border {
    fn default() -> Self {
        Self {
            x: BORDER_X,
            y: BORDER_Y,
            width: BORDER_WIDTH,
            height: BORDER_HEIGHT,
        }
    }
}

impl Border {
    /// x coordinate of the right edge
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// y coordinate of the bottom edge
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.width <= 0 {
            return Err("border width must be > 0".to_string());
        }
        if self.height <= 0 {
            return Err("border height must be > 0".to_string());
        }
        if self.x.checked_add(self.width).is_none() || self.y.checked_add(self.height).is_none() {
            return Err("border extends past i32 range".to_string());
        }
        Ok(())
    }
}
