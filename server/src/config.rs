use ballpit_shared::config::{Border, DEFAULT_PORT, SPAWN_X, SPAWN_Y, TICK_PERIOD_MS};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub tick_period_ms: u64,
    pub rng_seed: u64,
    /// Random balls present before the first tick
    pub seed_ball_count: usize,
    /// Top-left corner where seed and added balls appear
    pub spawn_point: (i32, i32),
    pub border: Border,
    /// Snapshots buffered per observer before new ones are dropped
    pub observer_queue_depth: usize,
    pub command_queue_depth: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: format!("0.0.0.0:{}", DEFAULT_PORT),
            tick_period_ms: TICK_PERIOD_MS,
            rng_seed: 42,
            seed_ball_count: 2,
            spawn_point: (SPAWN_X, SPAWN_Y),
            border: Border::default(),
            observer_queue_depth: 64,
            command_queue_depth: 256,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_addr.is_empty() {
            return Err("listen_addr must not be empty".to_string());
        }
        if self.tick_period_ms == 0 {
            return Err("tick_period_ms must be > 0".to_string());
        }
        if self.observer_queue_depth == 0 {
            return Err("observer_queue_depth must be > 0".to_string());
        }
        if self.command_queue_depth == 0 {
            return Err("command_queue_depth must be > 0".to_string());
        }
        self.border.validate()
    }
}
