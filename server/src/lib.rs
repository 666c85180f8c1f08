//! Ballpit server library.
//!
//! This module exposes the server components for use in tests and binaries.

pub mod ball;
pub mod config;
pub mod game_loop;
pub mod physics;
pub mod replication;
pub mod server;
pub mod state;
pub mod world;
pub mod ws;

pub use server::{start_server, ServerError, ServerHandle};
