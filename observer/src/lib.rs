//! Ballpit observer library.
//!
//! A passive client of the ballpit server: receives per-tick snapshots and
//! hands them to a [`Renderer`].

pub mod client;

pub use ballpit_shared::render::{LogRenderer, Renderer};
pub use client::{request_add_ball, start_client, ClientError, ObserverClient};
