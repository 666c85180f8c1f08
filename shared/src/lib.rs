//! Types shared by the ballpit server and its observers.

pub mod config;
pub mod mass;
pub mod protocol;
pub mod render;
