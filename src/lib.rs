// Library exports for the spe_ed Monte-Carlo player
// The game binary and the replay tool are both built on top of these

pub mod board;
pub mod bot;
pub mod config;
pub mod controller;
pub mod error;
pub mod flood_fill;
pub mod policy;
pub mod profiler;
pub mod render;
pub mod replay;
pub mod rules;
pub mod selector;
pub mod session;
pub mod simulator;
pub mod sink;
pub mod stats;
pub mod types;
