// ABOUTME: Shared configuration for tilebuf.
// ABOUTME: Defines layout and modeline settings and config file handling.

pub mod config;

pub use config::{Config, ConfigError, LayoutSettings, ModelineSettings};
