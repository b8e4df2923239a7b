//! ECS Components

pub mod fighter;

pub use fighter::*;
