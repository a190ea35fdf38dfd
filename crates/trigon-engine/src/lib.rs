//! Trigon engine crate.
//!
//! Core of a vsync-paced render loop: the GPU context, immutable pipeline and
//! geometry built once at setup, the frame loop driver, and the per-frame
//! acquire/encode/present path. Windows, views and application bootstrapping
//! belong to the host and reach the core through the traits in [`device`] and
//! [`driver`].

pub mod device;
pub mod driver;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod pipeline;
pub mod render;

#[cfg(test)]
mod testing;
