#![no_std]

// Shared logic for the host power controller.
//
// This crate stays portable across MCU firmware and host tooling by avoiding the
// Rust standard library and exposing abstractions the other crates can adopt.

pub mod driver;
pub mod io;
pub mod lines;
pub mod repl;
pub mod sequencer;
pub mod telemetry;
pub mod timebase;
