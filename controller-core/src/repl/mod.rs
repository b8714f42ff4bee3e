//! Console tooling shared between firmware and emulator targets.
//!
//! The command grammar lives in [`grammar`]; [`status`] renders the shared
//! status snapshot.

pub mod grammar;
pub mod status;
