//! Password generator with per-account saved passwords.
//!
//! The generator lives in [`generators`]; [`core::keyring::Keyring`] ties it to
//! accounts and storage, and [`core::state`] holds the caller-owned client state
//! used by the interactive menu.

pub mod api;
pub mod cli;
pub mod core;
pub mod crypto;
pub mod db;
pub mod generators;
pub mod models;
pub mod utils;
