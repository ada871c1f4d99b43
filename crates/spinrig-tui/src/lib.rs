//! Terminal control panel for the spinrig electrospinning rig.
//!
//! This crate provides a standalone binary wrapper around spinrig-cli's
//! control panel. The implementation lives in `spinrig-cli` with the `tui`
//! feature enabled.
//!
//! For the panel itself, see [`spinrig_cli::tui`].

pub use spinrig_cli::tui;
