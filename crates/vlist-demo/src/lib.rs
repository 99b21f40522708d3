#![forbid(unsafe_code)]

//! Headless replay of a virtualized chat panel.
//!
//! The binary scrolls a synthetic conversation from its newest message to
//! the top of its paged history and prints one line per simulated tick:
//! the window, the load-more activity and the first rendered row.

pub mod cli;
pub mod replay;
