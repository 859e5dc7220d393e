//! Round-up savings ledger engine
//!
//! This crate rounds every expense up to a spending ceiling, treats the
//! residue as notional savings, adjusts it with time-windowed override and
//! addition rules, aggregates it into reporting windows, and projects the
//! result to retirement with compound growth, inflation discounting and a
//! progressive tax benefit.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
