//! Crypto Chat - a terminal chat client that enriches questions about
//! Bitcoin and Ethereum with live market prices.
//!
//! This library exposes the core modules for testing and reuse.

pub mod app;
pub mod backend;
pub mod config;
pub mod conversation;
pub mod input;
pub mod logging;
pub mod market;
pub mod message;
pub mod orchestrator;
pub mod ui;
