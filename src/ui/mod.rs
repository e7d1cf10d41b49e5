//! UI module for crypto-chat.
//!
//! This module contains all UI rendering logic including:
//! - Transcript and input layout
//! - Toast notifications
//! - Text processing

mod render;
pub mod text;
mod toast;

pub use render::{transcript_lines, ui};
pub use toast::{render_toasts, Toast, ToastLevel, ToastState};
