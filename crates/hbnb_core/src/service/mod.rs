//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate storage calls into the console's command surface.
//! - Keep console parsing decoupled from storage details.

pub mod record_service;
