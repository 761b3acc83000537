//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep CLI and scheduler callers decoupled from storage details.

pub mod daily_word_service;
