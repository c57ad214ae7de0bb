//! Use-case services over the persistence store.
//!
//! # Responsibility
//! - Orchestrate repository calls and analytics into use-case APIs.
//! - Keep the CLI decoupled from storage details.

pub mod attendance_service;
pub mod follow_up_service;
pub mod settings_service;
