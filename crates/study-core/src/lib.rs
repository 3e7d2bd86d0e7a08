//! # study-core
//!
//! Core types shared across the studyhub crates.
//!
//! This crate provides:
//! - Entity structs and creation payloads for every persisted table
//! - Status and option enums
//! - ID prefix constants used by the local store
//! - Derived statistics records and the shared percentage rule
//! - Nested read shapes (schedule with activities, quiz with questions, ...)
//! - Payloads produced by the generative-content client
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod generated;
pub mod ids;
pub mod stats;
pub mod views;
