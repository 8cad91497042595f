//! Plooma Core - Shared domain types.
//!
//! This crate provides the types and pure logic used across all Plooma components:
//! - `web` - Server-rendered project/task management application
//! - `cli` - Command-line tools for migrations, user bootstrap and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Board grouping and member directory filtering live here so
//! they can be tested without a running server.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, roles, and task enums
//! - [`board`] - Project board tabs, status columns, and progress statistics
//! - [`directory`] - Member directory filtering and avatar initials

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod board;
pub mod directory;
pub mod types;

pub use board::{Board, BoardColumn, BoardItem, BoardStats, BoardTab};
pub use directory::{DirectoryEntry, NO_NAME, avatar_initial, display_name, filter_directory};
pub use types::*;
