//! Plooma web application library.
//!
//! Server-rendered pages for projects, tasks, members and comments, backed
//! by `PostgreSQL`. The binary in `main.rs` wires this library into an axum
//! server; the CLI reuses the database layer and auth service.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod flash;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
