//! # Todolist API Server Library
//!
//! Core functionality for the todolist API server: a task-management
//! backend where users manage their own tasks and admins manage everything.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
