//! Scrum board client.
//!
//! Sprints, epics and stories live in a remote JSON document store. This
//! crate loads them into a [`models::ProjectSnapshot`], derives board views
//! from it ([`views`]), and applies edits optimistically through
//! [`board::Board`], reloading everything when a write fails.

pub mod auth;
pub mod board;
pub mod config;
pub mod drag;
pub mod forms;
pub mod models;
pub mod render;
pub mod store;
pub mod views;
