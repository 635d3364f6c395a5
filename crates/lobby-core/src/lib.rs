//! Core types and trait definitions for the Lobby visit registry.
//!
//! This crate is free of HTTP and database dependencies. It owns
//! the visit model, the draft/commit split used at the reception desk, and the
//! pure reporting routines. Storage backends implement [`store::VisitStore`]
//! and [`store::Roster`].

// Store traits spell out `impl Future + Send`; implementors may use `async fn`.
#![allow(async_fn_in_trait)]

pub mod desk;
pub mod directory;
pub mod draft;
pub mod error;
pub mod identity;
pub mod lifecycle;
pub mod report;
pub mod resolution;
pub mod session;
pub mod store;
pub mod visit;

pub use error::{Error, Result};
