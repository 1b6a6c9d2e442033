//! Core business logic for the lunch voting backend.
//!
//! Services wrap the repositories of `lunch-db`: menus and their items,
//! daily votes, winner computation, and the restaurant and user directory.

pub mod services;

pub use services::*;
