//! Data types for the menu extraction library.

pub mod config;
pub mod document;
pub mod menu;
pub mod request;
pub mod restaurant;
pub mod week;
