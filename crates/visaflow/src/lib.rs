//! Core library for the visa application wizard.
//!
//! Layers, from the outside in: the [`api`] client talks to the visa backend,
//! [`store`] persists the in-progress draft between sessions, [`validation`]
//! turns raw form input into domain values, [`wizard`] drives each step, and
//! [`navigation`] maps application status to the next screen.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod navigation;
pub mod store;
pub mod telemetry;
pub mod validation;
pub mod wizard;

pub use error::AppError;
