//! Bookstore application library
//!
//! The books module and the process lifecycle that hosts it.

pub mod app;
pub mod modules;
