//! Route modules for the archive upload server

pub mod health;
pub mod upload;
