//! # Web API Request Handlers

pub mod analyst;
pub mod database;
pub mod health;
