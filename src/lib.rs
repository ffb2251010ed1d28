//! Servika backend library
//!
//! Marketplace booking backend: booking lifecycle, tiered cancellation
//! refunds with a 48-hour servicer processing deadline, complaint intake,
//! and admin moderation.

pub mod auth;
pub mod booking;
pub mod complaint;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod moderation;
pub mod refund;
pub mod routes;
pub mod state;
pub mod wallet;
