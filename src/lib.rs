//! License server: issues license keys, tracks per-device activations against
//! plan seat limits and answers verification requests over HTTP.

pub mod auth;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod id;
pub mod keygen;
pub mod models;
pub mod stats;
pub mod state;
pub mod tracker;
pub mod util;
