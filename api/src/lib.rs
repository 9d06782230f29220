pub mod app;
pub mod booking;
pub mod classifier;
pub mod config;
pub mod error;
pub mod features;
pub mod handler;
pub mod model;
pub mod page;
pub mod schema;
