pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod figure;
pub mod state;
pub mod store;
pub mod ui;
