mod app;
mod config;
mod effects;
mod shell;
mod ui;

pub use app::run_app;
