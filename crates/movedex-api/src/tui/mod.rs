pub mod app;
pub mod input;
pub mod loader;
pub mod ui;

pub use app::run;
