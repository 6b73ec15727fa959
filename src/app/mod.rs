pub mod classify_app;

pub use classify_app::ClassifyApp;
