//! Presentation and session control for the terminal client.

pub mod controller;
mod runner;
mod signal;
pub mod state; // Session Controller のテストから AppContext を組み立てるため public
pub mod template;
pub mod view;

pub use controller::SessionController;
pub use runner::run;
