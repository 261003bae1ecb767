mod app;
mod admins;
mod env;

pub use app::*;
pub use admins::*;
