mod langcode;
mod username;
mod film;

pub use langcode::*;
pub use username::*;
pub use film::*;
