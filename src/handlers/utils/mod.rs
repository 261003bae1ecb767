pub mod broadcaster;
pub mod callbacks;
