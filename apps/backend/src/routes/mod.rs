pub mod items;
pub mod sessions;
