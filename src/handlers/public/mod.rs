// handlers/public/mod.rs - Routes that require no authentication

pub mod auth;
pub mod authors;
pub mod blogs;
pub mod comments;
pub mod root;
pub mod wishlists;
