// handlers/protected/mod.rs - Routes behind the token guard

pub mod wishlists;

pub use wishlists::owner_wishlist;
