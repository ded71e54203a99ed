pub mod auth;
pub mod credit;
pub mod inventory;
pub mod orders;
pub mod ratings;
pub mod suppliers;
