pub mod api;
pub mod company;
pub mod core;
pub mod error;
