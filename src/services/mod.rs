pub mod activity;
pub mod auth;
pub mod orders;
pub mod recommendations;
