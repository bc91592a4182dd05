pub mod applications;
pub mod auth;
pub mod chat;
pub mod leases;
pub mod properties;
pub mod rent;
pub mod reviews;
pub mod users;
pub mod ws;
