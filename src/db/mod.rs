pub mod applicationdb;
pub mod chatdb;
pub mod db;
pub mod leasedb;
pub mod propertydb;
pub mod rentdb;
pub mod reviewdb;
pub mod userdb;
