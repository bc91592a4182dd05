pub mod applicationmodel;
pub mod chatmodel;
pub mod leasemodel;
pub mod propertymodel;
pub mod rentmodel;
pub mod reviewmodel;
pub mod usermodel;
