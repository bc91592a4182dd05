pub mod background_jobs;
pub mod presence;
pub mod rent_schedule;
