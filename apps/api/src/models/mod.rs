pub mod alert;
pub mod application;
pub mod job;
pub mod profile;
pub mod resume;
