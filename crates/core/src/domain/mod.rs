pub mod job;
pub mod report;
pub mod request;
pub mod stage;
