pub mod exec;
pub mod get;
pub mod job;
pub mod list;
