pub mod ids;
pub mod job;
pub mod money;
pub mod service;
