pub mod job_cache;
pub mod session;
