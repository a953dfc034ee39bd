//! Job posting scraping, memoized by URL in the `job_cache` table.

pub mod handlers;
