pub mod admin;
pub mod backfill;
pub mod seed;
