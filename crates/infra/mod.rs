pub mod db;
#[cfg(feature = "memory")]
pub mod memory;
pub mod platform_sync;
