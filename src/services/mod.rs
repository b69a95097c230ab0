//! Business logic services.

pub mod budget;
pub mod contact_stats;
pub mod export;
pub mod tax;
