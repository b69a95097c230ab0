//! Domain records: contacts store rows and budget datasets.

pub mod budget;
pub mod contact;
