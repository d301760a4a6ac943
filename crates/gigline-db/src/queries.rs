//! Database query functions organized by table.

pub mod deputies;
pub mod gigs;
pub mod profiles;
