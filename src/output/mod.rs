pub mod snapshot;
pub mod vtu;
