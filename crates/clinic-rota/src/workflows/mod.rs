pub mod coverage;
pub mod intake;
pub mod roster;
pub mod store;
pub mod vacation;
