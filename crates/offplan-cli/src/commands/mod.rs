pub mod convert;
pub mod mortgage;
pub mod plans;
pub mod schedule;
