pub mod calendar;
pub mod catalog;
pub mod currency;
pub mod error;
pub mod mortgage;
pub mod plans;
pub mod property;
pub mod schedule;
pub mod time_value;
pub mod types;

pub use error::OffplanError;
pub use plans::{InstallmentFrequency, MortgagePlan, PaymentPlan};
pub use property::{AssetIncome, PaymentMethod, PropertyDetails, RentalIncome};
pub use schedule::{compute_schedule, PaymentType, ScheduleEntry, ScheduleOutput};
pub use types::*;

/// Standard result type for all offplan operations
pub type OffplanResult<T> = Result<T, OffplanError>;
