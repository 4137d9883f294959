//! Discount curve construction and the yield-curve trait.

pub mod discount;
pub mod flat;
pub mod traits;

pub use discount::DiscountCurve;
pub use flat::FlatCurve;
pub use traits::YieldCurve;
