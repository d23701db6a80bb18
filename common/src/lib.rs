//! CalcFx Common Types
//!
//! This crate contains the types shared by the calculator core and the FX
//! rate layer: ISO currency codes and the fixed-precision decimal context
//! every computation runs under.

pub mod currency;
pub mod decimal;
pub mod error;
pub mod observable;

pub use currency::*;
pub use decimal::*;
pub use error::*;
pub use observable::Observable;
