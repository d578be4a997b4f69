//! Peripheral drivers written against the `embedded-hal` 1.0 traits.

pub mod aht20;
pub mod lamp;
