//! Eventwar - combat resolution for event wars between towns and nations

pub mod core;
pub mod war;
