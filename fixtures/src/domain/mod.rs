//! Domain layer
//!
//! - `entities`: the record shapes the fixtures produce
//! - `ports`: traits the provisioning and factory layers depend on

pub mod entities;
pub mod ports;
