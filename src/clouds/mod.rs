//! Interfaces to cloud services.

pub mod aws;
