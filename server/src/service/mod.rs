//! Service layer

pub mod gateway;
