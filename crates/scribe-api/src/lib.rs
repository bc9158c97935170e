//! Service layer for scribe's HTTP API.

pub mod services;
