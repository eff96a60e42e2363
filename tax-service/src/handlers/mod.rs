//! HTTP handlers for tax-service.

pub mod address;
pub mod app;
pub mod calculate;
pub mod documents;
pub mod reference;
pub mod webhook;
