//! tax-service: sales-tax calculation, address validation and reference
//! data via the CereTax API.

pub mod ceretax;
pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
pub mod store;

use crate::ceretax::CeretaxClient;
use crate::config::TaxServiceConfig;
use crate::services::Database;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<TaxServiceConfig>,
    pub db: Database,
    pub client: Arc<CeretaxClient>,
}
