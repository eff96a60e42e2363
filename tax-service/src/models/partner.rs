//! Partner (addressable record) model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A company or customer record carrying a postal address and the raw
/// result of its last address validation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Partner {
    pub partner_id: Uuid,
    pub name: String,
    pub street: Option<String>,
    pub street2: Option<String>,
    pub city: Option<String>,
    pub state_code: Option<String>,
    pub country_code: Option<String>,
    pub zip: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub pluscode: Option<String>,
    pub last_validation: Option<String>,
    pub created_utc: DateTime<Utc>,
}

/// Address subset used when building ship-from/ship-to request blocks.
#[derive(Debug, Clone, Default)]
pub struct AddressFields {
    pub street: Option<String>,
    pub street2: Option<String>,
    pub city: Option<String>,
    pub state_code: Option<String>,
    pub country_code: Option<String>,
    pub zip: Option<String>,
}

impl AddressFields {
    /// Whether the address is complete enough to resolve a destination:
    /// line 1, city, state and postal code must all be present.
    pub fn is_resolvable(&self) -> bool {
        fn filled(v: &Option<String>) -> bool {
            v.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false)
        }
        filled(&self.street) && filled(&self.city) && filled(&self.state_code) && filled(&self.zip)
    }
}

impl From<&Partner> for AddressFields {
    fn from(p: &Partner) -> Self {
        AddressFields {
            street: p.street.clone(),
            street2: p.street2.clone(),
            city: p.city.clone(),
            state_code: p.state_code.clone(),
            country_code: p.country_code.clone(),
            zip: p.zip.clone(),
        }
    }
}

/// The subset of address fields a validation run decided to rewrite.
/// Only fields that actually differ are set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddressChanges {
    pub street: Option<String>,
    pub street2: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub state_code: Option<String>,
    pub country_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub pluscode: Option<String>,
}

impl AddressChanges {
    pub fn is_empty(&self) -> bool {
        self.street.is_none()
            && self.street2.is_none()
            && self.city.is_none()
            && self.zip.is_none()
            && self.state_code.is_none()
            && self.country_code.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
            && self.pluscode.is_none()
    }
}
