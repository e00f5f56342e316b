pub mod accounts;
pub mod health;
pub mod ledger;
pub mod maintenance;
pub mod practice;
pub mod reports;
pub mod settings;
pub mod trust;

use serde::Deserialize;

use crate::error::ApiError;

/// `?confirm=true`, required by every route that deletes data
#[derive(Debug, Default, Deserialize)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub confirm: bool,
}

impl ConfirmQuery {
    pub fn require(&self, action: &'static str) -> Result<(), ApiError> {
        if self.confirm {
            Ok(())
        } else {
            Err(ApiError::ConfirmationRequired { action })
        }
    }
}
