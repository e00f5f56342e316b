use chrono::Utc;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

use crate::error::{AccountingError, AccountingResult};
use crate::models::Setting;
use crate::policy::normalize_currency;
use crate::store::{LedgerStore, Mutation, WriteBatch};
use crate::validation::{constraint_error, required};

/// Settings key for the base→quote exchange rate, e.g. `EX_RATE_EGP_USD`
pub fn exchange_rate_key(base: &str, quote: &str) -> AccountingResult<String> {
    let base = normalize_currency(base)?;
    let quote = normalize_currency(quote)?;
    Ok(format!("EX_RATE_{}_{}", base, quote))
}

fn parse_rate(input: &str) -> AccountingResult<Decimal> {
    let trimmed = input.trim();
    let rate = Decimal::from_str(trimmed).map_err(|e| AccountingError::InvalidRate {
        input: input.to_string(),
        reason: e.to_string(),
    })?;
    if rate <= Decimal::ZERO {
        return Err(AccountingError::InvalidRate {
            input: input.to_string(),
            reason: "rate must be greater than zero".to_string(),
        });
    }
    Ok(rate)
}

/// Keyed configuration values, exchange rates among them
pub struct SettingsStore {
    store: Arc<dyn LedgerStore>,
}

impl SettingsStore {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    pub async fn get_setting(&self, key: &str) -> AccountingResult<Option<Setting>> {
        let key = required("setting key", key)?;
        Ok(self.store.get_setting(&key).await?)
    }

    /// Store a positive decimal rate under `pair_key`, replacing any previous value
    pub async fn set_exchange_rate(&self, pair_key: &str, rate: &str) -> AccountingResult<Decimal> {
        let key = required("exchange rate key", pair_key)?;
        let value = parse_rate(rate)?;

        let setting = Setting {
            key: key.clone(),
            value: value.to_string(),
            updated_at: Utc::now(),
        };
        self.store
            .apply(WriteBatch::new().with(Mutation::UpsertSetting(setting)))
            .await
            .map_err(constraint_error)?;

        info!(key = %key, rate = %value, "Exchange rate updated");
        Ok(value)
    }

    pub async fn get_exchange_rate(&self, pair_key: &str) -> AccountingResult<Option<Decimal>> {
        match self.get_setting(pair_key).await? {
            Some(setting) => parse_rate(&setting.value).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryLedgerStore;
    use rust_decimal_macros::dec;

    fn settings() -> SettingsStore {
        SettingsStore::new(Arc::new(InMemoryLedgerStore::new()))
    }

    #[tokio::test]
    async fn rate_round_trips_exactly() {
        let settings = settings();
        let key = exchange_rate_key("usd", "egp").unwrap();
        assert_eq!(key, "EX_RATE_USD_EGP");

        settings.set_exchange_rate(&key, "50.75").await.unwrap();
        assert_eq!(settings.get_exchange_rate(&key).await.unwrap(), Some(dec!(50.75)));
        let raw = settings.get_setting(&key).await.unwrap().unwrap();
        assert_eq!(raw.value, "50.75");
    }

    #[tokio::test]
    async fn non_positive_and_garbage_rates_are_rejected() {
        let settings = settings();
        for bad in ["0", "-1.5", "abc", "", "1e3"] {
            let err = settings.set_exchange_rate("EX_RATE_USD_EGP", bad).await.unwrap_err();
            assert!(matches!(err, AccountingError::InvalidRate { .. }), "{:?} accepted", bad);
        }
        assert!(settings.get_setting("EX_RATE_USD_EGP").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn later_rate_replaces_earlier() {
        let settings = settings();
        settings.set_exchange_rate("EX_RATE_EUR_USD", "1.08").await.unwrap();
        settings.set_exchange_rate("EX_RATE_EUR_USD", "1.10").await.unwrap();
        assert_eq!(
            settings.get_exchange_rate("EX_RATE_EUR_USD").await.unwrap(),
            Some(dec!(1.10))
        );
    }

    #[test]
    fn rate_key_rejects_bad_codes() {
        assert!(exchange_rate_key("US", "EGP").is_err());
    }
}
