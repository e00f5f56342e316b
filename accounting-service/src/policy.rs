use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{AccountingError, AccountingResult};
use crate::models::TrustAccountType;

/// Ledger rules that vary per deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerPolicy {
    /// Currency used when a posting does not name one
    pub default_currency: String,
    /// Decimal places per ISO currency code
    pub currency_minor_units: HashMap<String, u32>,
    /// Decimal places for currencies missing from `currency_minor_units`
    pub fallback_minor_units: u32,
    pub allow_negative_retainer: bool,
    pub allow_negative_expense: bool,
    /// Extra attempts after a uniqueness conflict in get-or-create flows
    pub conflict_retries: u32,
    /// Chart code prefix of cash accounts
    pub cash_account_prefix: String,
    /// Chart code prefix of the trust bank accounts mirrored by the subledger
    pub trust_account_prefix: String,
    /// Code used for the company expense account created on demand
    pub expense_account_code: String,
    pub default_query_limit: usize,
    pub max_query_limit: usize,
}

impl Default for LedgerPolicy {
    fn default() -> Self {
        let currency_minor_units = [("USD", 2), ("EUR", 2), ("GBP", 2), ("EGP", 2), ("JPY", 0), ("KWD", 3)]
            .into_iter()
            .map(|(code, units)| (code.to_string(), units))
            .collect();

        Self {
            default_currency: "USD".to_string(),
            currency_minor_units,
            fallback_minor_units: 2,
            allow_negative_retainer: false,
            allow_negative_expense: true,
            conflict_retries: 3,
            cash_account_prefix: "10".to_string(),
            trust_account_prefix: "1020".to_string(),
            expense_account_code: "5000".to_string(),
            default_query_limit: 50,
            max_query_limit: 1000,
        }
    }
}

impl LedgerPolicy {
    pub fn minor_units(&self, currency: &str) -> u32 {
        self.currency_minor_units
            .get(currency)
            .copied()
            .unwrap_or(self.fallback_minor_units)
    }

    pub fn allows_negative(&self, account_type: TrustAccountType) -> bool {
        match account_type {
            TrustAccountType::Retainer => self.allow_negative_retainer,
            TrustAccountType::Expense => self.allow_negative_expense,
        }
    }

    /// Reject amounts finer than the currency's smallest unit
    pub fn check_precision(&self, amount: Decimal, currency: &str) -> AccountingResult<()> {
        let units = self.minor_units(currency);
        if amount.round_dp(units) != amount {
            return Err(AccountingError::Validation(format!(
                "amount {} has more than {} decimal places for {}",
                amount, units, currency
            )));
        }
        Ok(())
    }

    /// A sum balances when it is below half of the currency's smallest unit
    pub fn is_balanced(&self, total: Decimal, currency: &str) -> bool {
        let half_unit = Decimal::new(5, self.minor_units(currency) + 1);
        total.abs() < half_unit
    }

    pub fn validate(&self) -> AccountingResult<()> {
        normalize_currency(&self.default_currency)?;
        if self.conflict_retries == 0 {
            return Err(AccountingError::Validation(
                "conflict_retries must be at least 1".to_string(),
            ));
        }
        if self.default_query_limit == 0 || self.default_query_limit > self.max_query_limit {
            return Err(AccountingError::Validation(format!(
                "default_query_limit must be between 1 and {}",
                self.max_query_limit
            )));
        }
        if self.trust_account_prefix.trim().is_empty() || self.cash_account_prefix.trim().is_empty() {
            return Err(AccountingError::Validation(
                "account prefixes must not be empty".to_string(),
            ));
        }
        if self.fallback_minor_units > 8 {
            return Err(AccountingError::Validation(
                "fallback_minor_units must be at most 8".to_string(),
            ));
        }
        if let Some((code, units)) = self.currency_minor_units.iter().find(|(_, u)| **u > 8) {
            return Err(AccountingError::Validation(format!(
                "{} minor units for {} is out of range",
                units, code
            )));
        }
        Ok(())
    }
}

/// Upper-case ISO 4217 style code, exactly three letters
pub fn normalize_currency(code: &str) -> AccountingResult<String> {
    let code = code.trim().to_ascii_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AccountingError::Validation(format!(
            "'{}' is not a three-letter currency code",
            code
        )));
    }
    Ok(code)
}
