// Input checks shared by the ledger services
use rust_decimal::Decimal;

use crate::error::{AccountingError, AccountingResult, StoreError};

/// Amount columns are NUMERIC(20, 6): 14 integer digits, 6 decimals
const STORED_SCALE: u32 = 6;
const STORED_INTEGER_DIGITS: u32 = 14;

/// Trimmed value, rejecting blanks
pub(crate) fn required(field: &str, value: &str) -> AccountingResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AccountingError::Validation(format!("{} must not be empty", field)));
    }
    Ok(value.to_string())
}

/// Reject amounts the amount columns cannot hold
pub(crate) fn check_storable(field: &str, amount: Decimal) -> AccountingResult<()> {
    let limit = Decimal::from(10_i64.pow(STORED_INTEGER_DIGITS));
    if amount.abs() >= limit || amount.round_dp(STORED_SCALE) != amount {
        return Err(AccountingError::Validation(format!(
            "{} {} is outside the storable range ({} integer digits, {} decimals)",
            field, amount, STORED_INTEGER_DIGITS, STORED_SCALE
        )));
    }
    Ok(())
}

/// Sum that reports overflow instead of panicking
pub(crate) fn checked_total(amounts: impl IntoIterator<Item = Decimal>) -> AccountingResult<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount))
        .ok_or_else(|| AccountingError::Validation("amounts overflow the supported range".to_string()))
}

/// Map constraint failures the caller did not anticipate
pub(crate) fn constraint_error(err: StoreError) -> AccountingError {
    match err {
        StoreError::ForeignKeyViolation(detail) => AccountingError::ForeignKeyViolation(detail),
        StoreError::UniqueViolation(detail) => AccountingError::Conflict(detail),
        other => AccountingError::Storage(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_rejected() {
        assert!(required("code", "   ").is_err());
        assert_eq!(required("code", " 1000 ").unwrap(), "1000");
    }

    #[test]
    fn amounts_beyond_the_column_range_are_rejected() {
        assert!(check_storable("amount", Decimal::new(99_999_999_999_999_99, 2)).is_ok());
        assert!(check_storable("amount", Decimal::from(100_000_000_000_000_i64)).is_err());
        assert!(check_storable("amount", Decimal::MIN).is_err());
        assert!(check_storable("amount", Decimal::new(1, 7)).is_err());
    }

    #[test]
    fn overflowing_totals_are_errors() {
        let err = checked_total([Decimal::MAX, Decimal::MAX]).unwrap_err();
        assert!(matches!(err, AccountingError::Validation(_)));
        assert_eq!(
            checked_total([Decimal::MAX, Decimal::MIN]).unwrap(),
            Decimal::ZERO
        );
    }

    #[test]
    fn foreign_key_failures_become_domain_errors() {
        let err = constraint_error(StoreError::ForeignKeyViolation("fk".into()));
        assert!(matches!(err, AccountingError::ForeignKeyViolation(_)));
        let err = constraint_error(StoreError::Timeout("slow".into()));
        assert!(matches!(err, AccountingError::Storage(StoreError::Timeout(_))));
    }
}
