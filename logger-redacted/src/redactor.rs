use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap();
    static ref PHONE_REGEX: Regex = Regex::new(r"(?:\+\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b").unwrap();
    static ref IBAN_REGEX: Regex = Regex::new(r"\b[A-Z]{2}\d{2}[A-Z0-9]{11,30}\b").unwrap();
    static ref ACCOUNT_NUMBER_REGEX: Regex = Regex::new(r"\b\d{8,17}\b").unwrap();
}

/// PII redaction configuration
#[derive(Debug, Clone)]
pub struct RedactionConfig {
    pub redact_emails: bool,
    pub redact_phones: bool,
    pub redact_bank_accounts: bool,
    pub custom_patterns: Vec<(Regex, String)>,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            redact_emails: true,
            redact_phones: true,
            redact_bank_accounts: true,
            custom_patterns: Vec::new(),
        }
    }
}

impl RedactionConfig {
    /// Configuration that leaves text untouched
    pub fn disabled() -> Self {
        Self {
            redact_emails: false,
            redact_phones: false,
            redact_bank_accounts: false,
            custom_patterns: Vec::new(),
        }
    }
}

/// Masks client contact details and bank numbers in free-text memos
#[derive(Debug, Clone, Default)]
pub struct PiiRedactor {
    config: RedactionConfig,
}

impl PiiRedactor {
    pub fn new(config: RedactionConfig) -> Self {
        Self { config }
    }

    pub fn from_enabled(enabled: bool) -> Self {
        if enabled {
            Self::default()
        } else {
            Self::new(RedactionConfig::disabled())
        }
    }

    pub fn redact(&self, text: &str) -> String {
        let mut result = text.to_string();

        if self.config.redact_emails {
            result = Self::redact_emails(&result);
        }

        // Long digit runs are account numbers, so they go before phone matching
        if self.config.redact_bank_accounts {
            result = Self::redact_bank_accounts(&result);
        }

        if self.config.redact_phones {
            result = PHONE_REGEX.replace_all(&result, "(***) ***-****").to_string();
        }

        for (pattern, replacement) in &self.config.custom_patterns {
            result = pattern.replace_all(&result, replacement.as_str()).to_string();
        }

        result
    }

    fn redact_emails(text: &str) -> String {
        EMAIL_REGEX
            .replace_all(text, |caps: &regex::Captures| {
                let email = caps.get(0).map_or("", |m| m.as_str());
                match email.split_once('@') {
                    Some((local, domain)) => format!(
                        "{}***@{}***",
                        local.chars().next().unwrap_or('*'),
                        domain.chars().next().unwrap_or('*')
                    ),
                    None => "***@***".to_string(),
                }
            })
            .to_string()
    }

    fn redact_bank_accounts(text: &str) -> String {
        let masked = IBAN_REGEX.replace_all(text, |caps: &regex::Captures| {
            mask_keep_last(caps.get(0).map_or("", |m| m.as_str()), 4)
        });
        ACCOUNT_NUMBER_REGEX
            .replace_all(&masked, |caps: &regex::Captures| {
                mask_keep_last(caps.get(0).map_or("", |m| m.as_str()), 4)
            })
            .to_string()
    }
}

fn mask_keep_last(value: &str, keep: usize) -> String {
    let len = value.chars().count();
    value
        .chars()
        .enumerate()
        .map(|(i, c)| if i + keep < len { '*' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_redaction() {
        let redactor = PiiRedactor::default();

        let redacted = redactor.redact("Retainer from john.doe@example.com");
        assert!(redacted.contains("j***@e***"));
        assert!(!redacted.contains("john.doe"));
    }

    #[test]
    fn test_phone_redaction() {
        let redactor = PiiRedactor::default();

        let redacted = redactor.redact("Call client at (555) 123-4567");
        assert!(redacted.contains("(***) ***-****"));
    }

    #[test]
    fn test_bank_account_keeps_last_four_digits() {
        let redactor = PiiRedactor::default();

        let redacted = redactor.redact("Wire to EG380019000500000000263180002");
        assert!(redacted.ends_with("0002"));
        assert!(!redacted.contains("EG38001900"));
    }

    #[test]
    fn test_disabled_redactor_is_identity() {
        let redactor = PiiRedactor::from_enabled(false);
        let memo = "Refund to jane@firm.com";
        assert_eq!(redactor.redact(memo), memo);
    }
}
