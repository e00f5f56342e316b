// Error codes implementation
// Stable identifiers returned to API clients and printed by the ops CLI.

pub mod validation {
    pub const INVALID_INPUT: &str = "VALIDATION_1001";
    pub const MISSING_REQUIRED_FIELD: &str = "VALIDATION_1002";
    pub const INVALID_FORMAT: &str = "VALIDATION_1003";
}

pub mod ledger {
    pub const DUPLICATE_CODE: &str = "LEDGER_2001";
    pub const UNBALANCED_TRANSACTION: &str = "LEDGER_2002";
    pub const NEGATIVE_BALANCE: &str = "LEDGER_2003";
    pub const INVALID_RATE: &str = "LEDGER_2004";
    pub const FOREIGN_KEY_VIOLATION: &str = "LEDGER_2005";
    pub const NOT_FOUND: &str = "LEDGER_2006";
    pub const ACCOUNT_TYPE_LOCKED: &str = "LEDGER_2007";
    pub const WRITE_CONFLICT: &str = "LEDGER_2008";
}

pub mod database {
    pub const CONNECTION_FAILED: &str = "DB_4001";
    pub const QUERY_FAILED: &str = "DB_4002";
    pub const CONSTRAINT_VIOLATION: &str = "DB_4003";
    pub const STATEMENT_TIMEOUT: &str = "DB_4004";
    pub const MIGRATION_FAILED: &str = "DB_4005";
}

pub mod configuration {
    pub const INVALID_CONFIG: &str = "CONFIG_5001";
}
