use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

/// LexLedger maintenance and reconciliation tool
#[derive(Parser, Debug)]
#[command(name = "lexledger-ops", version)]
#[command(about = "Bulk maintenance, orphan cleanup and exchange rates for the LexLedger books")]
pub struct Cli {
    /// Configuration file (YAML or TOML)
    #[arg(short, long, env = "LEXLEDGER_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Database connection URL, overrides the configuration file
    #[arg(long, env = "DATABASE_URL", global = true, hide_env_values = true)]
    pub database_url: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Apply pending schema migrations
    Migrate,

    /// Delete every financial and practice record of a company in one transaction
    WipeFinancials {
        #[arg(long)]
        company: Uuid,
        /// Required: this cannot be undone
        #[arg(long)]
        confirm: bool,
    },

    /// Replace a company's chart of accounts with the standard chart
    ResetCoa {
        #[arg(long)]
        company: Uuid,
        #[arg(long)]
        confirm: bool,
    },

    /// Delete a project; its trust accounts are kept as orphans
    DeleteProject {
        #[arg(long)]
        project: Uuid,
        #[arg(long)]
        confirm: bool,
    },

    /// List trust accounts whose project no longer exists
    FindOrphans,

    /// Delete orphaned trust accounts with their transactions
    PurgeOrphans {
        #[arg(long)]
        confirm: bool,
    },

    /// Store an exchange rate, e.g. `set-rate EGP USD 0.0205`
    SetRate {
        /// Currency being priced
        base: String,
        /// Currency the rate is expressed in
        quote: String,
        rate: String,
    },

    /// Show a stored exchange rate, e.g. `get-rate EGP USD`
    GetRate { base: String, quote: String },

    /// Compare the trust subledger with the general ledger's trust bank accounts
    Reconcile {
        #[arg(long)]
        company: Uuid,
        #[arg(long, default_value = "USD")]
        currency: String,
    },
}

impl Command {
    /// Destructive commands refuse to run without `--confirm`
    pub fn confirmation(&self) -> Option<bool> {
        match self {
            Command::WipeFinancials { confirm, .. }
            | Command::ResetCoa { confirm, .. }
            | Command::DeleteProject { confirm, .. }
            | Command::PurgeOrphans { confirm } => Some(*confirm),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Migrate => "migrate",
            Command::WipeFinancials { .. } => "wipe-financials",
            Command::ResetCoa { .. } => "reset-coa",
            Command::DeleteProject { .. } => "delete-project",
            Command::FindOrphans => "find-orphans",
            Command::PurgeOrphans { .. } => "purge-orphans",
            Command::SetRate { .. } => "set-rate",
            Command::GetRate { .. } => "get-rate",
            Command::Reconcile { .. } => "reconcile",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_wipe_with_confirmation() {
        let company = Uuid::new_v4();
        let cli = Cli::parse_from([
            "lexledger-ops",
            "wipe-financials",
            "--company",
            &company.to_string(),
            "--confirm",
        ]);
        assert_eq!(
            cli.command,
            Command::WipeFinancials {
                company,
                confirm: true
            }
        );
        assert_eq!(cli.command.confirmation(), Some(true));
    }

    #[test]
    fn read_only_commands_need_no_confirmation() {
        let cli = Cli::parse_from(["lexledger-ops", "--json", "find-orphans"]);
        assert!(cli.json);
        assert_eq!(cli.command.confirmation(), None);
    }

    #[test]
    fn rate_commands_take_positional_currencies() {
        let cli = Cli::parse_from(["lexledger-ops", "set-rate", "EGP", "USD", "0.0205"]);
        assert_eq!(
            cli.command,
            Command::SetRate {
                base: "EGP".into(),
                quote: "USD".into(),
                rate: "0.0205".into()
            }
        );

        let cli = Cli::parse_from(["lexledger-ops", "get-rate", "EGP", "USD"]);
        assert_eq!(
            cli.command,
            Command::GetRate {
                base: "EGP".into(),
                quote: "USD".into()
            }
        );

        assert!(Cli::try_parse_from(["lexledger-ops", "set-rate", "EGP", "USD"]).is_err());
    }

    #[test]
    fn rejects_malformed_company_id() {
        let result = Cli::try_parse_from(["lexledger-ops", "reset-coa", "--company", "acme"]);
        assert!(result.is_err());
    }
}
