//! These structs provide the CLI interface for the expense CLI.

use crate::ledger::{DisplayOrder, IdStrategy, LedgerSettings};
use crate::model::{Category, PaymentType, Tab};
use crate::storage::Backend;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// expense: A personal ledger of income and spending.
///
/// Record transactions against a fixed set of categories, see how much came in and how much went
/// out, and browse your history one category at a time. Everything is stored locally in the home
/// directory, either as JSON files or in a SQLite database.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration file.
    ///
    /// This is the first command you should run. Decide what directory you want to store data in
    /// and pass this as --home. By default, it will be $HOME/expense-tracker.
    Init(InitArgs),
    /// Record a transaction.
    Add(AddArgs),
    /// Show transactions, newest first, optionally limited to one category.
    List(ListArgs),
    /// Show total income, total spending, and the balance.
    Summary,
    /// Show the categories and payment types a transaction can have.
    Categories,
    /// Look for problems in the stored ledger.
    Check,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the ledger and configuration are held. Defaults to ~/expense-tracker
    #[arg(long, env = "EXPENSE_TRACKER_HOME", default_value_t = default_home())]
    home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, home: PathBuf) -> Self {
        Self {
            log_level,
            home: home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }
}

/// (Not shown): Args for the `expense init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// Where the ledger is stored.
    #[arg(long, value_enum, default_value_t = Backend::default())]
    backend: Backend,

    /// How new transactions are given ids.
    #[arg(long, value_enum, default_value_t = IdStrategy::default())]
    id_strategy: IdStrategy,

    /// How the transaction list is ordered.
    #[arg(long, value_enum, default_value_t = DisplayOrder::default())]
    display_order: DisplayOrder,

    /// How many more times a failed write is attempted before giving up.
    #[arg(long, default_value_t = 1)]
    write_retries: u32,

    /// Keep the cents of an amount instead of recording whole units only.
    #[arg(long)]
    fractional: bool,
}

impl InitArgs {
    pub fn new(backend: Backend, settings: LedgerSettings) -> Self {
        Self {
            backend,
            id_strategy: settings.id_strategy,
            display_order: settings.display_order,
            write_retries: settings.write_retries,
            fractional: !settings.whole_units_only,
        }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn settings(&self) -> LedgerSettings {
        LedgerSettings {
            id_strategy: self.id_strategy,
            display_order: self.display_order,
            write_retries: self.write_retries,
            whole_units_only: !self.fractional,
        }
    }
}

/// (Not shown): Args for the `expense add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// The amount, e.g. 250 or 12.99. Always positive: the category decides whether it is income
    /// or spending.
    amount: String,

    /// One of the names shown by `expense categories`.
    #[arg(long, short, default_value_t = Category::DEFAULT.to_string())]
    category: String,

    /// Cash, Card or UPI.
    #[arg(long, short, default_value_t = PaymentType::default().to_string())]
    payment_type: String,

    /// The day of the transaction as YYYY-MM-DD. Defaults to now.
    #[arg(long, short)]
    date: Option<NaiveDate>,
}

impl AddArgs {
    pub fn new(amount: impl Into<String>, category: Category) -> Self {
        Self {
            amount: amount.into(),
            category: category.to_string(),
            payment_type: PaymentType::default().to_string(),
            date: None,
        }
    }

    pub fn with_payment_type(mut self, payment_type: PaymentType) -> Self {
        self.payment_type = payment_type.to_string();
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn payment_type(&self) -> &str {
        &self.payment_type
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }
}

/// (Not shown): Args for the `expense list` command.
#[derive(Debug, Parser, Clone)]
pub struct ListArgs {
    /// Either All or a category name.
    #[arg(long, short, default_value_t = Tab::All)]
    tab: Tab,
}

impl ListArgs {
    pub fn new(tab: Tab) -> Self {
        Self { tab }
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }
}

fn default_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("expense-tracker"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or EXPENSE_TRACKER_HOME instead of relying on the \
                default home directory. If you continue using the program right now, you may \
                have problems!",
            );
            PathBuf::from("expense-tracker")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
