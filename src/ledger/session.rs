//! `LedgerSession` owns the loaded ledger, its running totals, and the selected tab, and is the
//! only way to change any of them.
//!
//! Writers are serialized by the async mutex around the `LedgerStore`: a second submission waits
//! until the first has been written and applied, so neither can build on a stale ledger. Readers
//! take the `RwLock` around the in-memory state, which is only ever replaced as a whole after a
//! successful write, so the transactions and totals a reader sees always agree.

use crate::error::{PersistenceError, SubmitError};
use crate::ledger::entry::{Draft, EntryWorkflow, ValidatedDraft};
use crate::ledger::ids::{self, IdStrategy};
use crate::ledger::store::{LedgerStore, LoadProblem};
use crate::ledger::totals::{apply_increment, Totals};
use crate::ledger::view::{display_list, DisplayOrder};
use crate::model::{Tab, Transaction};
use crate::storage::Storage;
use crate::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

/// The knobs a session runs with. `Config::settings` produces these from the home directory's
/// configuration.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct LedgerSettings {
    pub id_strategy: IdStrategy,
    pub display_order: DisplayOrder,
    pub write_retries: u32,
    pub whole_units_only: bool,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            id_strategy: IdStrategy::default(),
            display_order: DisplayOrder::default(),
            write_retries: 1,
            whole_units_only: true,
        }
    }
}

/// What a presentation layer draws: the list under the selected tab, in display order, and the
/// totals over the whole ledger.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Snapshot {
    pub displayed: Vec<Transaction>,
    pub totals: Totals,
    pub tab: Tab,
}

impl Snapshot {
    pub fn income(&self) -> rust_decimal::Decimal {
        self.totals.income
    }

    pub fn spent(&self) -> rust_decimal::Decimal {
        self.totals.spent
    }
}

#[derive(Debug, Default)]
struct State {
    transactions: Vec<Transaction>,
    totals: Totals,
    tab: Tab,
}

/// A loaded ledger and everything derived from it.
pub struct LedgerSession {
    store: Mutex<LedgerStore>,
    state: RwLock<State>,
    settings: LedgerSettings,
}

impl LedgerSession {
    /// Creates a session over `storage`. Nothing is read until `load_ledger` is called.
    pub fn new(storage: Box<dyn Storage>, settings: LedgerSettings) -> Self {
        Self {
            store: Mutex::new(LedgerStore::new(storage, settings.write_retries)),
            state: RwLock::new(State::default()),
            settings,
        }
    }

    pub fn settings(&self) -> &LedgerSettings {
        &self.settings
    }

    /// Loads the ledger from storage and recomputes the totals. The selected tab is kept.
    ///
    /// Never fails: if the stored ledger cannot be read it is treated as empty and the problem is
    /// returned so the caller can warn about it.
    pub async fn load_ledger(&self) -> Option<LoadProblem> {
        let mut store = self.store.lock().await;
        let loaded = store.load().await;
        let totals = Totals::aggregate(&loaded.transactions);
        let mut state = self.state.write().await;
        state.transactions = loaded.transactions;
        state.totals = totals;
        loaded.problem
    }

    /// Validates and commits `draft` as a new transaction, returning the committed record.
    pub async fn submit_draft(
        &self,
        draft: &Draft,
    ) -> std::result::Result<Transaction, SubmitError> {
        let mut workflow = EntryWorkflow::with_draft(draft.clone());
        self.submit(&mut workflow).await
    }

    /// Runs `workflow` through validation and commit.
    ///
    /// A rejected draft leaves the workflow in `Drafting` and nothing else changes. A failed write
    /// also leaves it in `Drafting`, draft intact, with the ledger and totals untouched. On
    /// success the workflow is `Done` with a fresh draft.
    pub async fn submit(
        &self,
        workflow: &mut EntryWorkflow,
    ) -> std::result::Result<Transaction, SubmitError> {
        let validated = workflow.validate(Utc::now(), self.settings.whole_units_only)?;
        workflow.begin_commit();
        match self.commit(validated).await {
            Ok(transaction) => {
                workflow.complete(Utc::now());
                Ok(transaction)
            }
            Err(e) => {
                workflow.commit_failed();
                Err(e)
            }
        }
    }

    async fn commit(
        &self,
        validated: ValidatedDraft,
    ) -> std::result::Result<Transaction, SubmitError> {
        let mut store = self.store.lock().await;
        let existing = self.state.read().await.transactions.clone();

        let stored_counter = match self.settings.id_strategy {
            IdStrategy::Counter => store.load_counter().await,
            IdStrategy::Uuid => None,
        };
        let issued = ids::issue(self.settings.id_strategy, stored_counter, &existing)
            .map_err(SubmitError::Id)?;

        let transaction = Transaction::new(
            issued.id,
            validated.amount,
            validated.category,
            validated.payment_type,
            validated.date,
        );
        let updated = store
            .append_and_persist(&existing, transaction.clone())
            .await
            .map_err(|e: PersistenceError| {
                warn!("Transaction was not saved: {}", e.describe());
                e
            })?;

        {
            let mut state = self.state.write().await;
            let totals = apply_increment(state.totals, &transaction);
            state.transactions = updated;
            state.totals = totals;
        }
        debug!("Committed transaction {}", transaction.id());

        if let Some(counter) = issued.counter {
            if let Err(e) = store.save_counter(counter).await {
                // The next id is also derived from the ledger, so a stale counter is harmless
                warn!("{e:#}");
            }
        }
        Ok(transaction)
    }

    /// Changes which transactions `snapshot` displays.
    pub async fn select_tab(&self, tab: Tab) {
        debug!("Selecting tab {tab}");
        self.state.write().await.tab = tab;
    }

    pub async fn snapshot(&self) -> Snapshot {
        let state = self.state.read().await;
        Snapshot {
            displayed: display_list(&state.transactions, state.tab, self.settings.display_order),
            totals: state.totals,
            tab: state.tab,
        }
    }

    /// Every transaction, in ledger order.
    pub async fn transactions(&self) -> Vec<Transaction> {
        self.state.read().await.transactions.clone()
    }

    pub async fn totals(&self) -> Totals {
        self.state.read().await.totals
    }

    /// Recomputes the totals from scratch and replaces the running ones if they had drifted.
    /// Returns true if they had.
    pub async fn reconcile_totals(&self) -> bool {
        let mut state = self.state.write().await;
        let fresh = Totals::aggregate(&state.transactions);
        if fresh == state.totals {
            return false;
        }
        warn!(
            "Running totals (income {}, spent {}) did not match the ledger (income {}, spent {}), \
            repaired",
            state.totals.income, state.totals.spent, fresh.income, fresh.spent
        );
        state.totals = fresh;
        true
    }

    /// Whether onboarding has been completed.
    pub async fn has_launched(&self) -> bool {
        self.store.lock().await.has_launched().await
    }

    pub async fn mark_launched(&self) -> Result<()> {
        self.store.lock().await.mark_launched().await?;
        debug!("Marked the ledger as launched");
        Ok(())
    }

    #[cfg(test)]
    pub(crate) async fn corrupt_totals(&self, totals: Totals) {
        self.state.write().await.totals = totals;
    }
}
