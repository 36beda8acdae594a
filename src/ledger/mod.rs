//! The transaction ledger: persistence, running totals, the displayed view, and the entry
//! workflow, brought together by `LedgerSession`.

pub mod entry;
pub mod ids;
pub mod session;
pub mod store;
pub mod totals;
pub mod view;

pub use entry::{Draft, EntryState, EntryWorkflow, ValidatedDraft};
pub use ids::IdStrategy;
pub use session::{LedgerSession, LedgerSettings, Snapshot};
pub use store::{LedgerStore, LoadProblem, Loaded};
pub use totals::{aggregate, apply_increment, Totals};
pub use view::{display_list, select_tab, sort_for_display, DisplayOrder};
