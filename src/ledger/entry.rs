//! The transaction entry workflow: a draft is edited, validated, and committed.
//!
//! ```text
//! Drafting -> Validating -> Committing -> Done
//!                 |             |
//!                 v             v
//!              Rejected      Drafting (write failed, draft kept)
//!                 |
//!                 v
//!              Drafting
//! ```
//!
//! Validation is pure. Committing is done by `LedgerSession::submit`, which drives the state
//! changes here around its write.

use crate::error::EntryError;
use crate::model::{Amount, Category, PaymentType};
use chrono::{DateTime, Utc};
use std::str::FromStr;
use tracing::debug;

/// The amount text a new draft starts with. Submitting it unchanged is rejected.
pub const UNSET_AMOUNT: &str = "0";

/// A transaction as the user is filling it in. Category and payment type are kept as text until
/// validation so that whatever the user typed can be reported back.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Draft {
    pub amount_text: String,
    pub category: String,
    pub payment_type: String,
    pub date: DateTime<Utc>,
}

impl Draft {
    /// A draft with the default values: amount `"0"`, Food, Cash, dated `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            amount_text: UNSET_AMOUNT.to_string(),
            category: Category::DEFAULT.to_string(),
            payment_type: PaymentType::default().to_string(),
            date: now,
        }
    }

    pub fn with_amount(mut self, text: impl Into<String>) -> Self {
        self.amount_text = text.into();
        self
    }

    pub fn with_category(mut self, category: impl ToString) -> Self {
        self.category = category.to_string();
        self
    }

    pub fn with_payment_type(mut self, payment_type: impl ToString) -> Self {
        self.payment_type = payment_type.to_string();
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }
}

/// A draft whose every field has been checked and parsed. Only an id is missing.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ValidatedDraft {
    pub amount: Amount,
    pub category: Category,
    pub payment_type: PaymentType,
    pub date: DateTime<Utc>,
}

/// Checks `draft` against the rules for a new transaction.
///
/// When `whole_units_only` is set any fraction is dropped, so `"12.99"` records 12. An amount
/// that is zero after that is rejected just like the untouched `"0"`.
pub fn validate(
    draft: &Draft,
    now: DateTime<Utc>,
    whole_units_only: bool,
) -> Result<ValidatedDraft, EntryError> {
    let amount = parse_amount(&draft.amount_text, whole_units_only)?;
    let category = Category::from_str(draft.category.trim())
        .map_err(|_| EntryError::InvalidCategory(draft.category.clone()))?;
    let payment_type = PaymentType::from_str(draft.payment_type.trim())
        .map_err(|_| EntryError::InvalidPaymentType(draft.payment_type.clone()))?;
    if draft.date > now {
        return Err(EntryError::FutureDate { date: draft.date });
    }
    Ok(ValidatedDraft {
        amount,
        category,
        payment_type,
        date: draft.date,
    })
}

fn parse_amount(text: &str, whole_units_only: bool) -> Result<Amount, EntryError> {
    let invalid = || EntryError::InvalidAmount {
        text: text.to_string(),
    };
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == UNSET_AMOUNT {
        return Err(invalid());
    }
    let amount = Amount::from_str(trimmed).map_err(|_| invalid())?;
    if amount.is_negative() {
        return Err(invalid());
    }
    let amount = if whole_units_only {
        amount.truncated()
    } else {
        amount
    };
    if amount.is_zero() {
        return Err(invalid());
    }
    Ok(amount)
}

/// Where an entry is in its lifecycle.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum EntryState {
    Drafting,
    Validating,
    Rejected,
    Committing,
    Done,
}

/// One entry form: the draft being edited plus where it is in the workflow.
#[derive(Debug, Clone)]
pub struct EntryWorkflow {
    draft: Draft,
    state: EntryState,
    last_rejection: Option<EntryError>,
}

impl EntryWorkflow {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_draft(Draft::new(now))
    }

    pub fn with_draft(draft: Draft) -> Self {
        Self {
            draft,
            state: EntryState::Drafting,
            last_rejection: None,
        }
    }

    pub fn state(&self) -> EntryState {
        self.state
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Edits the draft. Editing a finished entry starts a new one.
    pub fn draft_mut(&mut self) -> &mut Draft {
        if self.state == EntryState::Done {
            self.transition(EntryState::Drafting);
        }
        &mut self.draft
    }

    /// The reason the most recent validation failed, cleared by the next success.
    pub fn last_rejection(&self) -> Option<&EntryError> {
        self.last_rejection.as_ref()
    }

    /// Validates the current draft. On failure the workflow passes through `Rejected` and is left
    /// in `Drafting` with the draft untouched.
    pub fn validate(
        &mut self,
        now: DateTime<Utc>,
        whole_units_only: bool,
    ) -> Result<ValidatedDraft, EntryError> {
        self.transition(EntryState::Validating);
        match validate(&self.draft, now, whole_units_only) {
            Ok(validated) => {
                self.last_rejection = None;
                Ok(validated)
            }
            Err(e) => {
                self.transition(EntryState::Rejected);
                debug!("Draft rejected: {e}");
                self.last_rejection = Some(e.clone());
                self.transition(EntryState::Drafting);
                Err(e)
            }
        }
    }

    pub(crate) fn begin_commit(&mut self) {
        self.transition(EntryState::Committing);
    }

    /// The write succeeded: reset the draft to defaults and finish.
    pub(crate) fn complete(&mut self, now: DateTime<Utc>) {
        self.draft = Draft::new(now);
        self.transition(EntryState::Done);
    }

    /// The write failed: keep the draft so the user can submit it again.
    pub(crate) fn commit_failed(&mut self) {
        self.transition(EntryState::Drafting);
    }

    fn transition(&mut self, to: EntryState) {
        debug!("Entry {:?} -> {:?}", self.state, to);
        self.state = to;
    }
}
