//! Rule-set composition
//!
//! A `RuleSet` evaluates an ordered list of heterogeneous validators under
//! ALL or ANY semantics. ALL fails fast at the first rejection; ANY
//! short-circuits at the first acceptance and, on exhaustion, reports the
//! last rejection seen. A rule set is itself a
//! [`TransferValidator`], so sets nest.
//!
//! Administrative add/remove takes effect on the next evaluation only and
//! never touches a member validator's internal accounting.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::warn;

use crate::{
    types::restriction::EvaluationOutcome,
    validator::{EvalMode, TransferValidator},
};

/// How member outcomes combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombinationMode {
    /// Every member must accept; the first rejection decides.
    All,
    /// One accepting member suffices; exhaustion rejects.
    Any,
}

/// Ordered collection of validators under one combination mode.
pub struct RuleSet {
    mode: CombinationMode,
    validators: RwLock<Vec<Arc<dyn TransferValidator>>>,
}

impl RuleSet {
    /// Creates an empty rule set.
    pub fn new(mode: CombinationMode) -> Self {
        Self {
            mode,
            validators: RwLock::new(Vec::new()),
        }
    }

    /// The combination mode.
    pub fn mode(&self) -> CombinationMode {
        self.mode
    }

    /// Number of registered validators.
    pub fn len(&self) -> usize {
        self.validators.read().len()
    }

    /// True when no validators are registered.
    pub fn is_empty(&self) -> bool {
        self.validators.read().is_empty()
    }

    /// Appends a validator; effective from the next evaluation.
    pub fn add_validator(&self, validator: Arc<dyn TransferValidator>) {
        self.validators.write().push(validator);
    }

    /// Removes the validator at `index`, preserving order of the rest.
    /// Returns it, or `None` when the index is out of range.
    pub fn remove_validator(&self, index: usize) -> Option<Arc<dyn TransferValidator>> {
        let mut validators = self.validators.write();
        if index < validators.len() {
            Some(validators.remove(index))
        } else {
            None
        }
    }
}

impl TransferValidator for RuleSet {
    fn evaluate(
        &self,
        from: &str,
        to: &str,
        amount: u64,
        mode: EvalMode<'_>,
    ) -> EvaluationOutcome {
        // Snapshot under the read lock, evaluate without it: member
        // evaluation must not run while the list is locked.
        let validators = self.validators.read().clone();

        match self.mode {
            CombinationMode::All => {
                for validator in &validators {
                    let outcome = validator.evaluate(from, to, amount, mode);
                    if !outcome.allowed {
                        return outcome;
                    }
                }
                EvaluationOutcome::allowed()
            }
            CombinationMode::Any => {
                if validators.is_empty() {
                    // Observed legacy behavior: an unconfigured ANY set
                    // admits everything. Kept pending a product decision.
                    warn!("empty ANY rule set admits transfer vacuously");
                    return EvaluationOutcome::allowed();
                }
                let mut last_rejection = None;
                for validator in &validators {
                    let outcome = validator.evaluate(from, to, amount, mode);
                    if outcome.allowed {
                        return outcome;
                    }
                    last_rejection = Some(outcome);
                }
                // Non-empty list, no acceptance: last_rejection is set.
                last_rejection.unwrap_or_else(EvaluationOutcome::allowed)
            }
        }
    }
}
