//! In-process reference policy engine
//!
//! `MemoryPolicyEngine` implements the [`PolicyEngine`](super::PolicyEngine)
//! contract against an in-memory policy table keyed by
//! `(validator identity, operation id)`. Individual policies are black boxes
//! behind the [`TransferPolicy`] trait: a pure `validate` plus a `commit`
//! that applies cumulative effects.
//!
//! The mutating path gets its atomicity from ordering: every registered
//! policy is validated first, and only if all of them pass does the engine
//! commit each one and fire post-evaluation hooks. A rejection therefore
//! leaves no partial state behind. A run mutex serializes mutating
//! evaluations so concurrent hosts keep the same guarantee.

use std::{collections::HashMap, sync::Arc};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::{
    engine::{
        failure::{encode_rejection, encode_run_rejection},
        PolicyEngine, RejectionBlob, ValidatorIdentity,
    },
    extract::{extract, ExtractedParams},
    types::payload::CallPayload,
};

/// Breach report from a rejecting policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyBreach {
    /// Reference to the rejecting policy
    pub policy_ref: String,
    /// Human-readable explanation
    pub reason: String,
}

impl PolicyBreach {
    /// Creates a breach report.
    pub fn new(policy_ref: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            policy_ref: policy_ref.into(),
            reason: reason.into(),
        }
    }
}

/// One registered compliance policy.
///
/// `validate` must be pure; all cumulative accounting belongs in `commit`,
/// which the engine calls only after every policy registered for the same
/// key has validated the transfer.
pub trait TransferPolicy: Send + Sync {
    /// Stable reference used in rejection reports.
    fn policy_ref(&self) -> &str;

    /// Pure admissibility check against the extracted parameters.
    fn validate(&self, params: &ExtractedParams) -> Result<(), PolicyBreach>;

    /// Applies the transfer's cumulative effect. Default: no state.
    fn commit(&self, _params: &ExtractedParams) {}
}

/// Hook invoked after a successful mutating evaluation.
pub trait EvaluationHook: Send + Sync {
    /// Called once per admitted `run`, after all policies committed.
    fn after_run(&self, identity: &ValidatorIdentity, payload: &CallPayload);
}

type PolicyKey = (ValidatorIdentity, u8);

/// In-memory policy engine.
#[derive(Clone, Default)]
pub struct MemoryPolicyEngine {
    policies: Arc<RwLock<HashMap<PolicyKey, Vec<Arc<dyn TransferPolicy>>>>>,
    hooks: Arc<RwLock<Vec<Arc<dyn EvaluationHook>>>>,
    /// Serializes validate-then-commit sequences on the mutating path.
    run_lock: Arc<Mutex<()>>,
}

impl MemoryPolicyEngine {
    /// Creates an engine with no registered policies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a policy for `(identity, operation_id)`.
    ///
    /// Takes effect on the next evaluation; policies already mid-evaluation
    /// are unaffected.
    pub fn register_policy(
        &self,
        identity: &ValidatorIdentity,
        operation_id: u8,
        policy: Arc<dyn TransferPolicy>,
    ) {
        debug!(identity = %identity, operation_id, policy = policy.policy_ref(), "registering policy");
        let mut table = self.policies.write();
        table
            .entry((identity.clone(), operation_id))
            .or_default()
            .push(policy);
    }

    /// Removes every policy registered for `(identity, operation_id)`.
    pub fn clear_policies(&self, identity: &ValidatorIdentity, operation_id: u8) {
        let mut table = self.policies.write();
        table.remove(&(identity.clone(), operation_id));
    }

    /// Adds a post-evaluation hook.
    pub fn add_hook(&self, hook: Arc<dyn EvaluationHook>) {
        self.hooks.write().push(hook);
    }

    fn policies_for(&self, identity: &ValidatorIdentity, operation_id: u8) -> Vec<Arc<dyn TransferPolicy>> {
        let table = self.policies.read();
        table
            .get(&(identity.clone(), operation_id))
            .cloned()
            .unwrap_or_default()
    }

    fn extract_params(&self, payload: &CallPayload) -> Result<ExtractedParams, RejectionBlob> {
        // A well-behaved validator never sends an undecodable payload. If
        // one arrives anyway, an empty blob classifies UNKNOWN rather than
        // masquerading as a policy rejection.
        extract(payload).map_err(|e| {
            warn!(operation_id = payload.operation_id, error = %e, "undecodable payload at engine boundary");
            RejectionBlob::empty()
        })
    }
}

impl PolicyEngine for MemoryPolicyEngine {
    fn check(
        &self,
        identity: &ValidatorIdentity,
        payload: &CallPayload,
    ) -> Result<(), RejectionBlob> {
        let params = self.extract_params(payload)?;
        for policy in self.policies_for(identity, payload.operation_id) {
            if let Err(breach) = policy.validate(&params) {
                debug!(identity = %identity, policy = %breach.policy_ref, "check rejected");
                return Err(encode_rejection(&breach.reason));
            }
        }
        Ok(())
    }

    fn run(
        &self,
        identity: &ValidatorIdentity,
        payload: &CallPayload,
    ) -> Result<(), RejectionBlob> {
        let params = self.extract_params(payload)?;
        let policies = self.policies_for(identity, payload.operation_id);

        let _guard = self.run_lock.lock();

        // Validate everything before committing anything.
        for policy in &policies {
            if let Err(breach) = policy.validate(&params) {
                debug!(identity = %identity, policy = %breach.policy_ref, "run rejected");
                return Err(encode_run_rejection(
                    payload.operation_id,
                    &breach.policy_ref,
                    &breach.reason,
                ));
            }
        }
        for policy in &policies {
            policy.commit(&params);
        }
        drop(_guard);

        let hooks = self.hooks.read().clone();
        for hook in hooks {
            hook.after_run(identity, payload);
        }
        Ok(())
    }
}

/// Caps the size of any single transfer.
pub struct MaxAmountPolicy {
    policy_ref: String,
    max_amount: u64,
}

impl MaxAmountPolicy {
    /// Creates a per-transfer cap policy.
    pub fn new(policy_ref: impl Into<String>, max_amount: u64) -> Self {
        Self {
            policy_ref: policy_ref.into(),
            max_amount,
        }
    }
}

impl TransferPolicy for MaxAmountPolicy {
    fn policy_ref(&self) -> &str {
        &self.policy_ref
    }

    fn validate(&self, params: &ExtractedParams) -> Result<(), PolicyBreach> {
        if params.amount() > self.max_amount {
            return Err(PolicyBreach::new(
                &self.policy_ref,
                format!(
                    "amount {} exceeds per-transfer limit {}",
                    params.amount(),
                    self.max_amount
                ),
            ));
        }
        Ok(())
    }
}

/// Caps the cumulative amount admitted through the mutating path.
///
/// The usage counter only moves on `commit`, so read-only evaluations never
/// observe or cause an increase.
pub struct CumulativeLimitPolicy {
    policy_ref: String,
    cap: u64,
    used: RwLock<u64>,
}

impl CumulativeLimitPolicy {
    /// Creates a cumulative cap policy with zero initial usage.
    pub fn new(policy_ref: impl Into<String>, cap: u64) -> Self {
        Self {
            policy_ref: policy_ref.into(),
            cap,
            used: RwLock::new(0),
        }
    }

    /// Current cumulative usage.
    pub fn usage(&self) -> u64 {
        *self.used.read()
    }
}

impl TransferPolicy for CumulativeLimitPolicy {
    fn policy_ref(&self) -> &str {
        &self.policy_ref
    }

    fn validate(&self, params: &ExtractedParams) -> Result<(), PolicyBreach> {
        let used = *self.used.read();
        let projected = used.checked_add(params.amount());
        match projected {
            Some(total) if total <= self.cap => Ok(()),
            _ => Err(PolicyBreach::new(
                &self.policy_ref,
                format!(
                    "cumulative usage {} + {} exceeds cap {}",
                    used,
                    params.amount(),
                    self.cap
                ),
            )),
        }
    }

    fn commit(&self, params: &ExtractedParams) {
        let mut used = self.used.write();
        *used = used.saturating_add(params.amount());
    }
}
