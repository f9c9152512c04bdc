//! End-to-end bridge scenarios: registry message overrides and the
//! stateful cumulative-usage protocol across read-only and mutating paths.

use std::sync::Arc;

use trbridge::{
    engine::memory::{CumulativeLimitPolicy, MemoryPolicyEngine},
    RestrictionCode, RestrictionRegistry, TokenAdapter, ValidatorIdentity, OP_TRANSFER_FROM,
};

fn bridge_with_cumulative_cap(
    cap: u64,
) -> (
    TokenAdapter,
    trbridge::WriteCapability,
    Arc<CumulativeLimitPolicy>,
    Arc<RestrictionRegistry>,
) {
    let engine = Arc::new(MemoryPolicyEngine::new());
    let identity = ValidatorIdentity::new("adapter-e2e");
    let policy = Arc::new(CumulativeLimitPolicy::new("daily-cap", cap));
    engine.register_policy(&identity, OP_TRANSFER_FROM, policy.clone());

    let registry = Arc::new(RestrictionRegistry::new("admin"));
    let (adapter, write_cap) = TokenAdapter::bind("TKN", identity, engine, registry.clone());
    (adapter, write_cap, policy, registry)
}

#[test]
fn cumulative_cap_admits_three_thirds_and_rejects_the_fourth() {
    let cap = 300;
    let (adapter, write_cap, policy, _registry) = bridge_with_cumulative_cap(cap);

    let mut last_usage = 0;
    for round in 1..=3 {
        // Read-only queries interleaved with mutating calls must neither
        // observe nor cause any usage increase.
        assert!(adapter.validate_transfer("alice", "bob", 100));
        assert_eq!(policy.usage(), last_usage);

        let code = adapter.operate_on_transfer(&write_cap, "alice", "bob", 100);
        assert_eq!(code, RestrictionCode::OK, "round {round} should pass");
        assert!(
            policy.usage() > last_usage,
            "usage must increase monotonically on the mutating path"
        );
        last_usage = policy.usage();
    }
    assert_eq!(policy.usage(), cap);

    let code = adapter.operate_on_transfer(&write_cap, "alice", "bob", 100);
    assert_eq!(
        code,
        RestrictionCode::POLICY_REJECTED,
        "fourth call exceeds the cap"
    );
    assert_eq!(policy.usage(), cap, "rejected run must not move the counter");
}

#[test]
fn read_only_queries_never_consume_the_cap() {
    let (adapter, _write_cap, policy, _registry) = bridge_with_cumulative_cap(100);

    for _ in 0..10 {
        assert!(adapter.validate_transfer("alice", "bob", 100));
        assert_eq!(
            adapter.detect_transfer_restriction("alice", "bob", 100),
            RestrictionCode::OK
        );
    }
    assert_eq!(policy.usage(), 0);
}

#[test]
fn overwritten_registry_message_reaches_rejected_evaluations() {
    let (adapter, write_cap, _policy, registry) = bridge_with_cumulative_cap(50);

    assert_eq!(
        adapter.message_for_transfer_restriction(RestrictionCode::POLICY_REJECTED),
        "Transfer rejected by compliance policy"
    );

    registry
        .set_message("admin", RestrictionCode::POLICY_REJECTED, "X")
        .expect("owner write");
    assert_eq!(
        adapter.message_for_transfer_restriction(RestrictionCode::POLICY_REJECTED),
        "X"
    );

    // The rejection itself still carries the policy's own reason when one
    // is present; the registry text backs codes without a reason.
    let code = adapter.operate_on_transfer(&write_cap, "alice", "bob", 500);
    assert_eq!(code, RestrictionCode::POLICY_REJECTED);
    assert_eq!(adapter.message_for_transfer_restriction(code), "X");
}

#[test]
fn non_owner_cannot_rewrite_messages() {
    let (_adapter, _write_cap, _policy, registry) = bridge_with_cumulative_cap(50);
    assert!(registry
        .set_message("mallory", RestrictionCode::POLICY_REJECTED, "pwned")
        .is_err());
    assert_eq!(
        registry.message_for(RestrictionCode::POLICY_REJECTED),
        "Transfer rejected by compliance policy"
    );
}
