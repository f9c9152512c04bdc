//! Ledger SDK Module
//!
//! An in-process token ledger wired to the transfer-restriction bridge.
//! Balance and allowance bookkeeping is deliberately plain; the interesting
//! part is the transfer path. A single operation lock serializes every
//! mutating ledger operation, so the precondition check, the bridge's
//! mutating evaluation, and the balance movement form one atomic sequence:
//! engine-side compliance state and ledger balances commit together or not
//! at all. A transfer rejected by the bridge aborts entirely; the
//! restriction code and message are the sole feedback, and no balance
//! moves.
//!
//! The balance map itself is only locked for the brief read and apply
//! steps, never across the bridge call. Post-evaluation hooks may therefore
//! read the ledger (`balance_of`, `allowance`) mid-transfer; they must not
//! call back into a mutating operation, which would self-deadlock on the
//! operation lock.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tracing::debug;

use trbridge::{Address, RestrictionCode, TokenAdapter, WriteCapability};

/// Errors surfaced by ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Sender holds less than the transfer amount.
    #[error("insufficient balance: {account} holds {available}, needs {required}")]
    InsufficientBalance {
        /// Account short of funds
        account: Address,
        /// Current holding
        available: u64,
        /// Amount required
        required: u64,
    },

    /// Spender's allowance does not cover the transfer amount.
    #[error("insufficient allowance: {spender} may spend {available} of {owner}'s funds, needs {required}")]
    InsufficientAllowance {
        /// Account whose funds are being spent
        owner: Address,
        /// Approved spender
        spender: Address,
        /// Remaining allowance
        available: u64,
        /// Amount required
        required: u64,
    },

    /// The bridge disallowed the transfer. The host transaction aborts
    /// with no partial application.
    #[error("transfer restricted (code {code}): {message}")]
    TransferRestricted {
        /// Restriction classification from the bridge
        code: RestrictionCode,
        /// Human-readable explanation
        message: String,
    },

    /// A balance would overflow its representation.
    #[error("balance overflow for {account}")]
    BalanceOverflow {
        /// Account whose balance would overflow
        account: Address,
    },
}

/// Token balance with guarded arithmetic; never silently wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Balance {
    value: u64,
}

impl Balance {
    /// Creates a balance.
    pub fn new(value: u64) -> Self {
        Self { value }
    }

    /// The balance value.
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Checked addition.
    pub fn checked_add(&self, amount: u64) -> Option<Balance> {
        self.value.checked_add(amount).map(Balance::new)
    }

    /// Checked subtraction.
    pub fn checked_sub(&self, amount: u64) -> Option<Balance> {
        self.value.checked_sub(amount).map(Balance::new)
    }
}

/// Record of one executed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    /// Sending account
    pub from: Address,
    /// Receiving account
    pub to: Address,
    /// Amount moved
    pub amount: u64,
    /// When the transfer executed
    pub timestamp: DateTime<Utc>,
}

/// Host token ledger with bridge-enforced transfers.
pub struct LedgerSDK {
    token_id: String,
    adapter: TokenAdapter,
    write_cap: WriteCapability,
    /// Serializes mint/burn/transfer sequences end to end.
    op_lock: Mutex<()>,
    accounts: Arc<RwLock<HashMap<Address, Balance>>>,
    /// (owner, spender) -> remaining allowance
    allowances: Arc<RwLock<HashMap<(Address, Address), u64>>>,
    records: Arc<RwLock<Vec<TransferRecord>>>,
}

impl LedgerSDK {
    /// Creates an empty ledger bound to its bridge adapter.
    ///
    /// The ledger takes ownership of the adapter's write capability: it is
    /// the one component entitled to execute mutating evaluations.
    pub fn new(token_id: impl Into<String>, adapter: TokenAdapter, write_cap: WriteCapability) -> Self {
        Self {
            token_id: token_id.into(),
            adapter,
            write_cap,
            op_lock: Mutex::new(()),
            accounts: Arc::new(RwLock::new(HashMap::new())),
            allowances: Arc::new(RwLock::new(HashMap::new())),
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// The ledger's token identifier.
    pub fn token_id(&self) -> &str {
        &self.token_id
    }

    /// Current balance of an account (zero when unknown).
    pub fn balance_of(&self, account: &str) -> Balance {
        self.accounts
            .read()
            .get(account)
            .copied()
            .unwrap_or_default()
    }

    /// Creates new tokens on an account.
    pub fn mint(&self, to: &str, amount: u64) -> Result<(), LedgerError> {
        let _op = self.op_lock.lock();
        let mut accounts = self.accounts.write();
        let balance = accounts.get(to).copied().unwrap_or_default();
        let credited = balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::BalanceOverflow {
                account: to.to_string(),
            })?;
        accounts.insert(to.to_string(), credited);
        debug!(token = %self.token_id, account = to, amount, "minted");
        Ok(())
    }

    /// Destroys tokens held by an account.
    ///
    /// A failed burn leaves the account map untouched; in particular it
    /// never materializes an entry for an unknown account.
    pub fn burn(&self, account: &str, amount: u64) -> Result<(), LedgerError> {
        let _op = self.op_lock.lock();
        let mut accounts = self.accounts.write();
        let balance = accounts.get(account).copied().unwrap_or_default();
        let debited = balance
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::InsufficientBalance {
                account: account.to_string(),
                available: balance.value(),
                required: amount,
            })?;
        accounts.insert(account.to_string(), debited);
        debug!(token = %self.token_id, account, amount, "burned");
        Ok(())
    }

    /// Approves `spender` to move up to `amount` of `owner`'s funds.
    pub fn approve(&self, owner: &str, spender: &str, amount: u64) {
        self.allowances
            .write()
            .insert((owner.to_string(), spender.to_string()), amount);
    }

    /// Remaining allowance of `spender` over `owner`'s funds.
    pub fn allowance(&self, owner: &str, spender: &str) -> u64 {
        self.allowances
            .read()
            .get(&(owner.to_string(), spender.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Read-only admissibility query: balance precondition plus the
    /// bridge's read-only evaluation. Never consumes compliance state.
    pub fn can_transfer(&self, from: &str, to: &str, amount: u64) -> bool {
        self.balance_of(from).value() >= amount && self.adapter.validate_transfer(from, to, amount)
    }

    /// Executes a transfer, routing it through the bridge's mutating entry
    /// point. Aborts on any non-zero restriction code with no balance
    /// movement.
    pub fn transfer(&self, from: &str, to: &str, amount: u64) -> Result<(), LedgerError> {
        let _op = self.op_lock.lock();
        self.execute(from, to, amount)
    }

    /// Allowance-checked transfer on behalf of `spender`.
    pub fn transfer_from(
        &self,
        spender: &str,
        from: &str,
        to: &str,
        amount: u64,
    ) -> Result<(), LedgerError> {
        let _op = self.op_lock.lock();

        let available = self.allowance(from, spender);
        if available < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner: from.to_string(),
                spender: spender.to_string(),
                available,
                required: amount,
            });
        }

        self.execute(from, to, amount)?;

        self.allowances
            .write()
            .insert((from.to_string(), spender.to_string()), available - amount);
        Ok(())
    }

    /// Records of executed transfers, oldest first.
    pub fn transfer_records(&self) -> Vec<TransferRecord> {
        self.records.read().clone()
    }

    /// Core transfer sequence; the caller holds the operation lock.
    ///
    /// Precondition checks first, bridge evaluation second, balance
    /// movement last. Once the bridge has admitted the transfer nothing
    /// below can fail, and the operation lock keeps any other mutation from
    /// interleaving, so engine-state changes and balances commit as one.
    /// The balance map is not locked across the bridge call; hooks reading
    /// the ledger observe the pre-transfer balances.
    fn execute(&self, from: &str, to: &str, amount: u64) -> Result<(), LedgerError> {
        let (debited, credited) = {
            let accounts = self.accounts.read();
            let from_balance = accounts.get(from).copied().unwrap_or_default();
            let debited =
                from_balance
                    .checked_sub(amount)
                    .ok_or_else(|| LedgerError::InsufficientBalance {
                        account: from.to_string(),
                        available: from_balance.value(),
                        required: amount,
                    })?;
            // A self-transfer credits the already-debited balance, leaving
            // the account exactly where it started.
            let to_balance = if from == to {
                debited
            } else {
                accounts.get(to).copied().unwrap_or_default()
            };
            let credited = to_balance
                .checked_add(amount)
                .ok_or_else(|| LedgerError::BalanceOverflow {
                    account: to.to_string(),
                })?;
            (debited, credited)
        };

        let code = self
            .adapter
            .operate_on_transfer(&self.write_cap, from, to, amount);
        if !code.is_ok() {
            let message = self.adapter.message_for_transfer_restriction(code);
            debug!(token = %self.token_id, from, to, amount, %code, "transfer restricted");
            return Err(LedgerError::TransferRestricted { code, message });
        }

        {
            let mut accounts = self.accounts.write();
            accounts.insert(from.to_string(), debited);
            accounts.insert(to.to_string(), credited);
        }
        self.records.write().push(TransferRecord {
            from: from.to_string(),
            to: to.to_string(),
            amount,
            timestamp: Utc::now(),
        });
        debug!(token = %self.token_id, from, to, amount, "transfer executed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicU64, Ordering},
        OnceLock,
    };

    use super::*;
    use trbridge::{
        engine::memory::{
            CumulativeLimitPolicy, EvaluationHook, MaxAmountPolicy, MemoryPolicyEngine,
        },
        CallPayload, RestrictionRegistry, ValidatorIdentity, OP_TRANSFER_FROM,
    };

    fn engine_and_identity() -> (Arc<MemoryPolicyEngine>, ValidatorIdentity) {
        (
            Arc::new(MemoryPolicyEngine::new()),
            ValidatorIdentity::new("ledger-adapter"),
        )
    }

    fn ledger(engine: Arc<MemoryPolicyEngine>, identity: ValidatorIdentity) -> LedgerSDK {
        let registry = Arc::new(RestrictionRegistry::new("admin"));
        let (adapter, cap) = TokenAdapter::bind("TKN", identity, engine, registry);
        LedgerSDK::new("TKN", adapter, cap)
    }

    #[test]
    fn unrestricted_transfer_moves_balances() {
        let (engine, identity) = engine_and_identity();
        let ledger = ledger(engine, identity);
        ledger.mint("alice", 1_000).expect("mint");

        ledger.transfer("alice", "bob", 250).expect("transfer");
        assert_eq!(ledger.balance_of("alice").value(), 750);
        assert_eq!(ledger.balance_of("bob").value(), 250);

        let records = ledger.transfer_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount, 250);
    }

    #[test]
    fn self_transfer_conserves_balance() {
        let (engine, identity) = engine_and_identity();
        let ledger = ledger(engine, identity);
        ledger.mint("alice", 100).expect("mint");

        ledger.transfer("alice", "alice", 50).expect("self-transfer");
        assert_eq!(
            ledger.balance_of("alice").value(),
            100,
            "a self-transfer must not change the account's balance"
        );
        assert_eq!(ledger.transfer_records().len(), 1);

        // The balance precondition still applies to the full amount.
        assert!(matches!(
            ledger.transfer("alice", "alice", 150),
            Err(LedgerError::InsufficientBalance { .. })
        ));
        assert_eq!(ledger.balance_of("alice").value(), 100);
    }

    #[test]
    fn restricted_transfer_aborts_with_no_side_effects() {
        let (engine, identity) = engine_and_identity();
        engine.register_policy(
            &identity,
            OP_TRANSFER_FROM,
            Arc::new(MaxAmountPolicy::new("per-transfer", 100)),
        );
        let ledger = ledger(engine, identity);
        ledger.mint("alice", 1_000).expect("mint");

        let result = ledger.transfer("alice", "bob", 500);
        match result {
            Err(LedgerError::TransferRestricted { code, .. }) => {
                assert_eq!(code, RestrictionCode::POLICY_REJECTED);
            }
            other => panic!("expected TransferRestricted, got {other:?}"),
        }
        assert_eq!(ledger.balance_of("alice").value(), 1_000);
        assert_eq!(ledger.balance_of("bob").value(), 0);
        assert!(ledger.transfer_records().is_empty());
    }

    #[test]
    fn insufficient_balance_never_reaches_the_bridge() {
        let (engine, identity) = engine_and_identity();
        let cumulative = Arc::new(CumulativeLimitPolicy::new("cap", 1_000));
        engine.register_policy(&identity, OP_TRANSFER_FROM, cumulative.clone());
        let ledger = ledger(engine, identity);
        ledger.mint("alice", 10).expect("mint");

        assert!(matches!(
            ledger.transfer("alice", "bob", 50),
            Err(LedgerError::InsufficientBalance { .. })
        ));
        assert_eq!(
            cumulative.usage(),
            0,
            "a transfer that fails its preconditions must not consume compliance state"
        );
    }

    #[test]
    fn compliance_state_and_balances_commit_together() {
        let (engine, identity) = engine_and_identity();
        let cumulative = Arc::new(CumulativeLimitPolicy::new("cap", 300));
        engine.register_policy(&identity, OP_TRANSFER_FROM, cumulative.clone());
        let ledger = ledger(engine, identity);
        ledger.mint("alice", 1_000).expect("mint");

        for _ in 0..3 {
            assert!(ledger.can_transfer("alice", "bob", 100));
            ledger.transfer("alice", "bob", 100).expect("within cap");
        }
        assert_eq!(cumulative.usage(), 300);
        assert_eq!(ledger.balance_of("bob").value(), 300);

        // Fourth transfer exceeds the cap: both stores stay put.
        assert!(ledger.transfer("alice", "bob", 100).is_err());
        assert_eq!(cumulative.usage(), 300);
        assert_eq!(ledger.balance_of("bob").value(), 300);
    }

    #[test]
    fn read_only_queries_consume_nothing() {
        let (engine, identity) = engine_and_identity();
        let cumulative = Arc::new(CumulativeLimitPolicy::new("cap", 100));
        engine.register_policy(&identity, OP_TRANSFER_FROM, cumulative.clone());
        let ledger = ledger(engine, identity);
        ledger.mint("alice", 1_000).expect("mint");

        for _ in 0..5 {
            assert!(ledger.can_transfer("alice", "bob", 100));
        }
        assert_eq!(cumulative.usage(), 0);
    }

    /// Hook that reads a ledger balance from inside the engine's
    /// post-evaluation window.
    struct BalanceReadingHook {
        ledger: OnceLock<Arc<LedgerSDK>>,
        seen: AtomicU64,
    }

    impl EvaluationHook for BalanceReadingHook {
        fn after_run(&self, _identity: &ValidatorIdentity, _payload: &CallPayload) {
            if let Some(ledger) = self.ledger.get() {
                self.seen
                    .store(ledger.balance_of("alice").value(), Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn hooks_may_read_the_ledger_mid_transfer() {
        let (engine, identity) = engine_and_identity();
        let hook = Arc::new(BalanceReadingHook {
            ledger: OnceLock::new(),
            seen: AtomicU64::new(u64::MAX),
        });
        engine.add_hook(hook.clone());

        let ledger = Arc::new(ledger(engine, identity));
        hook.ledger.set(ledger.clone()).ok().expect("hook wired once");

        ledger.mint("alice", 1_000).expect("mint");
        ledger.transfer("alice", "bob", 100).expect("transfer");

        // The hook ran before the balance movement landed and completed
        // without blocking on the ledger.
        assert_eq!(hook.seen.load(Ordering::SeqCst), 1_000);
        assert_eq!(ledger.balance_of("alice").value(), 900);
        assert_eq!(ledger.balance_of("bob").value(), 100);
    }

    #[test]
    fn allowance_gates_transfer_from() {
        let (engine, identity) = engine_and_identity();
        let ledger = ledger(engine, identity);
        ledger.mint("alice", 500).expect("mint");
        ledger.approve("alice", "carol", 200);

        assert!(matches!(
            ledger.transfer_from("carol", "alice", "bob", 300),
            Err(LedgerError::InsufficientAllowance { .. })
        ));

        ledger
            .transfer_from("carol", "alice", "bob", 150)
            .expect("within allowance");
        assert_eq!(ledger.allowance("alice", "carol"), 50);
        assert_eq!(ledger.balance_of("bob").value(), 150);
    }

    #[test]
    fn burn_requires_sufficient_balance() {
        let (engine, identity) = engine_and_identity();
        let ledger = ledger(engine, identity);
        ledger.mint("alice", 100).expect("mint");
        ledger.burn("alice", 40).expect("burn");
        assert_eq!(ledger.balance_of("alice").value(), 60);
        assert!(ledger.burn("alice", 100).is_err());
    }

    #[test]
    fn failed_burn_leaves_no_account_entry() {
        let (engine, identity) = engine_and_identity();
        let ledger = ledger(engine, identity);

        assert!(matches!(
            ledger.burn("ghost", 5),
            Err(LedgerError::InsufficientBalance { .. })
        ));
        assert!(
            !ledger.accounts.read().contains_key("ghost"),
            "a failed burn must not materialize an account entry"
        );
    }
}
