//! Cross-component integration tests for the token core.
//!
//! These drive full operation sequences through `TokenCore` the way the
//! surrounding runtime would, checking the conservation, compliance and
//! idempotence properties that individual crate tests cover in isolation.

use std::sync::Arc;

use ipcoin::{AuditEvent, CoreConfig, CoreError, ReserveCustody, TokenCore};
use lib_compliance::{DenialReason, FlagKind, TransferDecision};
use lib_ledger::LedgerError;
use lib_patents::PatentError;
use lib_revenue::{RevenueError, RevenueVault, VaultError};
use lib_types::{Address, Amount, Role, RoleRegistry, RATIO_SCALE, SECONDS_PER_DAY, TOKEN_SCALE};

// =============================================================================
// Helpers
// =============================================================================

fn operator() -> Address {
    Address::new([9u8; 32])
}

fn addr(n: u8) -> Address {
    Address::new([n; 32])
}

fn revenue_token() -> Address {
    Address::new([77u8; 32])
}

fn full_roles() -> RoleRegistry {
    let mut roles = RoleRegistry::new();
    for role in Role::ALL {
        roles.grant(*role, operator());
    }
    roles
}

fn new_core() -> TokenCore {
    init_tracing();
    TokenCore::new(CoreConfig::default(), Arc::new(full_roles())).unwrap()
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// Custody double covering both revenue and reserve payouts
#[derive(Default)]
struct MemoryVault {
    revenue_payouts: Vec<(Address, Address, Amount)>,
    reserve_payouts: Vec<(String, Address, u128)>,
}

impl RevenueVault for MemoryVault {
    fn payout(&mut self, token: &Address, to: &Address, amount: Amount) -> Result<(), VaultError> {
        self.revenue_payouts.push((*token, *to, amount));
        Ok(())
    }
}

impl ReserveCustody for MemoryVault {
    fn payout_reserve(
        &mut self,
        asset_ref: &str,
        to: &Address,
        value_usd: u128,
    ) -> Result<(), VaultError> {
        self.reserve_payouts
            .push((asset_ref.to_string(), *to, value_usd));
        Ok(())
    }
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn full_lifecycle_mint_distribute_claim() {
    let mut core = new_core();
    let mut vault = MemoryVault::default();
    let (alice, bob) = (addr(1), addr(2));
    let now = 1_000;

    core.mint(operator(), alice, 75 * TOKEN_SCALE, now).unwrap();
    core.mint(operator(), bob, 25 * TOKEN_SCALE, now).unwrap();
    assert_eq!(core.total_supply(), 100 * TOKEN_SCALE);

    core.add_patent(
        operator(),
        "US10123456B2",
        "Delivery system",
        vec!["A. Researcher".to_string()],
        25_000_000,
        3_000,
        "bafk-metadata",
        now,
    )
    .unwrap();

    let round_id = core
        .distribute_revenue(operator(), 1_000 * TOKEN_SCALE, revenue_token(), now)
        .unwrap();
    assert_eq!(round_id, 1);

    // Pro-rata: bob holds 25 of the 100 snapshot -> 250.
    let paid = core.claim_revenue(bob, round_id, &mut vault, now).unwrap();
    assert_eq!(paid, 250 * TOKEN_SCALE);
    assert_eq!(
        vault.revenue_payouts,
        vec![(revenue_token(), bob, 250 * TOKEN_SCALE)]
    );

    let info = core.revenue_info(&bob);
    assert_eq!(info.current_round, 1);
    assert!(info.has_claimed);
    assert_eq!(info.claimable, 0);

    let stats = core.patent_stats();
    assert_eq!(stats.patent_count, 1);
    assert_eq!(stats.active_patents, 1);
    assert_eq!(stats.total_valuation_usd, 25_000_000);

    assert!(core.ledger().verify_conservation());
}

// =============================================================================
// Compliance composition
// =============================================================================

#[test]
fn compliance_priority_over_flag_combinations() {
    let mut core = new_core();
    let (alice, bob) = (addr(1), addr(2));
    let now = 1_000;

    core.mint(operator(), alice, 100, now).unwrap();

    // Whitelist mode on, both sides whitelisted: allowed.
    core.set_whitelist_enabled(operator(), true, now).unwrap();
    core.batch_set_flag(operator(), &[alice, bob], FlagKind::Whitelisted, true, now)
        .unwrap();
    assert!(core.authorize_transfer(&alice, &bob).is_allowed());

    // Freeze bob: freeze dominates whitelist on either side.
    core.set_flag(operator(), bob, FlagKind::Frozen, true, now)
        .unwrap();
    assert_eq!(
        core.authorize_transfer(&alice, &bob),
        TransferDecision::Denied(DenialReason::Frozen)
    );

    // Blacklist bob as well: blacklist dominates freeze.
    core.set_flag(operator(), bob, FlagKind::Blacklisted, true, now)
        .unwrap();
    assert_eq!(
        core.authorize_transfer(&alice, &bob),
        TransferDecision::Denied(DenialReason::Blacklisted)
    );

    // Pause: dominates everything, even a fully whitelisted pair.
    core.set_paused(operator(), true, now).unwrap();
    assert_eq!(
        core.authorize_transfer(&alice, &alice),
        TransferDecision::Denied(DenialReason::Paused)
    );

    // The ledger surfaces the same reason on an actual transfer attempt.
    let result = core.transfer(alice, bob, 10, now);
    assert!(matches!(
        result,
        Err(CoreError::Ledger(LedgerError::TransferDenied(
            DenialReason::Paused
        )))
    ));

    // Unpause: blacklist is next in line.
    core.set_paused(operator(), false, now).unwrap();
    let result = core.transfer(alice, bob, 10, now);
    assert!(matches!(
        result,
        Err(CoreError::Ledger(LedgerError::TransferDenied(
            DenialReason::Blacklisted
        )))
    ));
}

// =============================================================================
// Conservation under random sequences
// =============================================================================

#[test]
fn conservation_holds_under_random_operations() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut core = new_core();
    let mut rng = StdRng::seed_from_u64(42);
    let accounts: Vec<Address> = (1..=8u8).map(addr).collect();
    let max_supply = core.ledger().max_supply();

    for step in 0..400u64 {
        let now = 1_000 + step * 600;
        let a = accounts[rng.gen_range(0..accounts.len())];
        let b = accounts[rng.gen_range(0..accounts.len())];
        let amount = rng.gen_range(1..=5 * TOKEN_SCALE);

        // Any of these may fail (limits, balances); conservation must hold
        // regardless of which path was taken.
        match rng.gen_range(0..3u8) {
            0 => {
                let _ = core.mint(operator(), a, amount, now);
            }
            1 => {
                let _ = core.burn(operator(), a, amount, now);
            }
            _ => {
                let _ = core.transfer(a, b, amount, now);
            }
        }

        assert!(core.ledger().verify_conservation(), "step {}", step);
        assert!(core.total_supply() <= max_supply);
    }
}

// =============================================================================
// Daily limits
// =============================================================================

#[test]
fn daily_mint_limit_is_exact_and_resets() {
    let mut core = new_core();
    let alice = addr(1);
    let day_n = 20 * SECONDS_PER_DAY;

    core.set_daily_limits(operator(), 1_000, 1_000, day_n).unwrap();

    // Exactly the ceiling succeeds.
    core.mint(operator(), alice, 1_000, day_n).unwrap();

    // One more unit the same day fails.
    let result = core.mint(operator(), alice, 1, day_n + 3_600);
    assert!(matches!(
        result,
        Err(CoreError::Ledger(LedgerError::ExceedsDailyMintLimit { .. }))
    ));

    // The next day starts fresh.
    core.mint(operator(), alice, 1, day_n + SECONDS_PER_DAY)
        .unwrap();
    assert_eq!(core.total_supply(), 1_001);
}

// =============================================================================
// Revenue semantics
// =============================================================================

#[test]
fn claim_basis_is_balance_at_claim_time() {
    let mut core = new_core();
    let mut vault = MemoryVault::default();
    let (alice, carol) = (addr(1), addr(3));
    let now = 1_000;

    core.mint(operator(), alice, 100 * TOKEN_SCALE, now).unwrap();
    let round_id = core
        .distribute_revenue(operator(), 500 * TOKEN_SCALE, revenue_token(), now)
        .unwrap();

    // Alice sells everything after the round is created.
    core.transfer(alice, carol, 100 * TOKEN_SCALE, now).unwrap();

    // Carol, who held nothing at distribution time, claims the full share.
    let paid = core.claim_revenue(carol, round_id, &mut vault, now).unwrap();
    assert_eq!(paid, 500 * TOKEN_SCALE);

    // Alice, who held everything at distribution time, has nothing.
    let result = core.claim_revenue(alice, round_id, &mut vault, now);
    assert!(matches!(
        result,
        Err(CoreError::Revenue(RevenueError::NothingToClaim { .. }))
    ));
}

#[test]
fn rounds_are_immutable_and_claims_idempotent() {
    let mut core = new_core();
    let mut vault = MemoryVault::default();
    let alice = addr(1);
    let now = 1_000;

    core.mint(operator(), alice, 10 * TOKEN_SCALE, now).unwrap();
    let first = core
        .distribute_revenue(operator(), 100 * TOKEN_SCALE, revenue_token(), now)
        .unwrap();
    let snapshot = core.revenue().round(first).unwrap().clone();

    // Later rounds leave earlier rounds untouched.
    core.mint(operator(), addr(2), 30 * TOKEN_SCALE, now).unwrap();
    core.distribute_revenue(operator(), 7 * TOKEN_SCALE, revenue_token(), now + 50)
        .unwrap();
    assert_eq!(core.revenue().round(first), Some(&snapshot));

    // First claim pays, second fails, funds move exactly once.
    core.claim_revenue(alice, first, &mut vault, now).unwrap();
    let result = core.claim_revenue(alice, first, &mut vault, now);
    assert!(matches!(
        result,
        Err(CoreError::Revenue(RevenueError::AlreadyClaimed { .. }))
    ));
    assert_eq!(vault.revenue_payouts.len(), 1);
}

#[test]
fn claim_many_reports_each_round() {
    let mut core = new_core();
    let mut vault = MemoryVault::default();
    let alice = addr(1);
    let now = 1_000;

    core.mint(operator(), alice, 10 * TOKEN_SCALE, now).unwrap();
    let r1 = core
        .distribute_revenue(operator(), 40 * TOKEN_SCALE, revenue_token(), now)
        .unwrap();
    let r2 = core
        .distribute_revenue(operator(), 60 * TOKEN_SCALE, revenue_token(), now)
        .unwrap();

    let results = core.claim_many_revenue(alice, &[r1, r2, 99], &mut vault, now);
    assert!(matches!(results[0], (id, Ok(_)) if id == r1));
    assert!(matches!(results[1], (id, Ok(_)) if id == r2));
    assert!(matches!(
        results[2],
        (99, Err(CoreError::Revenue(RevenueError::RoundNotFound(99))))
    ));
    assert_eq!(vault.revenue_payouts.len(), 2);
}

#[test]
fn distribute_requires_supply_and_role() {
    let mut core = new_core();
    let now = 1_000;

    let result = core.distribute_revenue(operator(), 100, revenue_token(), now);
    assert!(matches!(
        result,
        Err(CoreError::Revenue(RevenueError::ZeroSupply))
    ));

    core.mint(operator(), addr(1), 100, now).unwrap();
    let result = core.distribute_revenue(addr(1), 100, revenue_token(), now);
    assert!(matches!(
        result,
        Err(CoreError::Revenue(RevenueError::Unauthorized { .. }))
    ));
}

// =============================================================================
// Backing ratio
// =============================================================================

#[test]
fn backing_ratio_reporting() {
    let mut core = new_core();
    let now = 1_000;

    // No supply: ratio is zero, no division by zero.
    core.set_reserve(operator(), "bond-a", 1, 500, now).unwrap();
    assert_eq!(core.backing_ratio(), 0);

    // 500 USD over 500 whole tokens: exactly 1.0.
    core.mint(operator(), addr(1), 500 * TOKEN_SCALE, now).unwrap();
    assert_eq!(core.backing_ratio(), RATIO_SCALE);

    let stats = core.patent_stats();
    assert_eq!(stats.total_reserve_value_usd, 500);
    assert_eq!(stats.backing_ratio, RATIO_SCALE);
}

// =============================================================================
// Patents
// =============================================================================

#[test]
fn deactivated_patents_leave_valuation_and_block_reuse() {
    let mut core = new_core();
    let now = 1_000;

    core.add_patent(operator(), "US1", "A", vec![], 100, 1_000, "r1", now)
        .unwrap();
    core.add_patent(operator(), "US2", "B", vec![], 50, 1_000, "r2", now)
        .unwrap();
    assert_eq!(core.patents().total_valuation(), 150);

    core.deactivate_patent(operator(), "US1", now).unwrap();
    assert_eq!(core.patents().total_valuation(), 50);

    let result = core.add_patent(operator(), "US1", "A2", vec![], 1, 1, "r3", now);
    assert!(matches!(
        result,
        Err(CoreError::Patent(PatentError::DuplicateAsset(_)))
    ));
}

// =============================================================================
// Redemption
// =============================================================================

#[test]
fn redemption_lifecycle() {
    let mut core = new_core();
    let mut vault = MemoryVault::default();
    let alice = addr(1);
    let now = 1_000;

    core.mint(operator(), alice, 100 * TOKEN_SCALE, now).unwrap();
    core.set_reserve(operator(), "bond-a", 1, 500, now).unwrap();

    let id = core
        .request_redemption(alice, 50 * TOKEN_SCALE, "bond-a", now)
        .unwrap();
    assert_eq!(core.redemptions().pending_ids(), vec![id]);

    // Settlement burns the tokens and pays the pro-rata reserve value:
    // 50 of 100 tokens against 500 USD -> 250 USD.
    let value = core
        .settle_redemption(operator(), id, &mut vault, now)
        .unwrap();
    assert_eq!(value, 250);
    assert_eq!(
        vault.reserve_payouts,
        vec![("bond-a".to_string(), alice, 250)]
    );
    assert_eq!(core.balance_of(&alice), 50 * TOKEN_SCALE);
    assert_eq!(core.total_supply(), 50 * TOKEN_SCALE);
    assert!(core.ledger().verify_conservation());

    // A settled request cannot settle again.
    let result = core.settle_redemption(operator(), id, &mut vault, now);
    assert!(matches!(result, Err(CoreError::Redemption(_))));
}

#[test]
fn redemption_requires_reserve_balance_and_compliance() {
    let mut core = new_core();
    let alice = addr(1);
    let now = 1_000;

    core.mint(operator(), alice, 10, now).unwrap();

    // Unknown reserve instrument.
    let result = core.request_redemption(alice, 5, "bond-x", now);
    assert!(matches!(
        result,
        Err(CoreError::Patent(PatentError::AssetNotFound(_)))
    ));

    core.set_reserve(operator(), "bond-a", 1, 100, now).unwrap();

    // More than the balance.
    let result = core.request_redemption(alice, 11, "bond-a", now);
    assert!(matches!(
        result,
        Err(CoreError::Ledger(LedgerError::InsufficientBalance { .. }))
    ));

    // Paused blocks new requests.
    core.set_paused(operator(), true, now).unwrap();
    let result = core.request_redemption(alice, 5, "bond-a", now);
    assert!(matches!(
        result,
        Err(CoreError::Ledger(LedgerError::TransferDenied(
            DenialReason::Paused
        )))
    ));
}

#[test]
fn redemption_settlement_is_role_gated_and_cancellable() {
    let mut core = new_core();
    let mut vault = MemoryVault::default();
    let (alice, mallory) = (addr(1), addr(4));
    let now = 1_000;

    core.mint(operator(), alice, 100, now).unwrap();
    core.set_reserve(operator(), "bond-a", 1, 100, now).unwrap();
    let id = core.request_redemption(alice, 50, "bond-a", now).unwrap();

    let result = core.settle_redemption(mallory, id, &mut vault, now);
    assert!(matches!(result, Err(CoreError::Unauthorized { .. })));

    // A stranger cannot cancel, the requester can.
    let result = core.cancel_redemption(mallory, id, now);
    assert!(matches!(result, Err(CoreError::Unauthorized { .. })));
    core.cancel_redemption(alice, id, now).unwrap();

    // Cancelled requests cannot settle.
    let result = core.settle_redemption(operator(), id, &mut vault, now);
    assert!(matches!(result, Err(CoreError::Redemption(_))));
    assert_eq!(core.balance_of(&alice), 100);
}

// =============================================================================
// Shared handle
// =============================================================================

#[test]
fn shared_core_serializes_mutations() {
    let shared = ipcoin::SharedCore::new(new_core());
    let now = ipcoin::system_now();

    shared
        .write(|core| core.mint(operator(), addr(1), 10, now))
        .unwrap();

    let balance = shared.read(|core| core.balance_of(&addr(1)));
    assert_eq!(balance, 10);

    // Clones share the same underlying state.
    let other = shared.clone();
    assert_eq!(other.read(|core| core.total_supply()), 10);
}

// =============================================================================
// Audit log
// =============================================================================

#[test]
fn every_mutation_appends_one_audit_record() {
    let mut core = new_core();
    let mut vault = MemoryVault::default();
    let alice = addr(1);
    let now = 1_000;

    core.mint(operator(), alice, 100 * TOKEN_SCALE, now).unwrap();
    core.set_flag(operator(), addr(2), FlagKind::Frozen, true, now)
        .unwrap();
    core.transfer(alice, addr(3), TOKEN_SCALE, now).unwrap();
    let round_id = core
        .distribute_revenue(operator(), TOKEN_SCALE, revenue_token(), now)
        .unwrap();
    core.claim_revenue(alice, round_id, &mut vault, now).unwrap();

    assert_eq!(core.audit().len(), 5);

    // Failed operations leave no record.
    let _ = core.mint(addr(5), alice, 1, now);
    assert_eq!(core.audit().len(), 5);

    let seqs: Vec<u64> = core.audit().iter().map(|r| r.seq).collect();
    assert_eq!(seqs, vec![0, 1, 2, 3, 4]);

    match &core.audit().latest().unwrap().event {
        AuditEvent::RevenueClaimed { round_id: r, .. } => assert_eq!(*r, round_id),
        other => panic!("unexpected event {:?}", other),
    }
}

// =============================================================================
// Roles
// =============================================================================

#[test]
fn every_admin_surface_is_role_gated() {
    let mut core = new_core();
    let nobody = addr(6);
    let now = 1_000;

    assert!(core.mint(nobody, nobody, 1, now).is_err());
    assert!(core.burn(nobody, nobody, 1, now).is_err());
    assert!(core.set_paused(nobody, true, now).is_err());
    assert!(core.set_whitelist_enabled(nobody, true, now).is_err());
    assert!(core
        .set_flag(nobody, nobody, FlagKind::Blacklisted, true, now)
        .is_err());
    assert!(core.set_daily_limits(nobody, 1, 1, now).is_err());
    assert!(core
        .add_patent(nobody, "US1", "t", vec![], 1, 1, "r", now)
        .is_err());
    assert!(core.set_reserve(nobody, "bond-a", 1, 1, now).is_err());
    assert!(core
        .distribute_revenue(nobody, 1, revenue_token(), now)
        .is_err());

    // Nothing happened.
    assert_eq!(core.total_supply(), 0);
    assert!(core.audit().is_empty());
}
