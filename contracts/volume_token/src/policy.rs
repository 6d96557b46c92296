//! Transfer policy: per-account flags, the Policy Gate and the Fee Engine.
//!
//! Nothing in here touches storage. The ledger reads balances, flags and
//! timestamps, hands them to [`evaluate_gate`] and [`fee_for`], and only
//! writes once both have answered.
//!
//! ```text
//!   transfer ──► zero-address ──► evaluate_gate ──► fee_for ──► balance check ──► commit
//!                                   │                  │
//!                    paused / blacklist / caps    Buy  (from == pool) → buy_fee_bps
//!                    anti-dump window             Sell (to   == pool) → sell_fee_bps
//!                                                 Peer                → 0
//! ```

use ink::primitives::AccountId;

use crate::constants::*;
use crate::{Balance, Error, Result, Timestamp};

// =============================================================================
// ACCOUNT FLAGS
// =============================================================================

/// A single per-account capability, as named in `FlagsUpdated` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub enum AccountFlag {
    FeeExempt,
    MaxTxExempt,
    MaxWalletExempt,
    AntiDumpExempt,
    Blacklisted,
}

bitflags::bitflags! {
    /// Every flag an address can hold, stored as its `bits()` byte.
    ///
    /// Absent storage entries read as `empty()`, so "does this address
    /// bypass policy X" is a single lookup.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AccountFlags: u8 {
        /// Skips the Fee Engine when either side of a transfer carries it.
        const FEE_EXEMPT = 0b0000_0001;
        /// Skips the max-transaction cap when either side carries it.
        const MAX_TX_EXEMPT = 0b0000_0010;
        /// Skips the max-wallet cap when the recipient carries it.
        const MAX_WALLET_EXEMPT = 0b0000_0100;
        /// Skips the holding window on sells and is never timestamped on buys.
        const ANTI_DUMP_EXEMPT = 0b0000_1000;
        /// Rejects every transfer touching the account.
        const BLACKLISTED = 0b0001_0000;

        /// All four exemptions, blacklist clear.
        const ALL_EXEMPTIONS = Self::FEE_EXEMPT.bits()
            | Self::MAX_TX_EXEMPT.bits()
            | Self::MAX_WALLET_EXEMPT.bits()
            | Self::ANTI_DUMP_EXEMPT.bits();
    }
}

impl From<AccountFlag> for AccountFlags {
    fn from(flag: AccountFlag) -> Self {
        match flag {
            AccountFlag::FeeExempt => AccountFlags::FEE_EXEMPT,
            AccountFlag::MaxTxExempt => AccountFlags::MAX_TX_EXEMPT,
            AccountFlag::MaxWalletExempt => AccountFlags::MAX_WALLET_EXEMPT,
            AccountFlag::AntiDumpExempt => AccountFlags::ANTI_DUMP_EXEMPT,
            AccountFlag::Blacklisted => AccountFlags::BLACKLISTED,
        }
    }
}

// =============================================================================
// POLICY CONFIG
// =============================================================================

/// Runtime-mutable policy parameters, owned by one ledger instance.
#[derive(Debug, Clone, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct PolicyConfig {
    pub paused: bool,
    pub fees_enabled: bool,
    pub anti_whale_enabled: bool,
    /// Fee on transfers out of the pool, in BPS of `FEE_DENOMINATOR`.
    pub buy_fee_bps: u128,
    /// Fee on transfers into the pool, in BPS of `FEE_DENOMINATOR`.
    pub sell_fee_bps: u128,
    pub max_tx_amount: Balance,
    pub max_wallet_amount: Balance,
    /// Percent of collected fees earmarked for liquidity.
    pub lp_fee_share: u8,
    /// Percent of collected fees earmarked for the marketing multisig.
    pub marketing_fee_share: u8,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            paused: false,
            fees_enabled: true,
            anti_whale_enabled: true,
            buy_fee_bps: DEFAULT_BUY_FEE_BPS,
            sell_fee_bps: DEFAULT_SELL_FEE_BPS,
            max_tx_amount: DEFAULT_MAX_TX_AMOUNT,
            max_wallet_amount: DEFAULT_MAX_WALLET_AMOUNT,
            lp_fee_share: DEFAULT_LP_FEE_SHARE,
            marketing_fee_share: DEFAULT_MARKETING_FEE_SHARE,
        }
    }
}

impl PolicyConfig {
    pub fn validate_fee(bps: u128) -> Result<u128> {
        if bps > MAX_FEE_BPS {
            return Err(Error::InvalidParameter);
        }
        Ok(bps)
    }

    pub fn validate_max_tx(amount: Balance) -> Result<Balance> {
        if amount < MIN_MAX_TX_AMOUNT {
            return Err(Error::InvalidParameter);
        }
        Ok(amount)
    }

    pub fn validate_max_wallet(amount: Balance) -> Result<Balance> {
        if amount < MIN_MAX_WALLET_AMOUNT {
            return Err(Error::InvalidParameter);
        }
        Ok(amount)
    }

    pub fn validate_fee_shares(lp: u8, marketing: u8) -> Result<(u8, u8)> {
        if u16::from(lp) + u16::from(marketing) != 100 {
            return Err(Error::InvalidParameter);
        }
        Ok((lp, marketing))
    }
}

// =============================================================================
// POLICY GATE
// =============================================================================

/// Snapshot of everything the gate looks at for one transfer.
#[derive(Debug, Clone, Copy)]
pub struct TransferContext {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: Balance,
    pub from_flags: AccountFlags,
    pub to_flags: AccountFlags,
    /// Recipient balance before the transfer.
    pub to_balance: Balance,
    /// Sender's last acquisition from the pool, if any.
    pub last_acquisition: Option<Timestamp>,
    pub pool: Option<AccountId>,
    pub now: Timestamp,
}

/// What the ledger must do once the transfer commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateOutcome {
    /// Stamp `last_acquisition(to) = now`.
    pub record_acquisition: bool,
}

/// `true` once the anti-dump window has passed since `last_acquisition`.
/// Accounts that never bought from the pool are never held.
pub fn holding_period_elapsed(last_acquisition: Option<Timestamp>, now: Timestamp) -> bool {
    match last_acquisition {
        None => true,
        Some(at) => now.saturating_sub(at) >= ANTI_DUMP_DURATION,
    }
}

/// Runs the checks in order, failing on the first violation.
///
/// 1. paused                      → [`Error::TransfersPaused`]
/// 2. either side blacklisted     → [`Error::AddressBlacklisted`]
/// 3. amount over max-tx          → [`Error::ExceedsMaxTransaction`]
/// 4. recipient over max-wallet   → [`Error::ExceedsMaxWallet`]
/// 5. sell inside holding window  → [`Error::HoldingPeriodNotElapsed`]
pub fn evaluate_gate(config: &PolicyConfig, ctx: &TransferContext) -> Result<GateOutcome> {
    if config.paused {
        return Err(Error::TransfersPaused);
    }

    if ctx.from_flags.contains(AccountFlags::BLACKLISTED)
        || ctx.to_flags.contains(AccountFlags::BLACKLISTED)
    {
        return Err(Error::AddressBlacklisted);
    }

    if config.anti_whale_enabled
        && !ctx.from_flags.contains(AccountFlags::MAX_TX_EXEMPT)
        && !ctx.to_flags.contains(AccountFlags::MAX_TX_EXEMPT)
        && ctx.amount > config.max_tx_amount
    {
        return Err(Error::ExceedsMaxTransaction);
    }

    if config.anti_whale_enabled && !ctx.to_flags.contains(AccountFlags::MAX_WALLET_EXEMPT) {
        let projected = ctx.to_balance.checked_add(ctx.amount);
        if !matches!(projected, Some(total) if total <= config.max_wallet_amount) {
            return Err(Error::ExceedsMaxWallet);
        }
    }

    let is_sell = ctx.pool == Some(ctx.to);
    if is_sell
        && !ctx.from_flags.contains(AccountFlags::ANTI_DUMP_EXEMPT)
        && !holding_period_elapsed(ctx.last_acquisition, ctx.now)
    {
        return Err(Error::HoldingPeriodNotElapsed);
    }

    let is_buy = ctx.pool == Some(ctx.from);
    Ok(GateOutcome {
        record_acquisition: is_buy && !ctx.to_flags.contains(AccountFlags::ANTI_DUMP_EXEMPT),
    })
}

// =============================================================================
// FEE ENGINE
// =============================================================================

/// Direction of a transfer relative to the liquidity pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Buy,
    Sell,
    Peer,
}

impl Route {
    pub fn classify(from: AccountId, to: AccountId, pool: Option<AccountId>) -> Self {
        match pool {
            Some(pool) if from == pool => Route::Buy,
            Some(pool) if to == pool => Route::Sell,
            _ => Route::Peer,
        }
    }
}

/// Which leg of the pipeline a value movement belongs to.
///
/// Only the `Principal` leg is fee-bearing; the fee leg itself is tagged
/// `FeeSettlement` and can never be charged again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferPhase {
    Principal,
    FeeSettlement,
}

pub fn fee_for(
    config: &PolicyConfig,
    route: Route,
    amount: Balance,
    from_flags: AccountFlags,
    to_flags: AccountFlags,
    phase: TransferPhase,
) -> Result<Balance> {
    let take_fee = config.fees_enabled
        && phase == TransferPhase::Principal
        && !from_flags.contains(AccountFlags::FEE_EXEMPT)
        && !to_flags.contains(AccountFlags::FEE_EXEMPT);
    if !take_fee {
        return Ok(0);
    }

    let bps = match route {
        Route::Buy => config.buy_fee_bps,
        Route::Sell => config.sell_fee_bps,
        Route::Peer => return Ok(0),
    };

    amount
        .checked_mul(bps)
        .ok_or(Error::Overflow)?
        .checked_div(FEE_DENOMINATOR)
        .ok_or(Error::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    const POOL: [u8; 32] = [0xAA; 32];
    const ALICE: [u8; 32] = [0x01; 32];
    const BOB: [u8; 32] = [0x02; 32];

    fn ctx(from: [u8; 32], to: [u8; 32], amount: Balance) -> TransferContext {
        TransferContext {
            from: AccountId::from(from),
            to: AccountId::from(to),
            amount,
            from_flags: AccountFlags::empty(),
            to_flags: AccountFlags::empty(),
            to_balance: 0,
            last_acquisition: None,
            pool: Some(AccountId::from(POOL)),
            now: 1_000_000,
        }
    }

    // ── Flags ─────────────────────────────────────────────────────────────

    #[test]
    fn flags_toggle_independently() {
        let mut flags = AccountFlags::empty();
        flags.set(AccountFlag::FeeExempt.into(), true);
        flags.set(AccountFlag::Blacklisted.into(), true);
        assert!(flags.contains(AccountFlags::FEE_EXEMPT));
        assert!(flags.contains(AccountFlags::BLACKLISTED));
        assert!(!flags.contains(AccountFlags::MAX_TX_EXEMPT));
        assert_eq!(flags.bits(), 0b0001_0001);

        flags.set(AccountFlag::FeeExempt.into(), false);
        assert!(!flags.contains(AccountFlags::FEE_EXEMPT));
        assert!(flags.contains(AccountFlags::BLACKLISTED));
    }

    #[test]
    fn setting_a_flag_twice_is_idempotent() {
        let once = AccountFlags::MAX_WALLET_EXEMPT;
        let mut twice = once;
        twice.set(AccountFlag::MaxWalletExempt.into(), true);
        assert_eq!(once, twice);
    }

    #[test]
    fn stored_byte_keeps_unknown_bits() {
        let stored = AccountFlags::ALL_EXEMPTIONS.bits() | 0b1000_0000;
        let flags = AccountFlags::from_bits_retain(stored);
        assert!(flags.contains(AccountFlags::ALL_EXEMPTIONS));
        assert_eq!(flags.bits(), stored);
    }

    #[test]
    fn all_exemptions_excludes_blacklist() {
        let all = AccountFlags::ALL_EXEMPTIONS;
        assert!(all.contains(AccountFlags::FEE_EXEMPT));
        assert!(all.contains(AccountFlags::MAX_TX_EXEMPT));
        assert!(all.contains(AccountFlags::MAX_WALLET_EXEMPT));
        assert!(all.contains(AccountFlags::ANTI_DUMP_EXEMPT));
        assert!(!all.contains(AccountFlags::BLACKLISTED));
    }

    // ── Config bounds ─────────────────────────────────────────────────────

    #[test]
    fn fee_ceiling_is_inclusive() {
        assert_eq!(PolicyConfig::validate_fee(MAX_FEE_BPS), Ok(MAX_FEE_BPS));
        assert_eq!(
            PolicyConfig::validate_fee(MAX_FEE_BPS + 1),
            Err(Error::InvalidParameter)
        );
    }

    #[test]
    fn cap_floors_are_inclusive() {
        assert!(PolicyConfig::validate_max_tx(MIN_MAX_TX_AMOUNT).is_ok());
        assert_eq!(
            PolicyConfig::validate_max_tx(MIN_MAX_TX_AMOUNT - 1),
            Err(Error::InvalidParameter)
        );
        assert!(PolicyConfig::validate_max_wallet(MIN_MAX_WALLET_AMOUNT).is_ok());
        assert_eq!(
            PolicyConfig::validate_max_wallet(MIN_MAX_WALLET_AMOUNT - 1),
            Err(Error::InvalidParameter)
        );
    }

    #[test]
    fn fee_shares_must_total_100() {
        assert_eq!(PolicyConfig::validate_fee_shares(40, 60), Ok((40, 60)));
        assert_eq!(
            PolicyConfig::validate_fee_shares(50, 60),
            Err(Error::InvalidParameter)
        );
        assert_eq!(
            PolicyConfig::validate_fee_shares(255, 255),
            Err(Error::InvalidParameter)
        );
    }

    // ── Gate ordering ─────────────────────────────────────────────────────

    #[test]
    fn pause_is_checked_before_blacklist() {
        let config = PolicyConfig { paused: true, ..Default::default() };
        let mut c = ctx(ALICE, BOB, 1);
        c.from_flags = AccountFlags::BLACKLISTED;
        assert_eq!(evaluate_gate(&config, &c), Err(Error::TransfersPaused));
    }

    #[test]
    fn blacklisted_recipient_rejected() {
        let mut c = ctx(ALICE, BOB, 1);
        c.to_flags = AccountFlags::BLACKLISTED;
        assert_eq!(
            evaluate_gate(&PolicyConfig::default(), &c),
            Err(Error::AddressBlacklisted)
        );
    }

    #[test]
    fn max_tx_boundary() {
        let config = PolicyConfig::default();
        let at_cap = ctx(ALICE, BOB, config.max_tx_amount);
        assert!(evaluate_gate(&config, &at_cap).is_ok());
        let over = ctx(ALICE, BOB, config.max_tx_amount + 1);
        assert_eq!(evaluate_gate(&config, &over), Err(Error::ExceedsMaxTransaction));
    }

    #[test]
    fn max_tx_exemption_on_either_side() {
        let config = PolicyConfig::default();
        let mut c = ctx(ALICE, BOB, config.max_tx_amount + 1);
        c.from_flags = AccountFlags::MAX_TX_EXEMPT;
        assert!(evaluate_gate(&config, &c).is_ok());

        let mut c = ctx(ALICE, BOB, config.max_tx_amount + 1);
        c.to_flags = AccountFlags::MAX_TX_EXEMPT;
        assert!(evaluate_gate(&config, &c).is_ok());
    }

    #[test]
    fn max_wallet_counts_existing_balance() {
        let config = PolicyConfig::default();
        let mut c = ctx(ALICE, BOB, 1);
        c.to_balance = config.max_wallet_amount;
        assert_eq!(evaluate_gate(&config, &c), Err(Error::ExceedsMaxWallet));

        c.to_flags = AccountFlags::MAX_WALLET_EXEMPT;
        assert!(evaluate_gate(&config, &c).is_ok());
    }

    #[test]
    fn max_wallet_overflow_counts_as_exceeding() {
        let config = PolicyConfig::default();
        let mut c = ctx(ALICE, BOB, 1);
        c.to_balance = Balance::MAX;
        assert_eq!(evaluate_gate(&config, &c), Err(Error::ExceedsMaxWallet));
    }

    #[test]
    fn anti_whale_toggle_disables_both_caps() {
        let config = PolicyConfig { anti_whale_enabled: false, ..Default::default() };
        let mut c = ctx(ALICE, BOB, config.max_tx_amount * 4);
        c.to_balance = config.max_wallet_amount;
        assert!(evaluate_gate(&config, &c).is_ok());
    }

    // ── Anti-dump ─────────────────────────────────────────────────────────

    #[test]
    fn sell_inside_window_rejected() {
        let mut c = ctx(ALICE, POOL, 10);
        c.to_flags = AccountFlags::MAX_WALLET_EXEMPT;
        c.last_acquisition = Some(c.now - ANTI_DUMP_DURATION + 1);
        assert_eq!(
            evaluate_gate(&PolicyConfig::default(), &c),
            Err(Error::HoldingPeriodNotElapsed)
        );

        c.last_acquisition = Some(c.now - ANTI_DUMP_DURATION);
        assert!(evaluate_gate(&PolicyConfig::default(), &c).is_ok());
    }

    #[test]
    fn anti_dump_exempt_seller_passes() {
        let mut c = ctx(ALICE, POOL, 10);
        c.to_flags = AccountFlags::MAX_WALLET_EXEMPT;
        c.from_flags = AccountFlags::ANTI_DUMP_EXEMPT;
        c.last_acquisition = Some(c.now);
        assert!(evaluate_gate(&PolicyConfig::default(), &c).is_ok());
    }

    #[test]
    fn never_bought_is_never_held() {
        assert!(holding_period_elapsed(None, 0));
        assert!(!holding_period_elapsed(Some(0), ANTI_DUMP_DURATION - 1));
        assert!(holding_period_elapsed(Some(0), ANTI_DUMP_DURATION));
    }

    #[test]
    fn buy_records_acquisition_unless_exempt() {
        let c = ctx(POOL, ALICE, 10);
        let outcome = evaluate_gate(&PolicyConfig::default(), &c).unwrap();
        assert!(outcome.record_acquisition);

        let mut c = ctx(POOL, ALICE, 10);
        c.to_flags = AccountFlags::ANTI_DUMP_EXEMPT;
        let outcome = evaluate_gate(&PolicyConfig::default(), &c).unwrap();
        assert!(!outcome.record_acquisition);

        let outcome = evaluate_gate(&PolicyConfig::default(), &ctx(ALICE, BOB, 10)).unwrap();
        assert!(!outcome.record_acquisition);
    }

    // ── Fee Engine ────────────────────────────────────────────────────────

    #[test]
    fn route_classification() {
        let pool = Some(AccountId::from(POOL));
        let a = AccountId::from(ALICE);
        let b = AccountId::from(BOB);
        let p = AccountId::from(POOL);
        assert_eq!(Route::classify(p, a, pool), Route::Buy);
        assert_eq!(Route::classify(a, p, pool), Route::Sell);
        assert_eq!(Route::classify(a, b, pool), Route::Peer);
        assert_eq!(Route::classify(p, a, None), Route::Peer);
    }

    #[test]
    fn buy_and_sell_rates() {
        let config = PolicyConfig::default();
        let none = AccountFlags::empty();
        let principal = TransferPhase::Principal;
        assert_eq!(fee_for(&config, Route::Buy, 1_000, none, none, principal), Ok(20));
        assert_eq!(fee_for(&config, Route::Sell, 1_000, none, none, principal), Ok(40));
        assert_eq!(fee_for(&config, Route::Peer, 1_000, none, none, principal), Ok(0));
    }

    #[test]
    fn fee_truncates_below_one_unit() {
        // 49 × 200 / 10_000 = 0.98 → 0; 50 × 200 / 10_000 = 1
        let config = PolicyConfig::default();
        let none = AccountFlags::empty();
        let principal = TransferPhase::Principal;
        assert_eq!(fee_for(&config, Route::Buy, 49, none, none, principal), Ok(0));
        assert_eq!(fee_for(&config, Route::Buy, 50, none, none, principal), Ok(1));
    }

    #[test]
    fn settlement_leg_never_pays_fee() {
        let config = PolicyConfig::default();
        let none = AccountFlags::empty();
        assert_eq!(
            fee_for(&config, Route::Sell, 1_000, none, none, TransferPhase::FeeSettlement),
            Ok(0)
        );
    }

    #[test]
    fn fee_exemption_and_global_toggle() {
        let exempt = AccountFlags::FEE_EXEMPT;
        let none = AccountFlags::empty();
        let config = PolicyConfig::default();
        let principal = TransferPhase::Principal;
        assert_eq!(fee_for(&config, Route::Buy, 1_000, none, exempt, principal), Ok(0));
        assert_eq!(fee_for(&config, Route::Sell, 1_000, exempt, none, principal), Ok(0));

        let disabled = PolicyConfig { fees_enabled: false, ..Default::default() };
        assert_eq!(fee_for(&disabled, Route::Buy, 1_000, none, none, principal), Ok(0));
    }
}
