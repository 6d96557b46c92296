#![cfg_attr(not(feature = "std"), no_std, no_main)]

pub mod policy;

pub type Balance = u128;
pub type Timestamp = u64;

pub mod constants {
    use crate::{Balance, Timestamp};

    pub const NAME: &str = "VOLUME";
    pub const SYMBOL: &str = "VLM";
    pub const DECIMALS: u8 = 18;

    pub const SCALING_FACTOR: Balance = 1_000_000_000_000_000_000u128;
    pub const TOTAL_SUPPLY: Balance = 50_000_000_000 * SCALING_FACTOR;

    // ── Fees ──────────────────────────────────────────────────────────────
    pub const FEE_DENOMINATOR: u128 = 10_000;
    /// Hard ceiling for either fee: 10%.
    pub const MAX_FEE_BPS: u128 = 1_000;
    pub const DEFAULT_BUY_FEE_BPS: u128 = 200;
    pub const DEFAULT_SELL_FEE_BPS: u128 = 400;
    pub const DEFAULT_LP_FEE_SHARE: u8 = 40;
    pub const DEFAULT_MARKETING_FEE_SHARE: u8 = 60;

    // ── Anti-whale ────────────────────────────────────────────────────────
    pub const DEFAULT_MAX_TX_AMOUNT: Balance = TOTAL_SUPPLY * 5 / 1_000;
    pub const DEFAULT_MAX_WALLET_AMOUNT: Balance = TOTAL_SUPPLY * 10 / 1_000;
    /// Floor for `set_max_tx_amount`: 0.1% of supply.
    pub const MIN_MAX_TX_AMOUNT: Balance = TOTAL_SUPPLY / 1_000;
    /// Floor for `set_max_wallet_amount`: 0.5% of supply.
    pub const MIN_MAX_WALLET_AMOUNT: Balance = TOTAL_SUPPLY * 5 / 1_000;

    // ── Anti-dump ─────────────────────────────────────────────────────────
    /// Five minutes, in block-timestamp milliseconds.
    pub const ANTI_DUMP_DURATION: Timestamp = 5 * 60 * 1_000;

    pub const ZERO_ADDRESS: [u8; 32] = [0u8; 32];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub enum Error {
    /// Sender holds less than the amount moved.
    InsufficientBalance,
    /// Spender's allowance is below the amount moved.
    InsufficientAllowance,
    /// Value movement is suspended.
    TransfersPaused,
    /// Sender or recipient is blacklisted.
    AddressBlacklisted,
    ExceedsMaxTransaction,
    ExceedsMaxWallet,
    /// Sell attempted inside the anti-dump window.
    HoldingPeriodNotElapsed,
    /// Caller is not the contract owner.
    NotOwner,
    /// A setter argument is outside its bounds.
    InvalidParameter,
    ZeroAddress,
    /// An arithmetic operation overflowed.
    Overflow,
    /// A native value transfer failed.
    TransferFailed,
}

pub type Result<T> = core::result::Result<T, Error>;

/// # VOLUME: Policy-Bearing Token Ledger
///
/// **Role:** balances, allowances and total supply, with four policies
/// layered over every value-moving call:
///
/// ```text
///   Fee-on-transfer   BUY  (from == pool)  buy_fee_bps  → contract account
///                     SELL (to   == pool)  sell_fee_bps → contract account
///                     PEER                 never taxed
///   Anti-whale        amount ≤ max_tx, balance(to) + amount ≤ max_wallet
///   Anti-dump         sells held for ANTI_DUMP_DURATION after a buy
///   Emergency         pause, blacklist, per-account exemptions
/// ```
///
/// `approve` is pure metadata: it never reaches the gate, the fee engine
/// or `raw_transfer`, and it stays callable while paused.
///
/// Every fallible check runs before the first storage write, so a rejected
/// call leaves balances, allowances and timestamps exactly as they were.
#[ink::contract]
mod volume_token {
    use crate::constants::*;
    use crate::policy::{
        evaluate_gate, fee_for, holding_period_elapsed, AccountFlag, AccountFlags,
        PolicyConfig, Route, TransferContext, TransferPhase,
    };
    use crate::Error;
    use ink::prelude::string::String;
    use ink::storage::Mapping;

    // =========================================================================
    // STORAGE
    // =========================================================================

    #[ink(storage)]
    pub struct VolumeToken {
        // ── Ledger ────────────────────────────────────────────────────────
        balances: Mapping<AccountId, Balance>,
        allowances: Mapping<(AccountId, AccountId), Balance>,
        total_supply: Balance,

        // ── Policy ────────────────────────────────────────────────────────
        /// Exemptions and blacklist, `AccountFlags::bits()` per account.
        flags: Mapping<AccountId, u8>,
        /// Last time each account received tokens from the pool.
        last_acquisition: Mapping<AccountId, Timestamp>,
        config: PolicyConfig,
        liquidity_pool: Option<AccountId>,
        router: Option<AccountId>,

        // ── Access control ────────────────────────────────────────────────
        owner: AccountId,
        marketing_address: AccountId,
        rewards_address: AccountId,
        timelock_address: AccountId,
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    #[ink(event)]
    pub struct Transfer {
        #[ink(topic)]
        from: Option<AccountId>,
        #[ink(topic)]
        to: Option<AccountId>,
        value: Balance,
    }

    #[ink(event)]
    pub struct Approval {
        #[ink(topic)]
        owner: AccountId,
        #[ink(topic)]
        spender: AccountId,
        value: Balance,
    }

    /// Emitted for every exemption or blacklist change.
    #[ink(event)]
    pub struct FlagsUpdated {
        #[ink(topic)]
        account: AccountId,
        flag: AccountFlag,
        enabled: bool,
    }

    #[ink(event)]
    pub struct Paused {
        by: AccountId,
    }

    #[ink(event)]
    pub struct Unpaused {
        by: AccountId,
    }

    #[ink(event)]
    pub struct OwnershipTransferred {
        #[ink(topic)]
        previous_owner: AccountId,
        #[ink(topic)]
        new_owner: AccountId,
    }

    #[ink(event)]
    pub struct FeesUpdated {
        buy_fee_bps: u128,
        sell_fee_bps: u128,
    }

    #[ink(event)]
    pub struct FeeSharesUpdated {
        lp_fee_share: u8,
        marketing_fee_share: u8,
    }

    #[ink(event)]
    pub struct LimitsUpdated {
        max_tx_amount: Balance,
        max_wallet_amount: Balance,
    }

    #[ink(event)]
    pub struct PolicyTogglesUpdated {
        fees_enabled: bool,
        anti_whale_enabled: bool,
    }

    #[ink(event)]
    pub struct LiquidityPoolUpdated {
        #[ink(topic)]
        pool: AccountId,
    }

    #[ink(event)]
    pub struct RouterUpdated {
        #[ink(topic)]
        router: AccountId,
    }

    #[ink(event)]
    pub struct EmergencyWithdrawal {
        #[ink(topic)]
        to: AccountId,
        amount: Balance,
    }

    // =========================================================================
    // TRANSFER PLAN
    // =========================================================================

    /// A transfer that passed every check and only has writes left.
    struct TransferPlan {
        from: AccountId,
        to: AccountId,
        amount: Balance,
        fee: Balance,
        acquired_at: Option<Timestamp>,
    }

    // =========================================================================
    // IMPLEMENTATION
    // =========================================================================

    impl VolumeToken {
        /// Deploy the ledger and mint `TOTAL_SUPPLY` to the caller.
        ///
        /// The deployer, the contract account, `marketing` and `rewards` get
        /// all four exemptions. `router` and `timelock` get them too when they
        /// are not the zero account. A zero `router` means the router is not
        /// known yet; set it later with `set_router`.
        #[ink(constructor)]
        pub fn new(
            marketing: AccountId,
            rewards: AccountId,
            router: AccountId,
            timelock: AccountId,
        ) -> Result<Self, Error> {
            let caller = Self::env().caller();
            let contract = Self::env().account_id();
            let zero = AccountId::from(ZERO_ADDRESS);

            let mut token = Self {
                balances: Mapping::default(),
                allowances: Mapping::default(),
                total_supply: 0,
                flags: Mapping::default(),
                last_acquisition: Mapping::default(),
                config: PolicyConfig::default(),
                liquidity_pool: None,
                router: (router != zero).then_some(router),
                owner: caller,
                marketing_address: marketing,
                rewards_address: rewards,
                timelock_address: timelock,
            };

            for account in [caller, contract, marketing, rewards, router, timelock] {
                if account != zero {
                    token.flags.insert(account, &AccountFlags::ALL_EXEMPTIONS.bits());
                }
            }

            token.mint(caller, TOTAL_SUPPLY)?;
            Ok(token)
        }

        // =====================================================================
        // PSP22 STANDARD INTERFACE
        // =====================================================================

        #[ink(message)]
        pub fn total_supply(&self) -> Balance {
            self.total_supply
        }

        #[ink(message)]
        pub fn balance_of(&self, owner: AccountId) -> Balance {
            self.balances.get(owner).unwrap_or(0)
        }

        #[ink(message)]
        pub fn allowance(&self, owner: AccountId, spender: AccountId) -> Balance {
            self.allowances.get((owner, spender)).unwrap_or(0)
        }

        #[ink(message)]
        pub fn transfer(&mut self, to: AccountId, value: Balance) -> Result<(), Error> {
            let from = self.env().caller();
            let plan = self.plan_transfer(from, to, value)?;
            self.commit_transfer(plan)
        }

        /// Move `value` from `from` to `to` on the caller's allowance.
        ///
        /// The allowance is checked first, then the full transfer pipeline.
        /// Only when both pass is the allowance spent, ahead of the value legs.
        #[ink(message)]
        pub fn transfer_from(
            &mut self,
            from: AccountId,
            to: AccountId,
            value: Balance,
        ) -> Result<(), Error> {
            let spender = self.env().caller();
            self.remaining_allowance(from, spender, value)?;
            let plan = self.plan_transfer(from, to, value)?;
            self.spend_allowance(from, spender, value)?;
            self.commit_transfer(plan)
        }

        /// Overwrite the caller's allowance for `spender`.
        ///
        /// A non-zero allowance may be changed directly to another non-zero
        /// value; there is no reset-to-zero requirement.
        #[ink(message)]
        pub fn approve(&mut self, spender: AccountId, value: Balance) -> Result<(), Error> {
            let owner = self.env().caller();
            self.allowances.insert((owner, spender), &value);
            self.env().emit_event(Approval { owner, spender, value });
            Ok(())
        }

        // =====================================================================
        // VIEW FUNCTIONS
        // =====================================================================

        #[ink(message)]
        pub fn name(&self) -> String {
            String::from(NAME)
        }

        #[ink(message)]
        pub fn symbol(&self) -> String {
            String::from(SYMBOL)
        }

        #[ink(message)]
        pub fn decimals(&self) -> u8 {
            DECIMALS
        }

        #[ink(message)]
        pub fn owner(&self) -> AccountId {
            self.owner
        }

        #[ink(message)]
        pub fn is_paused(&self) -> bool {
            self.config.paused
        }

        /// Raw flag byte; see `AccountFlags` for the bit layout.
        #[ink(message)]
        pub fn account_flags(&self, account: AccountId) -> u8 {
            self.flags_of(account).bits()
        }

        #[ink(message)]
        pub fn is_fee_exempt(&self, account: AccountId) -> bool {
            self.flags_of(account).contains(AccountFlags::FEE_EXEMPT)
        }

        #[ink(message)]
        pub fn is_max_tx_exempt(&self, account: AccountId) -> bool {
            self.flags_of(account).contains(AccountFlags::MAX_TX_EXEMPT)
        }

        #[ink(message)]
        pub fn is_max_wallet_exempt(&self, account: AccountId) -> bool {
            self.flags_of(account).contains(AccountFlags::MAX_WALLET_EXEMPT)
        }

        #[ink(message)]
        pub fn is_anti_dump_exempt(&self, account: AccountId) -> bool {
            self.flags_of(account).contains(AccountFlags::ANTI_DUMP_EXEMPT)
        }

        #[ink(message)]
        pub fn is_blacklisted(&self, account: AccountId) -> bool {
            self.flags_of(account).contains(AccountFlags::BLACKLISTED)
        }

        #[ink(message)]
        pub fn buy_fee(&self) -> u128 {
            self.config.buy_fee_bps
        }

        #[ink(message)]
        pub fn sell_fee(&self) -> u128 {
            self.config.sell_fee_bps
        }

        #[ink(message)]
        pub fn fee_denominator(&self) -> u128 {
            FEE_DENOMINATOR
        }

        /// `(lp_fee_share, marketing_fee_share)` in percent.
        #[ink(message)]
        pub fn fee_shares(&self) -> (u8, u8) {
            (self.config.lp_fee_share, self.config.marketing_fee_share)
        }

        #[ink(message)]
        pub fn fees_enabled(&self) -> bool {
            self.config.fees_enabled
        }

        #[ink(message)]
        pub fn anti_whale_enabled(&self) -> bool {
            self.config.anti_whale_enabled
        }

        #[ink(message)]
        pub fn max_tx_amount(&self) -> Balance {
            self.config.max_tx_amount
        }

        #[ink(message)]
        pub fn max_wallet_amount(&self) -> Balance {
            self.config.max_wallet_amount
        }

        #[ink(message)]
        pub fn anti_dump_duration(&self) -> Timestamp {
            ANTI_DUMP_DURATION
        }

        #[ink(message)]
        pub fn liquidity_pool(&self) -> Option<AccountId> {
            self.liquidity_pool
        }

        #[ink(message)]
        pub fn router(&self) -> Option<AccountId> {
            self.router
        }

        #[ink(message)]
        pub fn marketing_address(&self) -> AccountId {
            self.marketing_address
        }

        #[ink(message)]
        pub fn rewards_address(&self) -> AccountId {
            self.rewards_address
        }

        #[ink(message)]
        pub fn timelock_address(&self) -> AccountId {
            self.timelock_address
        }

        #[ink(message)]
        pub fn last_acquisition(&self, account: AccountId) -> Option<Timestamp> {
            self.last_acquisition.get(account)
        }

        /// Returns `true` if `account` may sell into the pool right now.
        #[ink(message)]
        pub fn can_sell(&self, account: AccountId) -> bool {
            if self.flags_of(account).contains(AccountFlags::ANTI_DUMP_EXEMPT) {
                return true;
            }
            holding_period_elapsed(
                self.last_acquisition.get(account),
                self.env().block_timestamp(),
            )
        }

        #[ink(message)]
        pub fn can_transfer_now(&self, account: AccountId) -> bool {
            self.can_sell(account)
        }

        // =====================================================================
        // ADMIN
        // =====================================================================

        #[ink(message)]
        pub fn transfer_ownership(&mut self, new_owner: AccountId) -> Result<(), Error> {
            self.only_owner()?;
            if new_owner == AccountId::from(ZERO_ADDRESS) {
                return Err(Error::ZeroAddress);
            }
            let previous_owner = self.owner;
            self.owner = new_owner;
            self.env().emit_event(OwnershipTransferred {
                previous_owner,
                new_owner,
            });
            Ok(())
        }

        /// Suspend value movement. Already paused is a no-op.
        #[ink(message)]
        pub fn pause(&mut self) -> Result<(), Error> {
            self.only_owner()?;
            if !self.config.paused {
                self.config.paused = true;
                self.env().emit_event(Paused { by: self.env().caller() });
            }
            Ok(())
        }

        /// Resume value movement. Already active is a no-op.
        #[ink(message)]
        pub fn unpause(&mut self) -> Result<(), Error> {
            self.only_owner()?;
            if self.config.paused {
                self.config.paused = false;
                self.env().emit_event(Unpaused { by: self.env().caller() });
            }
            Ok(())
        }

        #[ink(message)]
        pub fn set_buy_fee(&mut self, bps: u128) -> Result<(), Error> {
            self.only_owner()?;
            self.config.buy_fee_bps = PolicyConfig::validate_fee(bps)?;
            self.emit_fees_updated();
            Ok(())
        }

        #[ink(message)]
        pub fn set_sell_fee(&mut self, bps: u128) -> Result<(), Error> {
            self.only_owner()?;
            self.config.sell_fee_bps = PolicyConfig::validate_fee(bps)?;
            self.emit_fees_updated();
            Ok(())
        }

        #[ink(message)]
        pub fn set_fee_shares(&mut self, lp: u8, marketing: u8) -> Result<(), Error> {
            self.only_owner()?;
            let (lp, marketing) = PolicyConfig::validate_fee_shares(lp, marketing)?;
            self.config.lp_fee_share = lp;
            self.config.marketing_fee_share = marketing;
            self.env().emit_event(FeeSharesUpdated {
                lp_fee_share: lp,
                marketing_fee_share: marketing,
            });
            Ok(())
        }

        #[ink(message)]
        pub fn set_fees_enabled(&mut self, enabled: bool) -> Result<(), Error> {
            self.only_owner()?;
            self.config.fees_enabled = enabled;
            self.emit_toggles_updated();
            Ok(())
        }

        #[ink(message)]
        pub fn set_anti_whale_enabled(&mut self, enabled: bool) -> Result<(), Error> {
            self.only_owner()?;
            self.config.anti_whale_enabled = enabled;
            self.emit_toggles_updated();
            Ok(())
        }

        #[ink(message)]
        pub fn set_max_tx_amount(&mut self, amount: Balance) -> Result<(), Error> {
            self.only_owner()?;
            self.config.max_tx_amount = PolicyConfig::validate_max_tx(amount)?;
            self.emit_limits_updated();
            Ok(())
        }

        #[ink(message)]
        pub fn set_max_wallet_amount(&mut self, amount: Balance) -> Result<(), Error> {
            self.only_owner()?;
            self.config.max_wallet_amount = PolicyConfig::validate_max_wallet(amount)?;
            self.emit_limits_updated();
            Ok(())
        }

        /// Register the pool whose side of a transfer decides buy vs sell.
        #[ink(message)]
        pub fn set_liquidity_pool(&mut self, pool: AccountId) -> Result<(), Error> {
            self.only_owner()?;
            if pool == AccountId::from(ZERO_ADDRESS) {
                return Err(Error::ZeroAddress);
            }
            self.liquidity_pool = Some(pool);
            self.env().emit_event(LiquidityPoolUpdated { pool });
            Ok(())
        }

        /// Register the DEX router and grant it every exemption.
        #[ink(message)]
        pub fn set_router(&mut self, router: AccountId) -> Result<(), Error> {
            self.only_owner()?;
            if router == AccountId::from(ZERO_ADDRESS) {
                return Err(Error::ZeroAddress);
            }
            let flags = self.flags_of(router).union(AccountFlags::ALL_EXEMPTIONS);
            self.flags.insert(router, &flags.bits());
            self.router = Some(router);
            self.env().emit_event(RouterUpdated { router });
            Ok(())
        }

        #[ink(message)]
        pub fn set_blacklisted(
            &mut self,
            account: AccountId,
            blacklisted: bool,
        ) -> Result<(), Error> {
            self.only_owner()?;
            self.set_flag(account, AccountFlag::Blacklisted, blacklisted);
            Ok(())
        }

        #[ink(message)]
        pub fn set_fee_exempt(&mut self, account: AccountId, exempt: bool) -> Result<(), Error> {
            self.only_owner()?;
            self.set_flag(account, AccountFlag::FeeExempt, exempt);
            Ok(())
        }

        #[ink(message)]
        pub fn set_max_tx_exempt(&mut self, account: AccountId, exempt: bool) -> Result<(), Error> {
            self.only_owner()?;
            self.set_flag(account, AccountFlag::MaxTxExempt, exempt);
            Ok(())
        }

        #[ink(message)]
        pub fn set_max_wallet_exempt(
            &mut self,
            account: AccountId,
            exempt: bool,
        ) -> Result<(), Error> {
            self.only_owner()?;
            self.set_flag(account, AccountFlag::MaxWalletExempt, exempt);
            Ok(())
        }

        #[ink(message)]
        pub fn set_anti_dump_exempt(
            &mut self,
            account: AccountId,
            exempt: bool,
        ) -> Result<(), Error> {
            self.only_owner()?;
            self.set_flag(account, AccountFlag::AntiDumpExempt, exempt);
            Ok(())
        }

        /// Send the contract's native balance to the owner.
        #[ink(message)]
        pub fn emergency_withdraw(&mut self) -> Result<Balance, Error> {
            self.only_owner()?;
            let amount = self.env().balance();
            if amount == 0 {
                return Ok(0);
            }
            let to = self.owner;
            self.env()
                .transfer(to, amount)
                .map_err(|_| Error::TransferFailed)?;
            self.env().emit_event(EmergencyWithdrawal { to, amount });
            Ok(amount)
        }

        // =====================================================================
        // TRANSFER PIPELINE
        // =====================================================================

        /// Run every check a value-moving call needs, without writing.
        ///
        /// Order: zero address, Policy Gate, Fee Engine, sender balance.
        fn plan_transfer(
            &self,
            from: AccountId,
            to: AccountId,
            amount: Balance,
        ) -> Result<TransferPlan, Error> {
            let zero = AccountId::from(ZERO_ADDRESS);
            if from == zero || to == zero {
                return Err(Error::ZeroAddress);
            }

            let from_flags = self.flags_of(from);
            let to_flags = self.flags_of(to);
            let ctx = TransferContext {
                from,
                to,
                amount,
                from_flags,
                to_flags,
                to_balance: self.balance_of(to),
                last_acquisition: self.last_acquisition.get(from),
                pool: self.liquidity_pool,
                now: self.env().block_timestamp(),
            };
            let outcome = evaluate_gate(&self.config, &ctx)?;

            let route = Route::classify(from, to, self.liquidity_pool);
            let fee = fee_for(
                &self.config,
                route,
                amount,
                from_flags,
                to_flags,
                TransferPhase::Principal,
            )?;

            if self.balance_of(from) < amount {
                return Err(Error::InsufficientBalance);
            }

            Ok(TransferPlan {
                from,
                to,
                amount,
                fee,
                acquired_at: outcome.record_acquisition.then_some(ctx.now),
            })
        }

        fn commit_transfer(&mut self, plan: TransferPlan) -> Result<(), Error> {
            let net = plan.amount.checked_sub(plan.fee).ok_or(Error::Overflow)?;

            if let Some(at) = plan.acquired_at {
                self.last_acquisition.insert(plan.to, &at);
            }
            if plan.fee > 0 {
                self.settle_fee(plan.from, plan.fee)?;
            }
            self.raw_transfer(plan.from, plan.to, net)
        }

        /// Fee leg, priced under `TransferPhase::FeeSettlement`. It skips the
        /// gate, and `fee_for` charges it nothing, so the contract account
        /// receives exactly `fee`.
        fn settle_fee(&mut self, from: AccountId, fee: Balance) -> Result<(), Error> {
            let treasury = self.env().account_id();
            let nested = fee_for(
                &self.config,
                Route::classify(from, treasury, self.liquidity_pool),
                fee,
                self.flags_of(from),
                self.flags_of(treasury),
                TransferPhase::FeeSettlement,
            )?;
            debug_assert_eq!(nested, 0);
            self.raw_transfer(from, treasury, fee)
        }

        // =====================================================================
        // LEDGER PRIMITIVES
        // =====================================================================

        fn mint(&mut self, to: AccountId, amount: Balance) -> Result<(), Error> {
            let supply = self
                .total_supply
                .checked_add(amount)
                .ok_or(Error::Overflow)?;
            self.credit_balance(to, amount)?;
            self.total_supply = supply;
            self.env().emit_event(Transfer {
                from: None,
                to: Some(to),
                value: amount,
            });
            Ok(())
        }

        /// The only code path that moves value between accounts.
        fn raw_transfer(
            &mut self,
            from: AccountId,
            to: AccountId,
            value: Balance,
        ) -> Result<(), Error> {
            self.debit_balance(from, value)?;
            self.credit_balance(to, value)?;
            self.env().emit_event(Transfer {
                from: Some(from),
                to: Some(to),
                value,
            });
            Ok(())
        }

        /// `None` for the unlimited sentinel, otherwise the allowance left
        /// after spending `amount`.
        fn remaining_allowance(
            &self,
            owner: AccountId,
            spender: AccountId,
            amount: Balance,
        ) -> Result<Option<Balance>, Error> {
            let current = self.allowance(owner, spender);
            if current == Balance::MAX {
                return Ok(None);
            }
            current
                .checked_sub(amount)
                .map(Some)
                .ok_or(Error::InsufficientAllowance)
        }

        fn spend_allowance(
            &mut self,
            owner: AccountId,
            spender: AccountId,
            amount: Balance,
        ) -> Result<(), Error> {
            if let Some(remaining) = self.remaining_allowance(owner, spender, amount)? {
                self.allowances.insert((owner, spender), &remaining);
                self.env().emit_event(Approval {
                    owner,
                    spender,
                    value: remaining,
                });
            }
            Ok(())
        }

        fn debit_balance(&mut self, account: AccountId, amount: Balance) -> Result<(), Error> {
            let balance = self.balance_of(account);
            let updated = balance
                .checked_sub(amount)
                .ok_or(Error::InsufficientBalance)?;
            self.balances.insert(account, &updated);
            Ok(())
        }

        fn credit_balance(&mut self, account: AccountId, amount: Balance) -> Result<(), Error> {
            let balance = self.balance_of(account);
            let updated = balance.checked_add(amount).ok_or(Error::Overflow)?;
            self.balances.insert(account, &updated);
            Ok(())
        }

        // =====================================================================
        // INTERNAL HELPERS
        // =====================================================================

        fn flags_of(&self, account: AccountId) -> AccountFlags {
            AccountFlags::from_bits_retain(self.flags.get(account).unwrap_or(0))
        }

        fn set_flag(&mut self, account: AccountId, flag: AccountFlag, enabled: bool) {
            let mut updated = self.flags_of(account);
            updated.set(flag.into(), enabled);
            self.flags.insert(account, &updated.bits());
            self.env().emit_event(FlagsUpdated {
                account,
                flag,
                enabled,
            });
        }

        fn emit_fees_updated(&self) {
            self.env().emit_event(FeesUpdated {
                buy_fee_bps: self.config.buy_fee_bps,
                sell_fee_bps: self.config.sell_fee_bps,
            });
        }

        fn emit_limits_updated(&self) {
            self.env().emit_event(LimitsUpdated {
                max_tx_amount: self.config.max_tx_amount,
                max_wallet_amount: self.config.max_wallet_amount,
            });
        }

        fn emit_toggles_updated(&self) {
            self.env().emit_event(PolicyTogglesUpdated {
                fees_enabled: self.config.fees_enabled,
                anti_whale_enabled: self.config.anti_whale_enabled,
            });
        }

        fn only_owner(&self) -> Result<(), Error> {
            if self.env().caller() != self.owner {
                return Err(Error::NotOwner);
            }
            Ok(())
        }
    }

    // =========================================================================
    // UNIT TESTS
    // =========================================================================
    //
    // Cast:
    //   alice   = deployer / owner (all exemptions)
    //   bob     = marketing multisig, charlie = rewards (all exemptions)
    //   django  = liquidity pool (max-wallet exempt only)
    //   eve     = non-exempt holder A, frank = non-exempt holder B
    //   0x42…   = contract account (fee receiver)

}
