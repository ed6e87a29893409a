use soroban_sdk::{contracttype, Address, Env, Map, Vec};

// ── Pools ────────────────────────────────────────────────────────────────────

/// Accrual state of one pool for one reward token.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccrualState {
    pub last_reward_block: u32,
    /// Reward earned per staked unit, scaled by [`crate::accrual::PRECISION`].
    pub acc_reward_per_share: i128,
    pub reward_per_block: i128,
    pub start_block: u32,
}

impl AccrualState {
    /// Fresh accrual for a pool registered at `current_block`.
    pub fn new(current_block: u32, config: &RewardTokenConfig) -> Self {
        Self {
            last_reward_block: current_block.max(config.start_block),
            acc_reward_per_share: 0,
            reward_per_block: config.reward_per_block,
            start_block: config.start_block,
        }
    }
}

/// A staking pool, identified by the token it accepts.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pool {
    pub token: Address,
    pub allocation_point: u32,
    pub last_reward_block: u32,
    pub total_staked: i128,
    /// Keyed by reward token.
    pub accruals: Map<Address, AccrualState>,
}

// ── Reward tokens ────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardTokenConfig {
    pub token: Address,
    pub reward_per_block: i128,
    pub start_block: u32,
    /// Aggregate stake across every pool eligible for this reward token.
    pub total_users_balance: i128,
    /// Contract implementing `RewardTransferStrategy`.
    pub strategy: Address,
}

// ── Users ────────────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UserReward {
    pub reward_debt: i128,
    pub accumulated_reward: i128,
}

/// A user's position in one pool.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserInfo {
    pub amount: i128,
    /// Payout redirect recorded on deposit.
    pub beneficiary: Option<Address>,
    /// Keyed by reward token.
    pub rewards: Map<Address, UserReward>,
}

impl UserInfo {
    pub fn new(env: &Env) -> Self {
        Self {
            amount: 0,
            beneficiary: None,
            rewards: Map::new(env),
        }
    }

    pub fn reward(&self, reward_token: &Address) -> UserReward {
        self.rewards.get(reward_token.clone()).unwrap_or_default()
    }
}

/// A user's position tagged with its pool, as read by a migrating successor.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserPosition {
    pub pool_token: Address,
    pub info: UserInfo,
}

// ── Read projections ─────────────────────────────────────────────────────────

/// Returned by `get_user_info`; `rewards` follows reward-token registration order.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserInfoView {
    pub amount: i128,
    pub rewards: Vec<UserReward>,
}

/// Parallel arrays returned by `get_pool_info_list_array`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolInfoList {
    pub tokens: Vec<Address>,
    pub allocation_points: Vec<u32>,
    pub last_reward_blocks: Vec<u32>,
}

/// Outcome of paying one reward token through its strategy.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardPayout {
    pub reward_token: Address,
    pub recipient: Address,
    pub gross: i128,
    pub delivered: i128,
}

// ── Migration ────────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MigrationState {
    NotStarted,
    GracePeriodActive,
    Finished,
}

/// One asset moved by `migrate_funds`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundTransfer {
    pub asset: Address,
    pub amount: i128,
}
