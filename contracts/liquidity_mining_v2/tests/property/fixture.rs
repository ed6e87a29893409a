#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]
//! Shared deployment for the property suites: a V1 ledger with one pool and
//! a V2 ledger that may take it over, paying through one instant strategy.

use liquidity_mining_v1::{LiquidityMiningV1, LiquidityMiningV1Client};
use liquidity_mining_v2::{LiquidityMiningV2, LiquidityMiningV2Client};
use reward_transfer::{RewardTransferLogic, RewardTransferLogicClient};
use soroban_sdk::testutils::{Address as _, Ledger as _};
use soroban_sdk::token::{Client as TokenClient, StellarAssetClient};
use soroban_sdk::{Address, Env, Vec};

pub const START_BLOCK: u32 = 100;
pub const REWARD_SUPPLY: i128 = 1_000_000_000;

pub struct Deployment {
    pub env: Env,
    pub v1: LiquidityMiningV1Client<'static>,
    pub v2: LiquidityMiningV2Client<'static>,
    pub admin: Address,
    pub reward_token: Address,
    pub pool_token: Address,
}

impl Deployment {
    /// `with_source` decides whether V2 is created to take over V1 or as an
    /// independent ledger with its own pool on `pool_token`.
    pub fn new(reward_per_block: i128, with_source: bool) -> Self {
        let env = Env::default();
        env.mock_all_auths();
        env.ledger().set_sequence_number(START_BLOCK);

        let reward_token = env
            .register_stellar_asset_contract_v2(Address::generate(&env))
            .address();
        let pool_token = env
            .register_stellar_asset_contract_v2(Address::generate(&env))
            .address();
        let admin = Address::generate(&env);

        let strategy_id = env.register(RewardTransferLogic, ());
        let strategy = RewardTransferLogicClient::new(&env, &strategy_id);
        strategy.initialize(&admin, &reward_token, &10_000, &0);

        let v1_id = env.register(LiquidityMiningV1, ());
        let v1 = LiquidityMiningV1Client::new(&env, &v1_id);
        v1.initialize(
            &admin,
            &reward_token,
            &reward_per_block,
            &0,
            &strategy_id,
            &false,
        );
        v1.add(&admin, &pool_token, &10);
        strategy.add_ledger(&admin, &v1_id);

        let v2_id = env.register(LiquidityMiningV2, ());
        let v2 = LiquidityMiningV2Client::new(&env, &v2_id);
        let source = if with_source { Some(v1_id.clone()) } else { None };
        v2.initialize(&admin, &source);
        v2.add_reward_token(&admin, &reward_token, &reward_per_block, &0, &strategy_id);
        strategy.add_ledger(&admin, &v2_id);

        let minter = StellarAssetClient::new(&env, &reward_token);
        if with_source {
            minter.mint(&v1_id, &REWARD_SUPPLY);
        } else {
            v2.add(&admin, &pool_token, &10);
            minter.mint(&v2_id, &REWARD_SUPPLY);
        }

        Deployment {
            env,
            v1,
            v2,
            admin,
            reward_token,
            pool_token,
        }
    }

    pub fn users(&self, n: usize) -> std::vec::Vec<Address> {
        (0..n).map(|_| Address::generate(&self.env)).collect()
    }

    pub fn mint_stake(&self, user: &Address, amount: i128) {
        StellarAssetClient::new(&self.env, &self.pool_token).mint(user, &amount);
    }

    pub fn balance(&self, token: &Address, owner: &Address) -> i128 {
        TokenClient::new(&self.env, token).balance(owner)
    }

    pub fn block(&self) -> u32 {
        self.env.ledger().sequence()
    }

    pub fn advance(&self, blocks: u32) {
        self.env.ledger().set_sequence_number(self.block() + blocks);
    }

    pub fn open_migration(&self) {
        self.v1.set_successor(&self.admin, &self.v2.address);
        self.v1.add_admin(&self.admin, &self.v2.address);
        self.v1.start_migration_grace_period(&self.admin);
    }

    pub fn batch(&self, users: &[Address]) -> Vec<Address> {
        let mut batch = Vec::new(&self.env);
        for user in users {
            batch.push_back(user.clone());
        }
        batch
    }
}
