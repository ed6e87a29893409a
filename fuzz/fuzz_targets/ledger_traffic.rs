#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use liquidity_mining_v1::{LiquidityMiningV1, LiquidityMiningV1Client};
use liquidity_mining_v2::{LiquidityMiningV2, LiquidityMiningV2Client};
use reward_transfer::{RewardTransferLogic, RewardTransferLogicClient};
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{Client as TokenClient, StellarAssetClient},
    vec, Address, Env,
};

#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Deposit { user: u8, amount: u32 },
    Withdraw { user: u8, amount: u32 },
    Claim { user: u8 },
    EmergencyWithdraw { user: u8 },
    Advance { blocks: u8 },
    Reweight { allocation_point: u16 },
    StartGrace,
    MigratePools,
    MigrateUser { user: u8 },
    MigrateFunds,
    FinishMigration,
}

const USERS: usize = 4;

fuzz_target!(|actions: Vec<FuzzAction>| {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_sequence_number(1);

    let admin = Address::generate(&env);
    let reward_token = env
        .register_stellar_asset_contract_v2(admin.clone())
        .address();
    let pool_token = env
        .register_stellar_asset_contract_v2(admin.clone())
        .address();

    let strategy_id = env.register(RewardTransferLogic, ());
    let strategy = RewardTransferLogicClient::new(&env, &strategy_id);
    strategy.initialize(&admin, &reward_token, &7_500, &10);

    let v1_id = env.register(LiquidityMiningV1, ());
    let v1 = LiquidityMiningV1Client::new(&env, &v1_id);
    v1.initialize(&admin, &reward_token, &1_000, &0, &strategy_id, &false);
    v1.add(&admin, &pool_token, &10);
    strategy.add_ledger(&admin, &v1_id);
    StellarAssetClient::new(&env, &reward_token).mint(&v1_id, &i128::from(u64::MAX));

    let v2_id = env.register(LiquidityMiningV2, ());
    let v2 = LiquidityMiningV2Client::new(&env, &v2_id);
    v2.initialize(&admin, &Some(v1_id.clone()));
    v2.add_reward_token(&admin, &reward_token, &1_000, &0, &strategy_id);
    strategy.add_ledger(&admin, &v2_id);
    v1.set_successor(&admin, &v2_id);
    v1.add_admin(&admin, &v2_id);

    let users: Vec<Address> = (0..USERS).map(|_| Address::generate(&env)).collect();
    let minter = StellarAssetClient::new(&env, &pool_token);
    let pool_balance = TokenClient::new(&env, &pool_token);
    let mut funds_moved = false;

    for action in actions {
        // User traffic goes wherever custody currently is.
        let live = v2.is_migration_finished();
        match action {
            FuzzAction::Deposit { user, amount } => {
                let user = &users[user as usize % USERS];
                let amount = i128::from(amount);
                minter.mint(user, &amount);
                if live {
                    let _ = v2.try_deposit(user, &pool_token, &amount, &None);
                } else {
                    let _ = v1.try_deposit(user, &pool_token, &amount, &None);
                }
            }
            FuzzAction::Withdraw { user, amount } => {
                let user = &users[user as usize % USERS];
                let amount = i128::from(amount);
                if live {
                    let _ = v2.try_withdraw(user, &pool_token, &amount, &None);
                } else {
                    let _ = v1.try_withdraw(user, &pool_token, &amount, &None);
                }
            }
            FuzzAction::Claim { user } => {
                let user = &users[user as usize % USERS];
                if live {
                    let _ = v2.try_claim_reward(user, &pool_token, &None);
                } else {
                    let _ = v1.try_claim_reward(user, &pool_token, &None);
                }
            }
            FuzzAction::EmergencyWithdraw { user } => {
                let user = &users[user as usize % USERS];
                if live {
                    let _ = v2.try_emergency_withdraw(user, &pool_token);
                } else {
                    let _ = v1.try_emergency_withdraw(user, &pool_token);
                }
            }
            FuzzAction::Advance { blocks } => {
                let next = env.ledger().sequence().saturating_add(u32::from(blocks));
                env.ledger().set_sequence_number(next);
            }
            FuzzAction::Reweight { allocation_point } => {
                let _ = v1.try_update(&admin, &pool_token, &u32::from(allocation_point));
            }
            FuzzAction::StartGrace => {
                let _ = v1.try_start_migration_grace_period(&admin);
            }
            FuzzAction::MigratePools => {
                let _ = v2.try_migrate_pools(&admin);
            }
            FuzzAction::MigrateUser { user } => {
                let user = users[user as usize % USERS].clone();
                let _ = v2.try_migrate_users(&admin, &vec![&env, user]);
            }
            FuzzAction::MigrateFunds => {
                funds_moved |= matches!(v2.try_migrate_funds(&admin), Ok(Ok(_)));
            }
            FuzzAction::FinishMigration => {
                let _ = v2.try_finish_migration(&admin);
            }
        }

        // Until custody moves, the source holds exactly the staked amount.
        if !funds_moved {
            let staked = v1.get_pool_info(&pool_token).total_staked;
            assert_eq!(pool_balance.balance(&v1_id), staked);
        }
    }
});
