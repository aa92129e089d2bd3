//! Claim assembly against an in-memory chain.

mod helpers;

use helpers::*;
use reclaim_blinks::chain::{discover_empty_accounts, discover_token_accounts_with_balance};
use reclaim_blinks::consts::*;
use reclaim_blinks::error::ReclaimError;
use reclaim_blinks::program::compute_budget_instructions;
use solana_sdk::compute_budget;
use solana_sdk::hash::Hash;
use solana_sdk::packet::PACKET_DATA_SIZE;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_program;

#[tokio::test]
async fn test_bunch_without_referral() {
    let owner = Pubkey::new_unique();
    let mut chain = MockChain::new();
    let a = chain.token_account(&owner, 2_000_000, 0);
    let b = chain.token_account(&owner, 3_000_000, 0);
    let fx = fixture(chain, vec![]);

    let claim = fx
        .reclaimer
        .close_account_bunch(&owner, &[a, b], None)
        .await
        .unwrap();

    assert_eq!(claim.split.total, 5_000_000);
    assert_eq!(claim.split.owner_share, 3_250_000);
    assert_eq!(claim.split.operator_share, 1_750_000);
    assert_eq!(claim.split.referrer_share, 0);
    assert_eq!(claim.sol_received, 0.00325);
    assert_eq!(claim.sol_shared, None);
    assert_eq!(claim.referrer, None);
    assert_eq!(claim.accounts_closed(), 2);

    let ixs = &claim.instructions;
    assert_eq!(
        program_ids(ixs),
        vec![
            compute_budget::id(),
            compute_budget::id(),
            spl_token::id(),
            spl_token::id(),
            system_program::id(),
        ]
    );
    assert_eq!(
        ixs[..2],
        compute_budget_instructions(CLOSE_COMPUTE_UNITS * 2, COMPUTE_UNIT_PRICE_MICRO_LAMPORTS)
    );
    assert_eq!(ixs[2].accounts[0].pubkey, a);
    assert_eq!(ixs[3].accounts[0].pubkey, b);
    assert_eq!(ixs[4].accounts[1].pubkey, fx.operator);
    assert_eq!(transfer_lamports(&ixs[4]), 1_750_000);
}

#[tokio::test]
async fn test_bunch_with_live_referral() {
    let owner = Pubkey::new_unique();
    let mut chain = MockChain::new();
    let a = chain.token_account(&owner, 2_000_000, 0);
    let b = chain.token_account(&owner, 3_000_000, 0);
    let referrer = chain.wallet(1_000_000_000);
    let fx = fixture(chain, vec![referral("friend", referrer, 10)]);

    let claim = fx
        .reclaimer
        .close_account_bunch(&owner, &[a, b], Some("friend"))
        .await
        .unwrap();

    assert_eq!(claim.split.owner_share, 3_250_000);
    assert_eq!(claim.split.referrer_share, 175_000);
    assert_eq!(claim.split.operator_share, 1_575_000);
    assert_eq!(
        claim.split.owner_share + claim.split.operator_share + claim.split.referrer_share,
        5_000_000
    );
    assert_eq!(claim.referrer, Some(referrer));
    assert_eq!(claim.sol_shared, Some(0.000175));

    let ixs = &claim.instructions;
    assert_eq!(ixs.len(), 6);
    assert_eq!(ixs[4].accounts[1].pubkey, referrer);
    assert_eq!(transfer_lamports(&ixs[4]), 175_000);
    assert_eq!(ixs[5].accounts[1].pubkey, fx.operator);
    assert_eq!(transfer_lamports(&ixs[5]), 1_575_000);
}

#[tokio::test]
async fn test_unknown_referral_code_matches_no_referral() {
    let owner = Pubkey::new_unique();
    let mut chain = MockChain::new();
    let a = chain.token_account(&owner, 2_000_000, 0);
    let b = chain.token_account(&owner, 3_000_000, 0);
    let referrer = chain.wallet(1);
    let fx = fixture(chain, vec![referral("friend", referrer, 10)]);

    let plain = fx.reclaimer.close_account_bunch(&owner, &[a, b], None).await.unwrap();
    let unknown = fx
        .reclaimer
        .close_account_bunch(&owner, &[a, b], Some("stranger"))
        .await
        .unwrap();

    assert_eq!(plain, unknown);
}

#[tokio::test]
async fn test_referrer_without_account_is_ignored() {
    let owner = Pubkey::new_unique();
    let mut chain = MockChain::new();
    let a = chain.token_account(&owner, 2_039_280, 0);
    let ghost = Pubkey::new_unique();
    let fx = fixture(chain, vec![referral("ghost", ghost, 50)]);

    let claim = fx.reclaimer.close_account(&owner, &a, Some("ghost")).await.unwrap();

    assert_eq!(claim.referrer, None);
    assert_eq!(claim.split.referrer_share, 0);
    assert_eq!(claim.sol_shared, None);
    assert_eq!(claim.instructions.len(), 4);
    assert_eq!(claim.instructions[3].accounts[1].pubkey, fx.operator);
    assert_eq!(
        claim.split.owner_share + claim.split.operator_share,
        TOKEN_ACCOUNT_RENT
    );
    assert!(fx.chain.lookups().contains(&ghost));
}

#[tokio::test]
async fn test_empty_batch_rejected_before_any_lookup() {
    let owner = Pubkey::new_unique();
    let fx = fixture(MockChain::new(), vec![]);

    let err = fx.reclaimer.close_account_bunch(&owner, &[], None).await.unwrap_err();

    assert!(matches!(err, ReclaimError::EmptyBatch));
    assert!(fx.chain.lookups().is_empty());
}

#[tokio::test]
async fn test_missing_owner_or_account() {
    let owner = Pubkey::new_unique();
    let mut chain = MockChain::new();
    let a = chain.token_account(&owner, 2_039_280, 0);
    let fx = fixture(chain, vec![]);

    let err = fx
        .reclaimer
        .close_account(&Pubkey::default(), &a, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ReclaimError::MissingParameter("owner")));

    let err = fx
        .reclaimer
        .close_account_with_balance(&owner, &Pubkey::default(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ReclaimError::MissingParameter("account")));

    let err = fx
        .reclaimer
        .close_account_bunch(&Pubkey::default(), &[a], None)
        .await
        .unwrap_err();
    assert!(matches!(err, ReclaimError::MissingParameter("owner")));
}

#[tokio::test]
async fn test_batch_with_balance_fails_whole_batch() {
    let owner = Pubkey::new_unique();
    let mut chain = MockChain::new();
    let a = chain.token_account(&owner, 2_039_280, 0);
    let b = chain.token_account(&owner, 2_039_280, 10);
    let fx = fixture(chain, vec![]);

    let err = fx.reclaimer.close_account_bunch(&owner, &[a, b], None).await.unwrap_err();
    assert!(matches!(
        err,
        ReclaimError::UnexpectedBalance { account, amount: 10 } if account == b
    ));

    let err = fx.reclaimer.close_account(&owner, &b, None).await.unwrap_err();
    assert!(matches!(err, ReclaimError::UnexpectedBalance { .. }));
}

#[tokio::test]
async fn test_unknown_account_unavailable() {
    let owner = Pubkey::new_unique();
    let fx = fixture(MockChain::new(), vec![]);
    let missing = Pubkey::new_unique();

    let err = fx.reclaimer.close_account(&owner, &missing, None).await.unwrap_err();
    assert!(matches!(err, ReclaimError::AccountInfoUnavailable(k) if k == missing));
}

#[tokio::test]
async fn test_close_with_balance_burns_then_closes() {
    let owner = Pubkey::new_unique();
    let mut chain = MockChain::new();
    let held = chain.token_account(&owner, 2_039_280, 500);
    let fx = fixture(chain, vec![]);

    let claim = fx
        .reclaimer
        .close_account_with_balance(&owner, &held, None)
        .await
        .unwrap();

    let ixs = &claim.instructions;
    assert_eq!(
        ixs[..2],
        compute_budget_instructions(BURN_CLOSE_COMPUTE_UNITS, COMPUTE_UNIT_PRICE_MICRO_LAMPORTS)
    );
    assert_eq!(
        program_ids(&ixs[2..]),
        vec![spl_token::id(), spl_token::id(), system_program::id()]
    );
    // burn data: [8, amount le]
    assert_eq!(ixs[2].data[0], 8);
    assert_eq!(u64::from_le_bytes(ixs[2].data[1..9].try_into().unwrap()), 500);
    // close account data: [9]
    assert_eq!(ixs[3].data, vec![9]);
    assert_eq!(claim.closed[0].burned, 500);
    assert_eq!(claim.split.owner_share, 1_325_532);
}

#[tokio::test]
async fn test_close_with_balance_on_empty_account() {
    let owner = Pubkey::new_unique();
    let mut chain = MockChain::new();
    let empty = chain.token_account(&owner, 2_039_280, 0);
    let fx = fixture(chain, vec![]);

    let err = fx
        .reclaimer
        .close_account_with_balance(&owner, &empty, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ReclaimError::ZeroBalanceAccount(k) if k == empty));
}

#[tokio::test]
async fn test_batch_too_large() {
    let owner = Pubkey::new_unique();
    let mut chain = MockChain::new();
    let accounts: Vec<_> = (0..=MAX_ACCOUNTS_PER_TRANSACTION)
        .map(|_| chain.token_account(&owner, TOKEN_ACCOUNT_RENT, 0))
        .collect();
    let fx = fixture(chain, vec![]);

    let err = fx
        .reclaimer
        .close_account_bunch(&owner, &accounts, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ReclaimError::BatchTooLarge { count, max } if count == MAX_ACCOUNTS_PER_TRANSACTION + 1 && max == MAX_ACCOUNTS_PER_TRANSACTION
    ));
    assert!(fx.chain.lookups().is_empty());
}

#[tokio::test]
async fn test_duplicates_counted_once_in_caller_order() {
    let owner = Pubkey::new_unique();
    let mut chain = MockChain::new();
    let a = chain.token_account(&owner, 2_000_000, 0);
    let b = chain.token_account(&owner, 3_000_000, 0);
    let fx = fixture(chain, vec![]);

    let claim = fx
        .reclaimer
        .close_account_bunch(&owner, &[b, a, b], None)
        .await
        .unwrap();

    assert_eq!(claim.split.total, 5_000_000);
    assert_eq!(claim.instructions[2].accounts[0].pubkey, b);
    assert_eq!(claim.instructions[3].accounts[0].pubkey, a);
    assert_eq!(fx.chain.lookups(), vec![b, a]);
}

#[tokio::test]
async fn test_full_batch_fits_in_one_packet() {
    let owner = Pubkey::new_unique();
    let mut chain = MockChain::new();
    let accounts: Vec<_> = (0..MAX_ACCOUNTS_PER_TRANSACTION)
        .map(|_| chain.token_account(&owner, TOKEN_ACCOUNT_RENT, 0))
        .collect();
    let referrer = chain.wallet(1);
    let fx = fixture(chain, vec![referral("friend", referrer, 20)]);

    let claim = fx
        .reclaimer
        .close_account_bunch(&owner, &accounts, Some("friend"))
        .await
        .unwrap();
    let tx = claim.transaction(&Hash::new_from_array([1u8; 32]));

    assert_eq!(tx.message.account_keys[0], owner);
    assert_eq!(tx.message.instructions.len(), MAX_ACCOUNTS_PER_TRANSACTION + 4);
    assert!(tx.signatures.iter().all(|s| *s == Default::default()));
    let size = bincode::serialized_size(&tx).unwrap() as usize;
    assert!(size <= PACKET_DATA_SIZE, "transaction is {size} bytes");

    let total = TOKEN_ACCOUNT_RENT * MAX_ACCOUNTS_PER_TRANSACTION as u64;
    assert_eq!(
        claim.split.owner_share + claim.split.operator_share + claim.split.referrer_share,
        total
    );
}

#[tokio::test]
async fn test_accounts_of_another_wallet_are_refused() {
    let owner = Pubkey::new_unique();
    let stranger = Pubkey::new_unique();
    let mut chain = MockChain::new();
    let mine = chain.token_account(&owner, 2_039_280, 0);
    let theirs = chain.token_account(&stranger, 2_039_280, 0);
    let theirs_held = chain.token_account(&stranger, 2_039_280, 3);
    let fx = fixture(chain, vec![]);

    let err = fx.reclaimer.close_account(&owner, &theirs, None).await.unwrap_err();
    assert!(matches!(
        err,
        ReclaimError::ForeignAccount { account, owner: o } if account == theirs && o == stranger
    ));

    let err = fx
        .reclaimer
        .close_account_with_balance(&owner, &theirs_held, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ReclaimError::ForeignAccount { .. }));

    let err = fx
        .reclaimer
        .close_account_bunch(&owner, &[mine, theirs], None)
        .await
        .unwrap_err();
    assert!(matches!(err, ReclaimError::ForeignAccount { account, .. } if account == theirs));
}

#[tokio::test]
async fn test_discovered_accounts_close_without_refetching() {
    let owner = Pubkey::new_unique();
    let mut chain = MockChain::new();
    let a = chain.token_account(&owner, 2_000_000, 0);
    chain.token_account(&owner, 2_039_280, 8);
    let b = chain.token_account(&owner, 3_000_000, 0);
    let fx = fixture(chain, vec![]);

    let found = discover_empty_accounts(fx.reclaimer.source(), &owner, MAX_ACCOUNTS_PER_TRANSACTION)
        .await
        .unwrap();
    assert_eq!(found.iter().map(|k| k.account).collect::<Vec<_>>(), vec![a, b]);

    let claim = fx.reclaimer.close_discovered(&owner, &found, None).await.unwrap();
    assert_eq!(claim.split.total, 5_000_000);
    assert_eq!(claim.split.owner_share, 3_250_000);
    assert_eq!(
        claim.instructions[..2],
        compute_budget_instructions(CLOSE_COMPUTE_UNITS * 2, COMPUTE_UNIT_PRICE_MICRO_LAMPORTS)
    );
    assert!(fx.chain.lookups().is_empty());

    let err = fx.reclaimer.close_discovered(&owner, &[], None).await.unwrap_err();
    assert!(matches!(err, ReclaimError::EmptyBatch));
}

#[tokio::test]
async fn test_discovery_splits_empty_and_held_accounts() {
    let owner = Pubkey::new_unique();
    let mut chain = MockChain::new();
    let empty = chain.token_account(&owner, 2_039_280, 0);
    let held = chain.token_account(&owner, 2_039_280, 12);
    let held_too = chain.token_account(&owner, 2_039_280, 1);
    chain.token_account(&Pubkey::new_unique(), 2_039_280, 0);
    let fx = fixture(chain, vec![]);
    let source = fx.reclaimer.source();

    let empties = discover_empty_accounts(source, &owner, 10).await.unwrap();
    assert_eq!(empties.len(), 1);
    assert_eq!(empties[0].account, empty);
    assert_eq!(empties[0].token.lamports, 2_039_280);

    let with_balance = discover_token_accounts_with_balance(source, &owner, 10).await.unwrap();
    assert_eq!(
        with_balance.iter().map(|k| k.account).collect::<Vec<_>>(),
        vec![held, held_too]
    );

    let capped = discover_token_accounts_with_balance(source, &owner, 1).await.unwrap();
    assert_eq!(capped.len(), 1);
}

#[tokio::test]
async fn test_fee_payer_balance_guard() {
    let mut chain = MockChain::new();
    let rich = chain.wallet(LOW_BALANCE_LAMPORTS);
    let low = chain.wallet(MIN_FEE_PAYER_LAMPORTS);
    let poor = chain.wallet(MIN_FEE_PAYER_LAMPORTS - 1);
    let fx = fixture(chain, vec![]);

    assert_eq!(fx.reclaimer.fee_payer_balance(&rich).await.unwrap(), LOW_BALANCE_LAMPORTS);
    assert_eq!(fx.reclaimer.fee_payer_balance(&low).await.unwrap(), MIN_FEE_PAYER_LAMPORTS);

    let err = fx.reclaimer.fee_payer_balance(&poor).await.unwrap_err();
    assert!(matches!(
        err,
        ReclaimError::InsufficientFunds { available, required }
            if available == MIN_FEE_PAYER_LAMPORTS - 1 && required == MIN_FEE_PAYER_LAMPORTS
    ));

    let err = fx
        .reclaimer
        .fee_payer_balance(&Pubkey::new_unique())
        .await
        .unwrap_err();
    assert!(matches!(err, ReclaimError::InsufficientFunds { available: 0, .. }));
}
