//! Integration test: launch, vote, rank.
//!
//! Walks a token through its whole life using only the library crates:
//! 1. Register a creator and link a Telegram account
//! 2. Launch a token and check its initial state
//! 3. Vote from two identities, with a repeat in between
//! 4. Check trending, recent and stats views agree with the vote ledger

use std::sync::Arc;

use drawmeme_db::{DbError, ManualClock, Registry};
use drawmeme_types::{validate, IdentityField, NewToken, NewUser, UserUpdate};

/// Simulated launch time.
const T0: u64 = 1_700_000_000_000;

const CREATOR: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

fn registry() -> (Registry, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(T0));
    let registry = Registry::with_clock(clock.clone()).expect("open registry");
    (registry, clock)
}

fn launch(registry: &Registry, name: &str, ticker: &str, image: &str) -> drawmeme_types::Token {
    registry
        .create_token(NewToken {
            name: validate::token_name(name).expect("name"),
            ticker: validate::ticker(ticker).expect("ticker"),
            image_url: image.to_string(),
            pumpfun_link: None,
        })
        .expect("create token")
}

#[test]
fn doge_lifecycle() {
    let (registry, clock) = registry();

    // Step 1: creator identity
    validate::solana_address(CREATOR).expect("valid address");
    let creator = registry
        .create_user(NewUser {
            solana_address: CREATOR.to_string(),
            telegram_id: None,
            telegram_username: None,
        })
        .expect("register");
    assert!(!creator.is_verified);

    let linked = registry
        .update_user(
            &creator.id,
            UserUpdate {
                telegram_id: Some("1001".to_string()),
                telegram_username: Some("doge_artist".to_string()),
                is_verified: Some(true),
            },
        )
        .expect("link telegram");
    assert_eq!(linked.solana_address, CREATOR);
    assert_eq!(linked.telegram_id.as_deref(), Some("1001"));

    let again = registry.create_user(NewUser {
        solana_address: CREATOR.to_string(),
        telegram_id: None,
        telegram_username: None,
    });
    assert!(matches!(
        again,
        Err(DbError::DuplicateIdentity(IdentityField::SolanaAddress))
    ));

    // Step 2: launch
    let token = launch(&registry, "Doge", "doge", "/uploads/a.png");
    assert_eq!(token.ticker, "DOGE");
    assert_eq!(token.votes, 0);
    assert_eq!(token.created_at, T0);

    // Step 3: votes
    clock.advance(1_000);
    registry.record_vote(&token.id, "9.9.9.9").expect("first vote");
    assert_eq!(votes_of(&registry, &token.id), 1);

    let repeat = registry.record_vote(&token.id, "9.9.9.9");
    assert!(matches!(repeat, Err(DbError::DuplicateVote { .. })));
    assert_eq!(votes_of(&registry, &token.id), 1);

    let (second, total) = registry.record_vote(&token.id, "8.8.8.8").expect("second vote");
    assert_eq!(second.timestamp, T0 + 1_000);
    assert_eq!(total, 2);
    assert_eq!(votes_of(&registry, &token.id), 2);

    assert!(registry.has_voted(&token.id, "9.9.9.9").expect("has_voted"));
    assert!(!registry.has_voted(&token.id, "7.7.7.7").expect("has_voted"));

    // Step 4: views
    let ledger = registry.get_token_votes(&token.id).expect("ledger");
    assert_eq!(ledger.len(), 2);
    assert!(ledger.iter().all(|v| v.token_id == token.id));

    let stats = registry.token_stats().expect("stats");
    assert_eq!(stats.total_tokens, 1);
    assert_eq!(stats.total_votes, 2);
    assert_eq!(stats.top_token.map(|t| t.id), Some(token.id.clone()));
}

#[test]
fn gallery_views_stay_consistent() {
    let (registry, clock) = registry();

    let mut ids = Vec::new();
    for (i, ticker) in ["AAA", "BBB", "CCC", "DDD", "EEE"].iter().enumerate() {
        clock.set(T0 + i as u64 * 60_000);
        let token = launch(&registry, &format!("Meme {i}"), ticker, "/uploads/x.png");
        ids.push(token.id);
    }

    // BBB and DDD tie at two votes, EEE leads with three.
    for voter in ["1.1.1.1", "2.2.2.2"] {
        registry.record_vote(&ids[1], voter).expect("vote");
        registry.record_vote(&ids[3], voter).expect("vote");
    }
    for voter in ["1.1.1.1", "2.2.2.2", "3.3.3.3"] {
        registry.record_vote(&ids[4], voter).expect("vote");
    }

    let trending: Vec<String> = registry
        .list_tokens_by_votes()
        .expect("trending")
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(
        trending,
        vec![
            ids[4].clone(),
            ids[1].clone(),
            ids[3].clone(),
            ids[0].clone(),
            ids[2].clone()
        ]
    );

    let recent: Vec<String> = registry
        .list_recent_tokens(3)
        .expect("recent")
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(recent, vec![ids[4].clone(), ids[3].clone(), ids[2].clone()]);

    for token in registry.list_all_tokens().expect("all") {
        let ledger = registry.get_token_votes(&token.id).expect("ledger");
        assert_eq!(token.votes, ledger.len() as u64);
    }

    let stats = registry.token_stats().expect("stats");
    assert_eq!(stats.total_votes, 7);
    assert_eq!(stats.top_token.map(|t| t.id), Some(ids[4].clone()));
}

#[test]
fn vote_on_missing_token_leaves_no_trace() {
    let (registry, _clock) = registry();
    let result = registry.record_vote("nonexistent-id", "1.2.3.4");
    assert!(matches!(result, Err(DbError::TokenNotFound(_))));
    assert!(registry
        .get_token_votes("nonexistent-id")
        .expect("ledger")
        .is_empty());
    assert_eq!(registry.token_stats().expect("stats").total_votes, 0);
}

fn votes_of(registry: &Registry, id: &str) -> u64 {
    registry
        .get_token(id)
        .expect("get")
        .map(|t| t.votes)
        .unwrap_or_default()
}
