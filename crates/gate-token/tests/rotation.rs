//! Key rotation across the public API: continuity for tokens issued before a
//! rotation, exclusivity once a key leaves the ring, and reload semantics.

use chrono::{DateTime, Duration, Utc};
use gate_core::UserId;
use gate_token::{KeyRing, KeySlot, SigningSecret, TokenConfig, TokenError, TokenService};

fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp(1_750_000_000, 0).unwrap()
}

fn secret(s: &str) -> SigningSecret {
    SigningSecret::new(s).unwrap()
}

fn service(current: &str, retired: &[&str], hours: i64) -> TokenService {
    TokenService::new(
        TokenConfig::new(current)
            .with_retired(retired.iter().copied())
            .with_lifetime_hours(hours),
    )
    .unwrap()
}

#[test]
fn tokens_survive_multiple_rotations() {
    let svc = service("k1", &[], 24);
    let t1 = svc.issue_at(UserId::new(1), t0()).unwrap().token;

    svc.rotate(secret("k2"));
    let t2 = svc.issue_at(UserId::new(2), t0()).unwrap().token;

    svc.rotate(secret("k3"));
    let t3 = svc.issue_at(UserId::new(3), t0()).unwrap().token;

    let now = t0() + Duration::hours(1);
    assert_eq!(svc.verify_at(&t3, now).unwrap().key, KeySlot::Current);
    assert_eq!(svc.verify_at(&t2, now).unwrap().key, KeySlot::Retired(0));
    assert_eq!(svc.verify_at(&t1, now).unwrap().key, KeySlot::Retired(1));
}

#[test]
fn retired_key_does_not_extend_lifetime() {
    let svc = service("k1", &[], 1);
    let token = svc.issue_at(UserId::new(9), t0()).unwrap().token;
    svc.rotate(secret("k2"));

    assert_eq!(
        svc.validate_at(&token, t0() + Duration::minutes(59)),
        Ok(UserId::new(9))
    );
    assert_eq!(
        svc.validate_at(&token, t0() + Duration::minutes(60)),
        Err(TokenError::Expired)
    );
}

#[test]
fn restart_with_rotated_config_keeps_sessions() {
    // Process 1 signs with k1.
    let before = service("k1", &[], 24);
    let token = before.issue_at(UserId::new(77), t0()).unwrap().token;

    // Operator promotes k2 and moves k1 to the retired list; process restarts.
    let after = service("k2", &["k1"], 24);
    assert_eq!(after.validate_at(&token, t0()), Ok(UserId::new(77)));

    // Operator later drops k1 entirely.
    let pruned = service("k2", &[], 24);
    assert_eq!(
        pruned.validate_at(&token, t0()),
        Err(TokenError::SignatureInvalid)
    );
}

#[test]
fn replace_keys_swaps_the_whole_ring() {
    let svc = service("k1", &["k0"], 24);
    let old = svc.issue_at(UserId::new(5), t0()).unwrap().token;

    svc.replace_keys(KeyRing::new(secret("fresh"), vec![]));
    assert_eq!(svc.keys().retired_len(), 0);
    assert_eq!(
        svc.validate_at(&old, t0()),
        Err(TokenError::SignatureInvalid)
    );

    let new = svc.issue_at(UserId::new(5), t0()).unwrap().token;
    assert_eq!(svc.validate_at(&new, t0()), Ok(UserId::new(5)));
}

#[test]
fn snapshots_taken_before_rotation_are_unchanged() {
    let svc = service("k1", &[], 24);
    let before = svc.keys();
    svc.rotate(secret("k2"));
    let after = svc.keys();

    assert_eq!(before.current(), &secret("k1"));
    assert_eq!(before.retired_len(), 0);
    assert_eq!(after.current(), &secret("k2"));
    assert_eq!(after.retired().next(), Some(&secret("k1")));
}
