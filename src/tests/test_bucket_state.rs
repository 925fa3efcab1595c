use chrono::{DateTime, TimeDelta, Utc};

use crate::{BucketState, Capacity, RateLimitDecision, RefillIntervalSeconds};

fn capacity(n: u64) -> Capacity {
    Capacity::try_from(n).unwrap()
}

fn interval(s: u64) -> RefillIntervalSeconds {
    RefillIntervalSeconds::try_from(s).unwrap()
}

fn t0() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn state(tokens: u64, last_refill_time: DateTime<Utc>) -> BucketState {
    BucketState {
        tokens_in_bucket: tokens,
        last_refill_time,
    }
}

#[test]
fn fresh_bucket_is_full() {
    let s = BucketState::fresh(capacity(3), t0());
    assert_eq!(s, state(3, t0()));
}

#[test]
fn consumes_one_token_within_interval() {
    let mut s = state(3, t0());
    let now = t0() + TimeDelta::milliseconds(500);

    let decision = s.admit(capacity(3), interval(2), now);

    assert_eq!(decision, RateLimitDecision::Allowed { remaining: 2 });
    assert_eq!(s, state(2, t0()));
}

#[test]
fn empty_bucket_within_interval_rejects_and_keeps_zero() {
    let mut s = state(0, t0());
    let now = t0() + TimeDelta::milliseconds(1_500);

    let decision = s.admit(capacity(1), interval(2), now);

    assert_eq!(
        decision,
        RateLimitDecision::Rejected {
            refill_interval_seconds: 2,
            retry_after_ms: 500,
            remaining_after_waiting: 1,
        }
    );
    assert_eq!(s, state(0, t0()));
}

#[test]
fn refills_to_capacity_once_interval_elapsed() {
    let mut s = state(0, t0());
    let now = t0() + TimeDelta::seconds(2);

    let decision = s.admit(capacity(5), interval(2), now);

    assert_eq!(decision, RateLimitDecision::Allowed { remaining: 4 });
    assert_eq!(s, state(4, now));
}

#[test]
fn refill_is_a_single_step_not_proportional() {
    let mut s = state(0, t0());

    // Many intervals later the bucket is still only full once.
    let now = t0() + TimeDelta::seconds(60);
    assert!(s.refill(capacity(3), interval(2), now));
    assert_eq!(s, state(3, now));

    // Just short of the next interval nothing changes.
    s.tokens_in_bucket = 1;
    let later = now + TimeDelta::milliseconds(1_999);
    assert!(!s.refill(capacity(3), interval(2), later));
    assert_eq!(s, state(1, now));
}

#[test]
fn future_refill_time_never_refills() {
    let future = t0() + TimeDelta::seconds(30);
    let mut s = state(0, future);

    assert!(!s.is_refill_due(interval(1), t0()));

    let decision = s.admit(capacity(2), interval(1), t0());
    assert!(matches!(
        decision,
        RateLimitDecision::Rejected {
            retry_after_ms: 31_000,
            ..
        }
    ));
    assert_eq!(s, state(0, future));
}

#[test]
fn oversized_token_count_is_clamped_to_capacity() {
    let mut s = state(100, t0());

    let decision = s.admit(capacity(3), interval(10), t0());

    assert_eq!(decision, RateLimitDecision::Allowed { remaining: 2 });
    assert_eq!(s.tokens_in_bucket, 2);
}

#[test]
fn tokens_never_go_negative() {
    let mut s = BucketState::fresh(capacity(2), t0());
    let mut allowed = 0;

    for i in 0..10 {
        let now = t0() + TimeDelta::milliseconds(i * 10);
        if s.admit(capacity(2), interval(60), now).is_allowed() {
            allowed += 1;
        }
        assert!(s.tokens_in_bucket <= 2);
    }

    assert_eq!(allowed, 2);
    assert_eq!(s.tokens_in_bucket, 0);
    assert!(!s.try_consume());
    assert_eq!(s.tokens_in_bucket, 0);
}

#[test]
fn retry_after_is_zero_when_refill_is_due() {
    let s = state(0, t0());
    assert_eq!(s.retry_after_ms(interval(2), t0() + TimeDelta::seconds(5)), 0);
    assert_eq!(s.retry_after_ms(interval(2), t0()), 2_000);
}

#[test]
fn retry_after_includes_clock_skew() {
    let s = state(0, t0() + TimeDelta::seconds(5));
    assert_eq!(s.retry_after_ms(interval(2), t0()), 7_000);
    assert!(s.retry_after_ms(interval(2), t0()) > interval(2).as_millis());
}

#[test]
fn stored_form_has_exactly_two_fields() {
    let s = state(4, t0() + TimeDelta::nanoseconds(123_456_789));
    let encoded = s.encode().unwrap();

    let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
    let object = value.as_object().unwrap();
    assert_eq!(object.len(), 2);
    assert_eq!(object["TokensInBucket"], 4);
    assert_eq!(object["LastRefillTime"], "2024-05-01T12:00:00.123456789Z");

    assert_eq!(BucketState::decode(&encoded).unwrap(), s);
}

#[test]
fn decode_accepts_offsets_and_normalizes_to_utc() {
    let decoded = BucketState::decode(
        r#"{"TokensInBucket":1,"LastRefillTime":"2024-05-01T17:30:00.5+05:30"}"#,
    )
    .unwrap();

    assert_eq!(decoded, state(1, t0() + TimeDelta::milliseconds(500)));
}
