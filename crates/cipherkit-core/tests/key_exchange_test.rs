//! Key-exchange session lifecycle tests
//!
//! Two services stand in for two parties. A manual clock drives expiry.

use std::{
    sync::{Arc, Barrier, Mutex},
    thread,
    time::Duration,
};

use cipherkit_core::{
    CryptoError, CryptoService, Environment, ServiceConfig,
    api::{DhCompleteRequest, DhInitRequest, DhInitResponse},
};
use rand_chacha::{
    ChaCha20Rng,
    rand_core::{RngCore, SeedableRng},
};

// Manual clock plus seeded RNG, shared across clones
#[derive(Clone)]
struct TestEnv {
    clock: Arc<Mutex<Duration>>,
    rng: Arc<Mutex<ChaCha20Rng>>,
}

impl TestEnv {
    fn seeded(seed: u64) -> Self {
        Self {
            clock: Arc::new(Mutex::new(Duration::ZERO)),
            rng: Arc::new(Mutex::new(ChaCha20Rng::seed_from_u64(seed))),
        }
    }

    fn advance(&self, by: Duration) {
        *self.clock.lock().unwrap() += by;
    }
}

impl Environment for TestEnv {
    type Instant = Duration;

    fn now(&self) -> Duration {
        *self.clock.lock().unwrap()
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        self.rng.lock().unwrap().fill_bytes(buffer);
    }
}

fn party(seed: u64) -> (CryptoService<TestEnv>, TestEnv) {
    let env = TestEnv::seeded(seed);
    (CryptoService::new(env.clone(), ServiceConfig::default()), env)
}

fn init(service: &CryptoService<TestEnv>, id: &str) -> Result<DhInitResponse, CryptoError> {
    service.dh_init(&DhInitRequest { session_id: id.to_string() })
}

fn complete_initiator(
    service: &CryptoService<TestEnv>,
    id: &str,
    peer: &str,
) -> Result<String, CryptoError> {
    service
        .dh_complete(&DhCompleteRequest {
            session_id: id.to_string(),
            peer_public_key: peer.to_string(),
            prime: None,
            generator: None,
        })
        .map(|r| r.derived_key)
}

#[test]
fn both_parties_derive_the_same_key() {
    let (alice, _) = party(1);
    let (bob, _) = party(2);

    let offer = init(&alice, "s1").unwrap();
    assert_eq!(offer.generator, "Ag==");

    let reply = bob
        .dh_complete(&DhCompleteRequest {
            session_id: "s1".to_string(),
            peer_public_key: offer.public_key.clone(),
            prime: Some(offer.prime.clone()),
            generator: Some(offer.generator.clone()),
        })
        .unwrap();
    let bob_public = reply.public_key.clone().unwrap();

    let alice_key = complete_initiator(&alice, "s1", &bob_public).unwrap();

    assert_eq!(alice_key, reply.derived_key);
    assert_eq!(cipherkit_crypto::codec::decode("k", &alice_key).unwrap().len(), 32);
}

#[test]
fn replayed_complete_is_session_not_found() {
    let (alice, _) = party(3);
    let (bob, _) = party(4);
    init(&alice, "s1").unwrap();
    let bob_offer = init(&bob, "other").unwrap();

    complete_initiator(&alice, "s1", &bob_offer.public_key).unwrap();

    assert_eq!(
        complete_initiator(&alice, "s1", &bob_offer.public_key).unwrap_err(),
        CryptoError::SessionNotFound { session_id: "s1".to_string() }
    );
    assert!(alice.sessions().is_empty(Duration::ZERO));
}

#[test]
fn live_session_id_cannot_be_reused() {
    let (alice, _) = party(5);
    init(&alice, "s1").unwrap();

    assert_eq!(
        init(&alice, "s1").unwrap_err(),
        CryptoError::DuplicateSession { session_id: "s1".to_string() }
    );
}

#[test]
fn duplicate_init_is_rejected_before_key_generation() {
    let (rejected, _) = party(8);
    let (twin, _) = party(8);
    init(&rejected, "s1").unwrap();
    init(&twin, "s1").unwrap();

    init(&rejected, "s1").unwrap_err();

    // No randomness drawn, so both streams are still in step
    assert_eq!(init(&rejected, "s2").unwrap().public_key, init(&twin, "s2").unwrap().public_key);
}

#[test]
fn completed_session_id_can_start_fresh() {
    let (alice, _) = party(6);
    let (bob, _) = party(7);
    let first = init(&alice, "s1").unwrap();
    let bob_offer = init(&bob, "b").unwrap();
    complete_initiator(&alice, "s1", &bob_offer.public_key).unwrap();

    let second = init(&alice, "s1").unwrap();
    assert_ne!(first.public_key, second.public_key);
}

#[test]
fn expired_session_is_swept() {
    let (alice, env) = party(8);
    let (bob, _) = party(9);
    init(&alice, "s1").unwrap();
    let bob_offer = init(&bob, "b").unwrap();

    env.advance(Duration::from_secs(301));

    assert_eq!(
        complete_initiator(&alice, "s1", &bob_offer.public_key).unwrap_err(),
        CryptoError::SessionNotFound { session_id: "s1".to_string() }
    );

    // Same id is free again
    init(&alice, "s1").unwrap();
}

#[test]
fn expired_id_is_replaced_on_init() {
    let (alice, env) = party(10);
    init(&alice, "s1").unwrap();

    env.advance(Duration::from_secs(300));
    assert!(init(&alice, "s1").is_ok());
}

#[test]
fn session_within_ttl_still_completes() {
    let (alice, env) = party(11);
    let (bob, _) = party(12);
    init(&alice, "s1").unwrap();
    let bob_offer = init(&bob, "b").unwrap();

    env.advance(Duration::from_secs(299));
    assert!(complete_initiator(&alice, "s1", &bob_offer.public_key).is_ok());
}

#[test]
fn capacity_evicts_oldest_session() {
    let env = TestEnv::seeded(13);
    let config = ServiceConfig { max_sessions: 2, ..ServiceConfig::default() };
    let alice = CryptoService::new(env.clone(), config);
    let (bob, _) = party(14);
    let bob_offer = init(&bob, "b").unwrap();

    init(&alice, "first").unwrap();
    env.advance(Duration::from_secs(1));
    init(&alice, "second").unwrap();
    env.advance(Duration::from_secs(1));
    init(&alice, "third").unwrap();

    assert!(matches!(
        complete_initiator(&alice, "first", &bob_offer.public_key),
        Err(CryptoError::SessionNotFound { .. })
    ));
    assert!(complete_initiator(&alice, "second", &bob_offer.public_key).is_ok());
    assert!(complete_initiator(&alice, "third", &bob_offer.public_key).is_ok());
}

#[test]
fn trivial_peer_value_rejected_and_session_consumed() {
    let (alice, _) = party(15);
    init(&alice, "s1").unwrap();

    // Base64 of the single byte 0x01
    assert!(matches!(
        complete_initiator(&alice, "s1", "AQ=="),
        Err(CryptoError::InvalidParameter(_))
    ));
    assert!(matches!(
        complete_initiator(&alice, "s1", "AQ=="),
        Err(CryptoError::SessionNotFound { .. })
    ));
}

#[test]
fn responder_rejects_weak_group() {
    let (bob, _) = party(16);

    // 1024-bit all-ones modulus
    let weak_prime = cipherkit_crypto::codec::encode(&[0xFF; 128]);
    let err = bob
        .dh_complete(&DhCompleteRequest {
            session_id: "s1".to_string(),
            peer_public_key: "Ag==".to_string(),
            prime: Some(weak_prime),
            generator: Some("Ag==".to_string()),
        })
        .unwrap_err();

    assert!(matches!(err, CryptoError::InvalidParameter(_)));
}

#[test]
fn only_one_of_prime_or_generator_is_not_enough() {
    let (bob, _) = party(17);
    let offer = init(&party(18).0, "x").unwrap();

    let err = bob
        .dh_complete(&DhCompleteRequest {
            session_id: "s1".to_string(),
            peer_public_key: offer.public_key,
            prime: Some(offer.prime),
            generator: None,
        })
        .unwrap_err();

    assert_eq!(err, CryptoError::SessionNotFound { session_id: "s1".to_string() });
}

const RACERS: usize = 8;

#[test]
fn racing_inits_on_one_id_store_exactly_one_session() {
    let (alice, _) = party(19);
    let barrier = Barrier::new(RACERS);

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..RACERS)
            .map(|_| {
                let alice = alice.clone();
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    init(&alice, "race")
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    for err in results.into_iter().filter_map(Result::err) {
        assert_eq!(err, CryptoError::DuplicateSession { session_id: "race".to_string() });
    }
    assert_eq!(alice.sessions().len(Duration::ZERO), 1);
}

#[test]
fn racing_completes_on_one_id_derive_exactly_once() {
    let (alice, _) = party(20);
    let (bob, _) = party(21);
    init(&alice, "race").unwrap();
    let bob_offer = init(&bob, "b").unwrap();
    let barrier = Barrier::new(RACERS);

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..RACERS)
            .map(|_| {
                let alice = alice.clone();
                let barrier = &barrier;
                let peer = bob_offer.public_key.as_str();
                scope.spawn(move || {
                    barrier.wait();
                    complete_initiator(&alice, "race", peer)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    for err in results.into_iter().filter_map(Result::err) {
        assert_eq!(err, CryptoError::SessionNotFound { session_id: "race".to_string() });
    }
    assert!(alice.sessions().is_empty(Duration::ZERO));
}
