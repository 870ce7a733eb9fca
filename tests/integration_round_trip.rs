/// Integration tests: the sealing pipeline end to end.
///
/// Tests cover:
///   1. Round-trip for text and binary plaintexts
///   2. Tamper detection on every envelope field
///   3. Wrong password
///   4. Fresh salt/IV per seal
///   5. Size ceiling (exact limit passes, one byte over fails, no randomness consumed)
///   6. Malformed envelopes rejected before any keyed work
///   7. Independent concurrent seals
///
/// All tests use the 4096-iteration profile to keep PBKDF2 cheap.

use cloudseal::crypto::kdf::{self, KdfParams, KeyPurpose};
use cloudseal::crypto::{open, seal, seal_with_rng, SealOptions};
use cloudseal::envelope::{self, Envelope};
use cloudseal::error::{ErrorKind, SealError};
use cloudseal::payload::{self, Plaintext, MAX_PLAINTEXT_BYTES};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

fn options() -> SealOptions {
    SealOptions::compat()
}

/// Flip the lowest bit of the byte at `index` in a hex-encoded field.
fn flip_hex_bit(field: &str, index: usize) -> String {
    let mut raw = hex::decode(field).expect("field should be valid hex");
    raw[index] ^= 0x01;
    hex::encode(raw)
}

// ── Test 1: Round trip ─────────────────────────────────────────────────────

/// The concrete scenario: "hello world" under "correct-password".
#[test]
fn test_hello_world_scenario() {
    let envelope = seal(&Plaintext::from("hello world"), "correct-password", &options())
        .expect("seal should succeed");

    let plaintext = open(&envelope, "correct-password", &options())
        .expect("open with the right password should succeed");
    assert_eq!(plaintext, b"hello world");

    let wrong = open(&envelope, "wrong-password", &options());
    assert!(
        matches!(wrong, Err(SealError::AuthenticationFailed)),
        "wrong password must fail authentication, got {:?}",
        wrong
    );
}

#[test]
fn test_binary_round_trip() {
    // Every byte value, several times over, spanning multiple normalization steps.
    let data: Vec<u8> = (0..20_000u32).map(|i| (i % 256) as u8).collect();
    let envelope = seal(&Plaintext::Bytes(data.clone()), "pw", &options()).unwrap();
    let plaintext = open(&envelope, "pw", &options()).unwrap();
    assert_eq!(plaintext, data);
}

#[test]
fn test_empty_plaintext_round_trip() {
    let envelope = seal(&Plaintext::Bytes(Vec::new()), "pw", &options()).unwrap();
    assert!(open(&envelope, "pw", &options()).unwrap().is_empty());
}

#[test]
fn test_round_trip_through_json_bytes() {
    let envelope = seal(&Plaintext::from("über ✓ unicode"), "pässwörd", &options()).unwrap();
    let wire = envelope.to_bytes().unwrap();
    let received = Envelope::from_bytes(&wire).unwrap();
    let plaintext = open(&received, "pässwörd", &options()).unwrap();
    assert_eq!(plaintext, "über ✓ unicode".as_bytes());
}

// ── Test 2: Tamper detection ───────────────────────────────────────────────

#[test]
fn test_flipping_any_field_fails_authentication() {
    let envelope = seal(&Plaintext::from("tamper me"), "pw", &options()).unwrap();
    let ct_len = hex::decode(&envelope.ciphertext).unwrap().len();

    let tampered = [
        Envelope {
            ciphertext: flip_hex_bit(&envelope.ciphertext, 0),
            ..envelope.clone()
        },
        Envelope {
            ciphertext: flip_hex_bit(&envelope.ciphertext, ct_len - 1),
            ..envelope.clone()
        },
        Envelope {
            iv: flip_hex_bit(&envelope.iv, 0),
            ..envelope.clone()
        },
        Envelope {
            auth_tag: flip_hex_bit(&envelope.auth_tag, 31),
            ..envelope.clone()
        },
    ];

    for bad in &tampered {
        let result = open(bad, "pw", &options());
        assert!(
            matches!(result, Err(SealError::AuthenticationFailed)),
            "tampered envelope must fail authentication, got {:?}",
            result
        );
    }
}

#[test]
fn test_swapped_salt_fails_authentication() {
    // A different salt re-derives different keys: indistinguishable from a wrong password.
    let envelope = seal(&Plaintext::from("data"), "pw", &options()).unwrap();
    let tampered = Envelope {
        salt: flip_hex_bit(&envelope.salt, 0),
        ..envelope
    };
    assert!(matches!(
        open(&tampered, "pw", &options()),
        Err(SealError::AuthenticationFailed)
    ));
}

// ── Test 3: Wrong password ─────────────────────────────────────────────────

#[test]
fn test_wrong_passwords_all_fail_the_same_way() {
    let envelope = seal(&Plaintext::from("secret"), "correct-password", &options()).unwrap();
    for wrong in ["wrong-password", "correct-passwor", "correct-password ", "Correct-password"] {
        let err = open(&envelope, wrong, &options()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthenticationFailed, "password {:?}", wrong);
        assert_eq!(err.to_string(), "Wrong password or corrupted data");
    }
}

// ── Test 4: Determinism and uniqueness ─────────────────────────────────────

#[test]
fn test_derivation_deterministic_and_salt_sensitive() {
    let params = KdfParams::compat();
    let s1 = [0x01u8; 32];
    let s2 = [0x02u8; 32];
    let a = kdf::derive("pw", &s1, KeyPurpose::EncKey, &params).unwrap();
    let b = kdf::derive("pw", &s1, KeyPurpose::EncKey, &params).unwrap();
    let c = kdf::derive("pw", &s2, KeyPurpose::EncKey, &params).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_same_input_seals_differently_each_time() {
    let input = Plaintext::from("identical plaintext");
    let first = seal(&input, "pw", &options()).unwrap();
    let second = seal(&input, "pw", &options()).unwrap();
    assert_ne!(first.salt, second.salt, "salt must be fresh per seal");
    assert_ne!(first.iv, second.iv, "iv must be fresh per seal");
    assert_ne!(first.ciphertext, second.ciphertext);
    assert_ne!(first.auth_tag, second.auth_tag);
}

// ── Test 5: Size ceiling ───────────────────────────────────────────────────

#[test]
fn test_exact_limit_succeeds_one_over_fails() {
    let limited = SealOptions {
        max_plaintext_bytes: 64 * 1024,
        ..options()
    };
    let exact = Plaintext::Bytes(vec![0xA5; 64 * 1024]);
    let envelope = seal(&exact, "pw", &limited).expect("exactly the limit must succeed");
    assert_eq!(open(&envelope, "pw", &limited).unwrap().len(), 64 * 1024);

    let over = Plaintext::Bytes(vec![0xA5; 64 * 1024 + 1]);
    match seal(&over, "pw", &limited) {
        Err(SealError::FileTooLarge { actual, limit }) => {
            assert_eq!(actual, 64 * 1024 + 1);
            assert_eq!(limit, 64 * 1024);
        }
        other => panic!("expected FileTooLarge, got {:?}", other),
    }
}

#[test]
fn test_hard_ceiling_boundary_in_normalizer() {
    let exact = Plaintext::Bytes(vec![0u8; MAX_PLAINTEXT_BYTES as usize]);
    assert!(payload::normalize(&exact, MAX_PLAINTEXT_BYTES).is_ok());
    drop(exact);

    let over = Plaintext::Bytes(vec![0u8; MAX_PLAINTEXT_BYTES as usize + 1]);
    let err = payload::normalize(&over, MAX_PLAINTEXT_BYTES).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FileTooLarge);
}

/// Counts random bytes handed out, to prove rejected inputs have no side effects.
struct CountingRng {
    bytes_drawn: usize,
}

impl RngCore for CountingRng {
    fn next_u32(&mut self) -> u32 {
        self.bytes_drawn += 4;
        OsRng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.bytes_drawn += 8;
        OsRng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.bytes_drawn += dest.len();
        OsRng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.bytes_drawn += dest.len();
        OsRng.try_fill_bytes(dest)
    }
}

impl CryptoRng for CountingRng {}

#[test]
fn test_sixty_megabytes_rejected_before_any_randomness() {
    let mut rng = CountingRng { bytes_drawn: 0 };
    let big = Plaintext::Bytes(vec![0u8; 60 * 1024 * 1024]);
    let result = seal_with_rng(&mut rng, &big, "pw", &SealOptions::default());
    match result {
        Err(SealError::FileTooLarge { actual, limit }) => {
            assert_eq!(actual, 60 * 1024 * 1024);
            assert_eq!(limit, MAX_PLAINTEXT_BYTES);
        }
        other => panic!("expected FileTooLarge, got {:?}", other),
    }
    assert_eq!(rng.bytes_drawn, 0, "no salt or IV may be drawn for a rejected file");
}

// ── Test 6: Malformed envelopes ────────────────────────────────────────────

#[test]
fn test_missing_auth_tag_never_reaches_cipher() {
    let envelope = seal(&Plaintext::from("data"), "pw", &options()).unwrap();
    let mut value: serde_json::Value = serde_json::from_slice(&envelope.to_bytes().unwrap()).unwrap();
    value.as_object_mut().unwrap().remove("authTag");
    let bytes = serde_json::to_vec(&value).unwrap();

    let err = envelope::unpack_bytes(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedPayload);
    assert_eq!(Envelope::from_bytes(&bytes).unwrap_err().kind(), ErrorKind::MalformedPayload);
}

#[test]
fn test_truncated_ciphertext_is_malformed_not_auth_failure() {
    let envelope = seal(&Plaintext::from("data"), "pw", &options()).unwrap();
    let truncated = Envelope {
        ciphertext: envelope.ciphertext[..envelope.ciphertext.len() - 2].to_string(),
        ..envelope
    };
    let err = open(&truncated, "pw", &options()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedPayload);
}

// ── Test 7: Concurrency ────────────────────────────────────────────────────

#[test]
fn test_concurrent_seals_are_independent() {
    let inputs: Vec<String> = (0..4).map(|i| format!("file number {}", i)).collect();

    let envelopes: Vec<Envelope> = std::thread::scope(|scope| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|text| {
                scope.spawn(move || seal(&Plaintext::from(text.as_str()), "shared-pw", &options()))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("seal thread panicked").expect("seal should succeed"))
            .collect()
    });

    for (text, envelope) in inputs.iter().zip(&envelopes) {
        assert_eq!(open(envelope, "shared-pw", &options()).unwrap(), text.as_bytes());
    }
    let mut ivs: Vec<&String> = envelopes.iter().map(|e| &e.iv).collect();
    ivs.sort();
    ivs.dedup();
    assert_eq!(ivs.len(), envelopes.len(), "every concurrent seal must use its own IV");
}
