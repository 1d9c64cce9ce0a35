use once_cell::sync::Lazy;
use pqcrypto_traits::kem::{PublicKey as _, SecretKey as _};
use qyra_core::{
    format_hex, kem_keypair, parse_hex, Qyra, ENC_SIZE, HEADER_SIZE, IV_SIZE, NONCE_SIZE,
    SOLUTION_SIZE, TOTAL_SIZE,
};

struct Fixture {
    public_key: Vec<u8>,
    secret_key: Vec<u8>,
    header: Vec<u8>,
    nonce: Vec<u8>,
}

static FIXTURE: Lazy<Fixture> = Lazy::new(|| {
    let (pk, sk) = kem_keypair();
    Fixture {
        public_key: pk.as_bytes().to_vec(),
        secret_key: sk.as_bytes().to_vec(),
        header: (0..HEADER_SIZE as u32).map(|i| (i * 7 + 1) as u8).collect(),
        nonce: (0..NONCE_SIZE as u32).map(|i| (i * 13 + 5) as u8).collect(),
    }
});

fn session() -> Qyra {
    let mut qyra = Qyra::new();
    assert!(qyra.initialize(&FIXTURE.public_key, &FIXTURE.secret_key));
    qyra.set_header(&FIXTURE.header);
    qyra.set_nonce(&FIXTURE.nonce);
    qyra
}

fn mined_envelope() -> Vec<u8> {
    let mut miner = session();
    miner.enable_parallel_dfs();
    assert!(miner.mine());
    assert!(miner.is_valid());
    miner.solution.get()
}

#[test]
fn mine_then_validate_roundtrip() {
    let envelope = mined_envelope();
    assert_eq!(envelope.len(), SOLUTION_SIZE);

    let mut verifier = session();
    assert!(verifier.validate(&envelope));
    assert!(verifier.is_valid());
}

#[test]
fn solution_fields_match_envelope_layout() {
    let mut miner = session();
    assert!(miner.mine());
    let envelope = miner.solution.get();

    let crypto = &miner.solution.crypto;
    assert_eq!(crypto.enc, envelope[..ENC_SIZE]);
    assert_eq!(crypto.iv, envelope[ENC_SIZE..ENC_SIZE + IV_SIZE]);
    assert_eq!(crypto.ciphertext, envelope[ENC_SIZE + IV_SIZE..TOTAL_SIZE]);
    assert_eq!(crypto.hash, envelope[TOTAL_SIZE..]);
}

#[test]
fn recorded_envelope_revalidates_after_hex_roundtrip() {
    let envelope = mined_envelope();
    let recorded = format_hex(&envelope);
    assert_eq!(recorded.len(), 2 * SOLUTION_SIZE);

    let parsed = parse_hex(&recorded).unwrap();
    assert_eq!(parsed, envelope);

    let mut verifier = session();
    assert!(verifier.validate(&parsed));
}

#[test]
fn validation_is_repeatable_across_sessions() {
    let envelope = mined_envelope();
    for _ in 0..2 {
        let mut verifier = session();
        assert!(verifier.validate(&envelope));
    }
}

#[test]
fn two_mines_differ_but_both_validate() {
    // IV and KEM encapsulation randomness are fresh per attempt, so
    // the same (header, nonce) yields different artifacts each time.
    let first = mined_envelope();
    let second = mined_envelope();
    assert_ne!(first, second);

    let mut verifier = session();
    assert!(verifier.validate(&first));
    assert!(verifier.validate(&second));
}

#[test]
fn trailing_bytes_are_ignored() {
    let mut envelope = mined_envelope();
    envelope.extend_from_slice(b"garbage past the envelope");
    let mut verifier = session();
    assert!(verifier.validate(&envelope));
}

#[test]
fn short_envelope_is_rejected() {
    let envelope = mined_envelope();
    let mut verifier = session();
    assert!(!verifier.validate(&envelope[..SOLUTION_SIZE - 1]));
    assert!(!verifier.validate(&[]));
}

#[test]
fn tampering_any_field_invalidates() {
    let envelope = mined_envelope();
    // One byte inside each of enc, iv, ct and path_hash.
    for offset in [0, ENC_SIZE, ENC_SIZE + IV_SIZE, TOTAL_SIZE, SOLUTION_SIZE - 1] {
        let mut tampered = envelope.clone();
        tampered[offset] ^= 0x01;
        let mut verifier = session();
        assert!(
            !verifier.validate(&tampered),
            "tampered byte at offset {offset} was accepted"
        );
    }
}

#[test]
fn unrelated_secret_key_fails() {
    let envelope = mined_envelope();
    let (_, other_sk) = kem_keypair();
    let mut verifier = Qyra::new();
    assert!(verifier.initialize(&FIXTURE.public_key, other_sk.as_bytes()));
    verifier.set_header(&FIXTURE.header);
    verifier.set_nonce(&FIXTURE.nonce);
    assert!(!verifier.validate(&envelope));
}

#[test]
fn wrong_nonce_fails_plaintext_check() {
    let envelope = mined_envelope();
    let mut verifier = session();
    let mut nonce = FIXTURE.nonce.clone();
    nonce[0] ^= 0xFF;
    verifier.set_nonce(&nonce);
    assert!(!verifier.validate(&envelope));
}

#[test]
fn wrong_header_fails_plaintext_check() {
    let envelope = mined_envelope();
    let mut verifier = session();
    verifier.set_header(&[0u8; HEADER_SIZE]);
    assert!(!verifier.validate(&envelope));
}

#[test]
fn explicit_thread_counts_accepted() {
    let mut miner = session();
    assert!(miner.set_num_threads(1));
    assert!(!miner.set_num_threads(0));
    assert!(miner.mine());
}
