//! Thin adapter over the external primitives: Kyber-768 KEM,
//! AES-256-CBC with PKCS#7 padding, and BLAKE3.
//!
//! Shared secrets never leave this module unwrapped; they are handed
//! out in [`Zeroizing`] buffers and wiped on drop. Failed operations
//! surface as [`QyraError`] without exposing partial output.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes::Aes256;
use blake3::Hasher;
use pqcrypto_kyber::kyber768;
use pqcrypto_traits::kem::{Ciphertext, PublicKey, SecretKey, SharedSecret};
use rand_core::RngCore;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::constants::{ENC_SIZE, HASH_SIZE, IV_SIZE, KEM_SHARED_SECRET_SIZE, PLAINTEXT_SIZE};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// A 32-byte KEM shared secret, wiped on drop.
pub type SharedSecretBytes = Zeroizing<[u8; KEM_SHARED_SECRET_SIZE]>;

#[derive(Debug, Error)]
pub enum QyraError {
    #[error("invalid key material: {0}")]
    InvalidKey(&'static str),

    #[error("invalid data size: expected {expected}, found {found}")]
    InvalidDataSize { expected: usize, found: usize },

    #[error("no data available: {0}")]
    EmptyData(&'static str),

    #[error("crypto operation failed: {0}")]
    CryptoFailure(&'static str),

    #[error("stream underflow: needed {needed} bytes, {available} remain")]
    Underflow { needed: usize, available: usize },

    #[error("graph edge endpoint {node} is out of bounds")]
    GraphBuild { node: u16 },

    #[error("found path does not satisfy the graph")]
    PathInvalid,

    #[error("cannot assemble solution: {0} is empty")]
    AssemblyEmpty(&'static str),

    #[error("invalid thread count {requested}: must be in 1..={max}")]
    InvalidThreadCount { requested: usize, max: usize },
}

/// Generates a fresh Kyber-768 key pair.
pub fn kem_keypair() -> (kyber768::PublicKey, kyber768::SecretKey) {
    kyber768::keypair()
}

/// Parses public key bytes; wrong length or malformed input is rejected.
pub fn parse_public_key(bytes: &[u8]) -> Result<kyber768::PublicKey, QyraError> {
    kyber768::PublicKey::from_bytes(bytes).map_err(|_| QyraError::InvalidKey("public key"))
}

/// Parses secret key bytes; wrong length or malformed input is rejected.
pub fn parse_secret_key(bytes: &[u8]) -> Result<kyber768::SecretKey, QyraError> {
    kyber768::SecretKey::from_bytes(bytes).map_err(|_| QyraError::InvalidKey("secret key"))
}

/// Encapsulates a fresh shared secret under `public_key`.
///
/// Returns the 1088-byte KEM ciphertext together with the shared
/// secret. Encapsulation randomness is consumed internally and never
/// stored.
pub fn kem_encaps(public_key: &kyber768::PublicKey) -> (Vec<u8>, SharedSecretBytes) {
    let (shared, ciphertext) = kyber768::encapsulate(public_key);
    let mut secret = Zeroizing::new([0u8; KEM_SHARED_SECRET_SIZE]);
    secret.copy_from_slice(shared.as_bytes());
    (ciphertext.as_bytes().to_vec(), secret)
}

/// Recovers the shared secret from a KEM ciphertext.
///
/// Kyber decapsulation is implicit-rejection: a forged ciphertext of
/// the right length still yields a (garbage) secret, which then fails
/// downstream at AES unpadding or the plaintext comparison.
pub fn kem_decaps(
    secret_key: &kyber768::SecretKey,
    ciphertext: &[u8],
) -> Result<SharedSecretBytes, QyraError> {
    let ciphertext = kyber768::Ciphertext::from_bytes(ciphertext)
        .map_err(|_| QyraError::CryptoFailure("malformed KEM ciphertext"))?;
    let shared = kyber768::decapsulate(&ciphertext, secret_key);
    let mut secret = Zeroizing::new([0u8; KEM_SHARED_SECRET_SIZE]);
    secret.copy_from_slice(shared.as_bytes());
    Ok(secret)
}

/// Encrypts `plaintext` under the shared secret with AES-256-CBC and
/// PKCS#7 padding, returning the ciphertext and the fresh random IV.
pub fn aes256cbc_encrypt(
    plaintext: &[u8],
    key: &[u8; KEM_SHARED_SECRET_SIZE],
) -> Result<(Vec<u8>, [u8; IV_SIZE]), QyraError> {
    if plaintext.is_empty() {
        return Err(QyraError::EmptyData("plaintext"));
    }

    let mut iv = [0u8; IV_SIZE];
    rand::rngs::OsRng
        .try_fill_bytes(&mut iv)
        .map_err(|_| QyraError::CryptoFailure("IV generation"))?;

    let cipher = Aes256CbcEnc::new_from_slices(key, &iv)
        .map_err(|_| QyraError::CryptoFailure("AES key/IV setup"))?;
    let enc = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);
    Ok((enc, iv))
}

/// Decrypts AES-256-CBC ciphertext; fails on a wrong key or broken
/// padding without leaking the partially decrypted buffer.
pub fn aes256cbc_decrypt(
    enc: &[u8],
    key: &[u8; KEM_SHARED_SECRET_SIZE],
    iv: &[u8],
) -> Result<Zeroizing<Vec<u8>>, QyraError> {
    if enc.is_empty() {
        return Err(QyraError::EmptyData("ciphertext"));
    }
    if iv.len() != IV_SIZE {
        return Err(QyraError::CryptoFailure("IV length"));
    }

    let cipher = Aes256CbcDec::new_from_slices(key, iv)
        .map_err(|_| QyraError::CryptoFailure("AES key/IV setup"))?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(enc)
        .map(Zeroizing::new)
        .map_err(|_| QyraError::CryptoFailure("AES decryption"))
}

/// The full 32-byte BLAKE3 digest of `data`.
pub fn blake3_32(data: &[u8]) -> [u8; HASH_SIZE] {
    let mut hasher = Hasher::new();
    hasher.update(data);
    *hasher.finalize().as_bytes()
}

/// PKCS#7 output length for a given plaintext length.
pub const fn padded_len(plaintext_len: usize) -> usize {
    (plaintext_len / IV_SIZE + 1) * IV_SIZE
}

const _: () = assert!(padded_len(PLAINTEXT_SIZE) == ENC_SIZE);
