//! Fixed sizes shared by every component of the engine.
//!
//! The plaintext fed to AES-256-CBC is `header ‖ nonce` = 108 + 32 =
//! 140 bytes. CBC operates on 16-byte blocks, so PKCS#7 padding
//! always brings the encrypted output to 144 bytes.

/// Kyber-768 public key length in bytes (1184).
pub const KEM_PUBLIC_KEY_SIZE: usize =
    pqcrypto_kyber::ffi::PQCLEAN_KYBER768_CLEAN_CRYPTO_PUBLICKEYBYTES;

/// Kyber-768 secret key length in bytes (2400).
pub const KEM_SECRET_KEY_SIZE: usize =
    pqcrypto_kyber::ffi::PQCLEAN_KYBER768_CLEAN_CRYPTO_SECRETKEYBYTES;

/// Kyber-768 KEM ciphertext length in bytes (1088).
pub const KEM_CIPHERTEXT_SIZE: usize =
    pqcrypto_kyber::ffi::PQCLEAN_KYBER768_CLEAN_CRYPTO_CIPHERTEXTBYTES;

/// Kyber-768 shared secret length in bytes (32); doubles as the AES-256 key.
pub const KEM_SHARED_SECRET_SIZE: usize =
    pqcrypto_kyber::ffi::PQCLEAN_KYBER768_CLEAN_CRYPTO_BYTES;

/// Block header length in bytes.
pub const HEADER_SIZE: usize = 108;

/// Mining nonce length in bytes.
pub const NONCE_SIZE: usize = 32;

/// Length of `header ‖ nonce`.
pub const PLAINTEXT_SIZE: usize = HEADER_SIZE + NONCE_SIZE;

/// Length of the AES-256-CBC ciphertext of a 140-byte plaintext.
pub const ENC_SIZE: usize = 144;

/// AES block / initialization vector length.
pub const IV_SIZE: usize = 16;

/// BLAKE3 digest length.
pub const HASH_SIZE: usize = 32;

/// Length of the graph-recovery part of a solution: `enc ‖ iv ‖ ct`.
pub const TOTAL_SIZE: usize = ENC_SIZE + IV_SIZE + KEM_CIPHERTEXT_SIZE;

/// Length of a full solution envelope: `enc ‖ iv ‖ ct ‖ path_hash`.
pub const SOLUTION_SIZE: usize = TOTAL_SIZE + HASH_SIZE;

/// Node indices are 12-bit; the graph always spans this many rows.
pub const MAX_NODES: usize = 4096;
