//! Graph-traversal proof of work.
//!
//! A miner turns `(header, nonce)` into a pseudo-random functional
//! graph: a Kyber-768 encapsulation yields a shared secret, the
//! secret AES-256-CBC-encrypts `header ‖ nonce`, and the ciphertext
//! bytes — reread as 12-bit node indices — become the edges. The
//! published work is the BLAKE3 hash of the longest DFS chain through
//! that graph, bound to the crypto artifacts in a fixed 1280-byte
//! solution envelope that any holder of the secret key can verify.

pub mod constants;
pub mod crypto;
pub mod graph;
pub mod path;
pub mod session;
pub mod stream;
pub mod utils;

pub use crate::constants::{
    ENC_SIZE, HASH_SIZE, HEADER_SIZE, IV_SIZE, KEM_CIPHERTEXT_SIZE, KEM_PUBLIC_KEY_SIZE,
    KEM_SECRET_KEY_SIZE, KEM_SHARED_SECRET_SIZE, MAX_NODES, NONCE_SIZE, PLAINTEXT_SIZE,
    SOLUTION_SIZE, TOTAL_SIZE,
};
pub use crate::crypto::{
    aes256cbc_decrypt, aes256cbc_encrypt, blake3_32, kem_decaps, kem_encaps, kem_keypair,
    QyraError, SharedSecretBytes,
};
pub use crate::graph::Graph;
pub use crate::path::Path;
pub use crate::session::{CryptoData, Qyra, SolutionData};
pub use crate::stream::Stream;
pub use crate::utils::{format_hex, get_time, pack12, parse_hex};
