use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::thread;

use log::debug;
use pqcrypto_kyber::kyber768;
use subtle::ConstantTimeEq;

use crate::constants::{
    ENC_SIZE, HASH_SIZE, IV_SIZE, KEM_CIPHERTEXT_SIZE, MAX_NODES, TOTAL_SIZE,
};
use crate::crypto::{
    self, aes256cbc_decrypt, aes256cbc_encrypt, blake3_32, kem_decaps, kem_encaps, QyraError,
};
use crate::stream::Stream;
use crate::utils::{format_hex, pack12};

/// Number of cores the host exposes; the upper bound for DFS workers.
pub(crate) fn hardware_concurrency() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

struct SessionKeys {
    public: kyber768::PublicKey,
    secret: kyber768::SecretKey,
}

/// The keyed graph derivation engine.
///
/// Owns the adjacency derived from `(header, nonce, keys)` together
/// with the crypto artifacts (`enc`, `iv`, `ct`) that make the
/// derivation reproducible on the verifying side. Every row holds at
/// most one successor, so the adjacency is kept as one `Option<u16>`
/// per node; the hashing byte layout is the packed row-bitset form.
pub struct Graph {
    adjacency: Vec<Option<u16>>,
    header: Vec<u8>,
    nonce: Vec<u8>,
    keys: Option<SessionKeys>,
    enc: Vec<u8>,
    iv: Vec<u8>,
    ciphertext: Vec<u8>,
    n_threads: usize,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        Self {
            adjacency: vec![None; MAX_NODES],
            header: Vec::new(),
            nonce: Vec::new(),
            keys: None,
            enc: Vec::new(),
            iv: Vec::new(),
            ciphertext: Vec::new(),
            n_threads: 1,
        }
    }

    /// Copies the session key pair in and resets the adjacency.
    ///
    /// Both buffers must parse as Kyber-768 key material; anything
    /// else is rejected with [`QyraError::InvalidKey`].
    pub fn initialize(&mut self, public_key: &[u8], secret_key: &[u8]) -> Result<(), QyraError> {
        let public = crypto::parse_public_key(public_key)?;
        let secret = crypto::parse_secret_key(secret_key)?;
        self.keys = Some(SessionKeys { public, secret });
        self.clear();
        Ok(())
    }

    pub fn set_header(&mut self, vch: &[u8]) {
        self.header = vch.to_vec();
    }

    pub fn set_nonce(&mut self, vch: &[u8]) {
        self.nonce = vch.to_vec();
    }

    /// Sets the DFS worker count; must be in `1..=hardware_concurrency()`.
    pub fn set_num_threads(&mut self, n: usize) -> Result<(), QyraError> {
        let max = hardware_concurrency();
        if n == 0 || n > max {
            return Err(QyraError::InvalidThreadCount { requested: n, max });
        }
        self.n_threads = n;
        Ok(())
    }

    pub fn num_threads(&self) -> usize {
        self.n_threads
    }

    /// Empties every adjacency row.
    pub fn clear(&mut self) {
        self.adjacency.clear();
        self.adjacency.resize(MAX_NODES, None);
    }

    /// Mining-side derivation: encapsulate a fresh shared secret,
    /// encrypt `header ‖ nonce` under it, and rebuild the adjacency
    /// from the encrypted bytes.
    pub fn generate(&mut self) -> Result<(), QyraError> {
        let keys = self
            .keys
            .as_ref()
            .ok_or(QyraError::InvalidKey("session not initialized"))?;

        let mut s = Stream::new();
        s.write_bytes(&self.header);
        s.write_bytes(&self.nonce);

        let (ciphertext, shared) = kem_encaps(&keys.public);
        let (enc, iv) = aes256cbc_encrypt(s.data(), &shared)?;
        debug!("derived artifacts: enc={} B, ct={} B", enc.len(), ciphertext.len());

        self.ciphertext = ciphertext;
        self.iv = iv.to_vec();
        self.enc = enc;

        let enc = self.enc.clone();
        self.update_adjacency(&enc)
    }

    /// Verification-side derivation from a received `enc ‖ iv ‖ ct`.
    ///
    /// Returns `Ok(false)` when the decrypted plaintext does not match
    /// the session's `header ‖ nonce`; the adjacency is left cleared
    /// so no stale round is ever observable.
    pub fn validate(&mut self, vch: &[u8]) -> Result<bool, QyraError> {
        if vch.len() != TOTAL_SIZE {
            return Err(QyraError::InvalidDataSize {
                expected: TOTAL_SIZE,
                found: vch.len(),
            });
        }
        let mut s = Stream::from(vch);
        let enc = s.read_bytes(ENC_SIZE)?.to_vec();
        let iv = s.read_bytes(IV_SIZE)?.to_vec();
        let ciphertext = s.read_bytes(KEM_CIPHERTEXT_SIZE)?.to_vec();

        self.clear();

        let keys = self
            .keys
            .as_ref()
            .ok_or(QyraError::InvalidKey("session not initialized"))?;
        let shared = kem_decaps(&keys.secret, &ciphertext)?;
        let plaintext = aes256cbc_decrypt(&enc, &shared, &iv)?;

        let mut expected = Stream::new();
        expected.write_bytes(&self.header);
        expected.write_bytes(&self.nonce);

        if plaintext.ct_eq(expected.data()).unwrap_u8() == 0 {
            return Ok(false);
        }

        self.enc = enc;
        self.iv = iv;
        self.ciphertext = ciphertext;

        let enc = self.enc.clone();
        self.update_adjacency(&enc)?;
        Ok(true)
    }

    /// Rebuilds the adjacency from raw bytes.
    ///
    /// Consecutive 12-bit indices form candidate edges `(u, v)`.
    /// Self-loops are skipped, as is any edge whose target already
    /// served as a source; surviving edges land first-write into the
    /// source row. The rule is load-bearing: any deviation changes
    /// every downstream hash.
    fn update_adjacency(&mut self, data: &[u8]) -> Result<(), QyraError> {
        self.clear();

        if data.is_empty() {
            return Err(QyraError::EmptyData("graph input"));
        }

        let edges = pack12(data);
        if edges.len() < 2 {
            return Err(QyraError::EmptyData("edge stream"));
        }

        let mut visited: HashSet<u16> = HashSet::new();
        for pair in edges.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            if from == to || visited.contains(&to) {
                continue;
            }
            self.add_edge(from, to)?;
            visited.insert(from);
        }
        Ok(())
    }

    /// First-write edge insertion: an occupied source row is left
    /// untouched and the call still succeeds.
    pub fn add_edge(&mut self, from: u16, to: u16) -> Result<(), QyraError> {
        if from as usize >= MAX_NODES {
            return Err(QyraError::GraphBuild { node: from });
        }
        if to as usize >= MAX_NODES {
            return Err(QyraError::GraphBuild { node: to });
        }
        let row = &mut self.adjacency[from as usize];
        if row.is_none() {
            *row = Some(to);
        }
        Ok(())
    }

    pub fn successor(&self, node: u16) -> Option<u16> {
        self.adjacency.get(node as usize).copied().flatten()
    }

    pub fn adjacency(&self) -> &[Option<u16>] {
        &self.adjacency
    }

    /// Every recorded edge as `(from, to)`, in row order.
    pub fn edges(&self) -> impl Iterator<Item = (u16, u16)> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .filter_map(|(from, to)| to.map(|to| (from as u16, to)))
    }

    /// Serializes the adjacency as `MAX_NODES` rows of `MAX_NODES / 8`
    /// bytes, bit `i` of a row setting bit `i % 8` of byte `i / 8`.
    fn row_bytes(&self) -> Vec<u8> {
        let row_len = MAX_NODES / 8;
        let mut data = vec![0u8; MAX_NODES * row_len];
        for (row, successor) in self.adjacency.iter().enumerate() {
            if let Some(to) = successor {
                let to = *to as usize;
                data[row * row_len + to / 8] |= 1 << (to % 8);
            }
        }
        data
    }

    /// BLAKE3 over the serialized adjacency.
    pub fn hash(&self) -> [u8; HASH_SIZE] {
        blake3_32(&self.row_bytes())
    }

    /// Hex rendering of the serialized adjacency.
    pub fn to_hex(&self) -> String {
        format_hex(&self.row_bytes())
    }

    pub fn enc_message(&self) -> &[u8] {
        &self.enc
    }

    pub fn kem_ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    /// Total number of adjacency cells, `MAX_NODES * MAX_NODES`.
    pub fn size(&self) -> usize {
        self.adjacency.len() * self.adjacency.len()
    }
}
