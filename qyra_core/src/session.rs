use log::error;

use crate::constants::{HASH_SIZE, SOLUTION_SIZE, TOTAL_SIZE};
use crate::crypto::QyraError;
use crate::graph::{hardware_concurrency, Graph};
use crate::path::Path;
use crate::stream::Stream;
use crate::utils::format_hex;

/// The decomposed crypto artifacts carried by a solution.
#[derive(Clone, Debug, Default)]
pub struct CryptoData {
    pub enc: Vec<u8>,
    pub iv: Vec<u8>,
    pub ciphertext: Vec<u8>,
    pub hash: Vec<u8>,
}

/// A mined solution: the raw 1280-byte envelope plus its fields.
#[derive(Clone, Debug, Default)]
pub struct SolutionData {
    pub crypto: CryptoData,
    solution: Vec<u8>,
}

impl SolutionData {
    pub fn clear(&mut self) {
        self.crypto = CryptoData::default();
        self.solution.clear();
    }

    pub fn get(&self) -> Vec<u8> {
        self.solution.clone()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.solution
    }

    pub fn to_hex(&self) -> String {
        format_hex(&self.solution)
    }

    pub fn size(&self) -> usize {
        self.solution.len()
    }

    /// Binds the four fields into the `enc ‖ iv ‖ ct ‖ hash` layout.
    fn assemble(&mut self) -> Result<(), QyraError> {
        if self.crypto.enc.is_empty() {
            return Err(QyraError::AssemblyEmpty("enc"));
        }
        if self.crypto.iv.is_empty() {
            return Err(QyraError::AssemblyEmpty("iv"));
        }
        if self.crypto.ciphertext.is_empty() {
            return Err(QyraError::AssemblyEmpty("ciphertext"));
        }
        if self.crypto.hash.is_empty() {
            return Err(QyraError::AssemblyEmpty("path hash"));
        }

        let mut s = Stream::new();
        s.write_bytes(&self.crypto.enc);
        s.write_bytes(&self.crypto.iv);
        s.write_bytes(&self.crypto.ciphertext);
        s.write_bytes(&self.crypto.hash);
        self.solution = s.into_inner();
        Ok(())
    }
}

/// The proof-of-work session: graph derivation, path search, and the
/// solution envelope, behind the public mine/validate API.
///
/// Every failure surfaces as `false`; diagnostics go to the log and
/// never abort the process.
#[derive(Default)]
pub struct Qyra {
    graph: Graph,
    path: Path,
    pub solution: SolutionData,
}

impl Qyra {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the Kyber-768 key pair used by all later operations.
    pub fn initialize(&mut self, public_key: &[u8], secret_key: &[u8]) -> bool {
        match self.graph.initialize(public_key, secret_key) {
            Ok(()) => true,
            Err(err) => {
                error!("initialization failed: {err}");
                false
            }
        }
    }

    /// Sets the DFS worker count to the host core count.
    pub fn enable_parallel_dfs(&mut self) {
        if let Err(err) = self.graph.set_num_threads(hardware_concurrency()) {
            error!("enabling parallel DFS failed: {err}");
        }
    }

    /// Explicit worker count, `1..=hardware_concurrency()`.
    pub fn set_num_threads(&mut self, n: usize) -> bool {
        match self.graph.set_num_threads(n) {
            Ok(()) => true,
            Err(err) => {
                error!("setting thread count failed: {err}");
                false
            }
        }
    }

    pub fn set_header(&mut self, vch: &[u8]) {
        self.graph.set_header(vch);
    }

    pub fn set_nonce(&mut self, vch: &[u8]) {
        self.graph.set_nonce(vch);
    }

    /// Derives a fresh graph from the current `(header, nonce)`,
    /// searches it, and assembles the solution envelope.
    pub fn mine(&mut self) -> bool {
        match self.mine_inner() {
            Ok(()) => true,
            Err(err) => {
                error!("mining failed: {err}");
                false
            }
        }
    }

    fn mine_inner(&mut self) -> Result<(), QyraError> {
        self.graph.generate()?;

        self.path.find_dfs(&self.graph);
        if self.path.size() == 0 {
            return Err(QyraError::EmptyData("path"));
        }
        if !self.path.is_valid(&self.graph) {
            return Err(QyraError::PathInvalid);
        }

        self.solution.clear();
        self.solution.crypto = CryptoData {
            enc: self.graph.enc_message().to_vec(),
            iv: self.graph.iv().to_vec(),
            ciphertext: self.graph.kem_ciphertext().to_vec(),
            hash: self.path.hash().to_vec(),
        };
        self.solution.assemble()
    }

    /// Checks a received envelope against the current `(header,
    /// nonce)`: recovers the graph from the crypto artifacts, re-runs
    /// the search, and compares path hashes. Buffers longer than one
    /// envelope are accepted; trailing bytes are ignored.
    pub fn validate(&mut self, envelope: &[u8]) -> bool {
        match self.validate_inner(envelope) {
            Ok(valid) => valid,
            Err(err) => {
                error!("validation failed: {err}");
                false
            }
        }
    }

    fn validate_inner(&mut self, envelope: &[u8]) -> Result<bool, QyraError> {
        if envelope.len() < SOLUTION_SIZE {
            return Err(QyraError::InvalidDataSize {
                expected: SOLUTION_SIZE,
                found: envelope.len(),
            });
        }

        let mut s = Stream::from(envelope);
        let graph_part = s.read_bytes(TOTAL_SIZE)?.to_vec();
        let path_hash = s.read_bytes(HASH_SIZE)?.to_vec();

        if !self.graph.validate(&graph_part)? {
            return Ok(false);
        }
        Ok(self.path.validate(&path_hash, &self.graph))
    }

    /// Whether the currently held path satisfies the currently held
    /// graph.
    pub fn is_valid(&self) -> bool {
        self.path.is_valid(&self.graph)
    }
}
