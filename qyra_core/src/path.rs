use std::sync::Mutex;
use std::thread;

use subtle::ConstantTimeEq;

use crate::constants::{HASH_SIZE, MAX_NODES};
use crate::crypto::blake3_32;
use crate::graph::Graph;
use crate::stream::Stream;
use crate::utils::format_hex;

/// Longest-path search over a derived graph.
///
/// Stateless with respect to graphs: every operation takes the graph
/// by reference, and only the most recently found node sequence is
/// retained.
#[derive(Clone, Debug, Default)]
pub struct Path {
    nodes: Vec<u16>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_nodes(nodes: Vec<u16>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[u16] {
        &self.nodes
    }

    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Finds the longest start-rooted chain in `graph`.
    ///
    /// The node space is split into one contiguous range per worker
    /// (`graph.num_threads()` of them, the last taking the
    /// remainder). Workers walk every non-empty start node in their
    /// range; a walk that reaches a successor-less node competes for
    /// the shared longest path under a strict length comparison, so
    /// an equally long late arrival never displaces the incumbent.
    /// A walk that closes a cycle ends silently.
    pub fn find_dfs(&mut self, graph: &Graph) -> Vec<u16> {
        self.clear();

        let workers = graph.num_threads().max(1);
        let per_worker = MAX_NODES / workers;
        let longest: Mutex<Vec<u16>> = Mutex::new(Vec::new());

        thread::scope(|scope| {
            for index in 0..workers {
                let longest = &longest;
                let range_start = index * per_worker;
                let range_end = if index + 1 == workers {
                    MAX_NODES
                } else {
                    range_start + per_worker
                };
                scope.spawn(move || {
                    let mut visited = vec![false; MAX_NODES];
                    let mut current: Vec<u16> = Vec::new();
                    for start in range_start..range_end {
                        if graph.successor(start as u16).is_none() {
                            continue;
                        }
                        walk_chain(graph, start as u16, &mut visited, &mut current, longest);
                    }
                });
            }
        });

        self.nodes = longest
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.nodes.clone()
    }

    /// Checks that every consecutive pair of nodes is an edge of
    /// `graph`. The empty path is invalid.
    pub fn is_valid(&self, graph: &Graph) -> bool {
        if self.nodes.is_empty() {
            return false;
        }
        self.nodes.windows(2).all(|pair| {
            let (from, to) = (pair[0], pair[1]);
            (from as usize) < MAX_NODES
                && (to as usize) < MAX_NODES
                && graph.successor(from) == Some(to)
        })
    }

    /// BLAKE3 over the little-endian u16 encoding of the nodes.
    pub fn hash(&self) -> [u8; HASH_SIZE] {
        let mut s = Stream::new();
        for &node in &self.nodes {
            s.write_u16(node);
        }
        blake3_32(s.data())
    }

    /// Re-runs the search on `graph` and compares the resulting path
    /// hash against `expected`.
    pub fn validate(&mut self, expected: &[u8], graph: &Graph) -> bool {
        self.find_dfs(graph);
        let found = self.hash();
        expected.ct_eq(&found).into()
    }

    pub fn to_hex(&self) -> String {
        let mut s = Stream::new();
        for &node in &self.nodes {
            s.write_u16(node);
        }
        format_hex(s.data())
    }
}

/// Walks the out-degree-≤-1 chain from `start`, recording it as the
/// new longest path only when it ends at a successor-less node and
/// strictly beats the incumbent.
fn walk_chain(
    graph: &Graph,
    start: u16,
    visited: &mut [bool],
    current: &mut Vec<u16>,
    longest: &Mutex<Vec<u16>>,
) {
    let mut node = start;
    loop {
        visited[node as usize] = true;
        current.push(node);
        match graph.successor(node) {
            None => {
                let mut best = longest.lock().unwrap_or_else(|p| p.into_inner());
                if current.len() > best.len() {
                    *best = current.clone();
                }
                break;
            }
            Some(next) if visited[next as usize] => break,
            Some(next) => node = next,
        }
    }
    for &walked in current.iter() {
        visited[walked as usize] = false;
    }
    current.clear();
}
