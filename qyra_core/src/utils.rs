//! Small co-shipped helpers: the 12-bit packer that projects
//! ciphertext bytes onto the node space, hex formatting, and a
//! POSIX timestamp.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::crypto::QyraError;

/// Reinterprets a byte slice as a little-endian stream of 12-bit
/// groups and returns them as `u16` values.
///
/// The input is logically right-padded with zero bytes to a multiple
/// of 3. Each aligned 3-byte group `[b0, b1, b2]` forms the 24-bit
/// value `v = b0 | b1 << 8 | b2 << 16` and emits `v & 0x0FFF`
/// followed by `(v >> 12) & 0x0FFF`, so the output holds
/// `2 * ceil(len / 3)` values, every one a valid node index.
pub fn pack12(input: &[u8]) -> Vec<u16> {
    let mut output = Vec::with_capacity(2 * input.len().div_ceil(3));
    for chunk in input.chunks(3) {
        let mut group = [0u8; 3];
        group[..chunk.len()].copy_from_slice(chunk);
        let value = u32::from(group[0]) | u32::from(group[1]) << 8 | u32::from(group[2]) << 16;
        output.push((value & 0x0FFF) as u16);
        output.push((value >> 12 & 0x0FFF) as u16);
    }
    output
}

/// Lowercase hex rendering, two digits per byte.
pub fn format_hex(data: &[u8]) -> String {
    hex::encode(data)
}

/// Parses a hex string; odd-length or non-hex input is rejected.
pub fn parse_hex(input: &str) -> Result<Vec<u8>, QyraError> {
    hex::decode(input).map_err(|_| QyraError::CryptoFailure("invalid hex input"))
}

/// Seconds since the Unix epoch.
pub fn get_time() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as u32)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack12_literal_group() {
        // [0x01, 0x23, 0x45] assembles the 24-bit value 0x452301.
        assert_eq!(pack12(&[0x01, 0x23, 0x45]), vec![0x301, 0x452]);
    }

    #[test]
    fn pack12_pads_short_input() {
        assert_eq!(pack12(&[0xFF]), vec![0x0FF, 0x000]);
    }

    #[test]
    fn pack12_empty_is_empty() {
        assert!(pack12(&[]).is_empty());
    }

    #[test]
    fn pack12_length_law() {
        for len in 0..32usize {
            let input = vec![0xA5u8; len];
            assert_eq!(pack12(&input).len(), 2 * len.div_ceil(3));
        }
    }

    #[test]
    fn pack12_values_fit_node_space() {
        let input: Vec<u8> = (0..=255u8).cycle().take(999).collect();
        assert!(pack12(&input).iter().all(|&v| v < 4096));
    }

    #[test]
    fn hex_roundtrip() {
        let bytes = vec![0x00u8, 0x01, 0xAB, 0xFF, 0x7E];
        let encoded = format_hex(&bytes);
        assert_eq!(encoded, "0001abff7e");
        assert_eq!(encoded.len(), 2 * bytes.len());
        assert_eq!(parse_hex(&encoded).unwrap(), bytes);
    }

    #[test]
    fn parse_hex_rejects_odd_length() {
        assert!(parse_hex("abc").is_err());
        assert!(parse_hex("zz").is_err());
    }

    #[test]
    fn time_is_past_2024() {
        assert!(get_time() > 1_700_000_000);
    }
}
