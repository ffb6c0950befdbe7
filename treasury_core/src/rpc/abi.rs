//! Decoders for raw `eth_call` results (hex strings of 32-byte words).

use alloy_primitives::U256;

pub const TOKEN0: &str = "0x0dfe1681";
pub const TOKEN1: &str = "0xd21220a7";
pub const GET_RESERVES: &str = "0x0902f1ac";
pub const TOTAL_SUPPLY: &str = "0x18160ddd";
pub const DECIMALS: &str = "0x313ce567";
pub const SYMBOL: &str = "0x95d89b41";

const WORD: usize = 32;

pub fn bytes(raw: &str) -> Option<Vec<u8>> {
    let trimmed = raw.trim().trim_start_matches("0x");
    if trimmed.is_empty() {
        return None;
    }
    hex::decode(trimmed).ok()
}

fn word(data: &[u8], index: usize) -> Option<&[u8]> {
    data.get(index * WORD..(index + 1) * WORD)
}

/// A word used as a byte offset or length into `data`; larger values cannot
/// point inside it.
fn position(data: &[u8], word: &[u8]) -> Option<usize> {
    let value = U256::from_be_slice(word);
    if value > U256::from(data.len()) {
        return None;
    }
    Some(value.as_limbs()[0] as usize)
}

/// Address in the low 20 bytes of the first word, lowercased with `0x`.
pub fn address(raw: &str) -> Option<String> {
    let data = bytes(raw)?;
    let first = word(&data, 0)?;
    Some(format!("0x{}", hex::encode(&first[12..])))
}

pub fn uint(raw: &str) -> Option<U256> {
    let data = bytes(raw)?;
    word(&data, 0).map(U256::from_be_slice)
}

pub fn to_f64(value: U256) -> f64 {
    value.to_string().parse::<f64>().unwrap_or(0.0)
}

/// `decimals()`; anything outside 1..=77 is treated as unreadable.
pub fn decimals(raw: &str) -> Option<u32> {
    let value = uint(raw)?;
    if value.is_zero() || value > U256::from(77u8) {
        return None;
    }
    Some(value.as_limbs()[0] as u32)
}

/// `getReserves()` returns `(uint112, uint112, uint32)`; only the reserves matter.
pub fn reserves(raw: &str) -> Option<(U256, U256)> {
    let data = bytes(raw)?;
    let r0 = word(&data, 0).map(U256::from_be_slice)?;
    let r1 = word(&data, 1).map(U256::from_be_slice)?;
    Some((r0, r1))
}

/// ABI `string` result: word 0 holds the offset of the length word, the bytes
/// follow it. Tokens that return a right-padded `bytes32` are read too.
pub fn string(raw: &str) -> Option<String> {
    let data = bytes(raw)?;

    let text = if data.len() >= 2 * WORD {
        let offset = position(&data, word(&data, 0)?)?;
        let start = offset.checked_add(WORD)?;
        let len = position(&data, data.get(offset..start)?)?;
        data.get(start..start.checked_add(len)?)?.to_vec()
    } else if data.len() == WORD {
        data
    } else {
        return None;
    };

    let decoded = String::from_utf8_lossy(&text).replace('\0', "");
    let decoded = decoded.trim();
    if decoded.is_empty() { None } else { Some(decoded.to_string()) }
}

/// Hex quantity as returned by `eth_getBalance`.
pub fn quantity(raw: &str) -> Option<U256> {
    let trimmed = raw.trim().trim_start_matches("0x");
    if trimmed.is_empty() {
        return None;
    }
    U256::from_str_radix(trimmed, 16).ok()
}

/// Scales a raw integer amount by `10^decimals`.
pub fn scaled(value: U256, decimals: u32) -> f64 {
    to_f64(value) / 10f64.powi(decimals as i32)
}
