use ethers::types::{Address, U256};
use ethers::utils::to_checksum;

use super::provider::ProviderError;

/// Renders `raw / 10^decimals` as a decimal string.
///
/// Trailing fractional zeros are trimmed but one fractional digit is always
/// kept, so whole amounts read as `"1.0"` and zero reads as `"0.0"`.
pub fn format_units(raw: U256, decimals: u8) -> Result<String, ProviderError> {
    let scaled = ethers::utils::format_units(raw, decimals as u32).map_err(|e| {
        ProviderError::Contract(format!("Cannot scale by {} decimals: {}", decimals, e))
    })?;
    Ok(trim_fraction(&scaled))
}

fn trim_fraction(value: &str) -> String {
    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{}.0", whole)
    } else {
        format!("{}.{}", whole, fraction)
    }
}

/// `0x1234...abcd` style display form of an address.
pub fn shorten_address(address: &str, chars: usize) -> String {
    let address = address.trim();
    if address.len() <= chars * 2 + 2 {
        return address.to_string();
    }
    format!(
        "{}...{}",
        &address[..chars + 2],
        &address[address.len() - chars..]
    )
}

/// Shape check for a `0x`-prefixed 20-byte hex address.
pub fn is_valid_evm_address(value: &str) -> bool {
    let normalized = value.trim();
    normalized.starts_with("0x")
        && normalized.len() == 42
        && normalized[2..].chars().all(|c| c.is_ascii_hexdigit())
}

/// EIP-55 checksummed form, the way wallets display accounts.
pub fn display_address(address: &Address) -> String {
    to_checksum(address, None)
}
