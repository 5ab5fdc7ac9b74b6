use crate::error::ValidationError;

const ADDRESS_HEX_LEN: usize = 40;

/// Checks for `0x` followed by exactly 40 hex digits (20 bytes).
/// Mixed case is accepted; no EIP-55 checksum check is done.
pub fn validate_evm_address(address: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::InvalidAddress {
        address: address.to_string(),
    };

    let body = address.strip_prefix("0x").ok_or_else(invalid)?;
    if body.len() != ADDRESS_HEX_LEN {
        return Err(invalid());
    }
    hex::decode(body).map_err(|_| invalid())?;
    Ok(())
}

pub fn is_valid_evm_address(address: &str) -> bool {
    validate_evm_address(address).is_ok()
}

/// `0x1234...abcd` form used in log lines.
pub fn shorten_address(address: &str) -> String {
    if address.len() <= 10 || !address.is_ascii() {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}
