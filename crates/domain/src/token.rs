use primitive_types::H160;

/// 20-byte account / token identifier. `Address::zero()` is the null address.
pub type Address = H160;

/// Orders two token addresses the way pools key them (`token0 < token1`).
pub fn sort_tokens(a: Address, b: Address) -> (Address, Address) {
    if a < b { (a, b) } else { (b, a) }
}
