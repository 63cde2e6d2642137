//! Input validation and normalization for scan subjects.

/// Characters allowed in a classic address (base58, no `0`, `O`, `I`, `l`).
const BASE58: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

const ADDRESS_MIN_LEN: usize = 25;
const ADDRESS_MAX_LEN: usize = 36;

/// Cheap shape check for a classic XRP Ledger address. Does not verify the checksum.
pub fn is_valid_address(address: &str) -> bool {
    (ADDRESS_MIN_LEN..=ADDRESS_MAX_LEN).contains(&address.len())
        && address.starts_with('r')
        && address.chars().all(|c| BASE58.contains(c))
}

/// Strip scheme, path, and trailing slashes; lowercase.
///
/// `"HTTPS://Example.com/"` becomes `"example.com"`.
pub fn clean_domain(input: &str) -> String {
    let trimmed = input.trim();
    let lower = trimmed.to_ascii_lowercase();
    let without_scheme = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .unwrap_or(&lower);
    let host = without_scheme.trim_end_matches('/');
    host.split(['/', '?', '#']).next().unwrap_or_default().to_string()
}

/// Key used for curated-list and lookalike matching: cleaned, without a leading `www.`.
pub fn match_key(input: &str) -> String {
    let clean = clean_domain(input);
    match clean.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => clean,
    }
}

/// Whether a cleaned domain is a plausible DNS hostname.
pub fn is_valid_domain(domain: &str) -> bool {
    if domain.is_empty() || domain.len() > 253 || !domain.contains('.') {
        return false;
    }
    domain.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

/// Decode the ledger `Domain` field (hex-encoded ASCII).
///
/// Invalid hex, non-UTF-8 bytes, and blank values all yield `None`. Trailing NUL
/// padding and trailing slashes are stripped.
pub fn decode_domain_hex(hex_value: &str) -> Option<String> {
    let bytes = hex::decode(hex_value.trim()).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    let domain = text.trim_end_matches('\0').trim().trim_end_matches('/');
    if domain.is_empty() {
        None
    } else {
        Some(domain.to_string())
    }
}
