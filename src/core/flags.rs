use serde::{Deserialize, Serialize};

// AccountRoot ledger flags (lsf*).
pub const REQUIRE_DEST_TAG: u32 = 0x0002_0000;
pub const REQUIRE_AUTH: u32 = 0x0004_0000;
pub const DISALLOW_XRP: u32 = 0x0008_0000;
pub const DISABLE_MASTER: u32 = 0x0010_0000;
pub const NO_FREEZE: u32 = 0x0020_0000;
pub const GLOBAL_FREEZE: u32 = 0x0040_0000;
pub const DEFAULT_RIPPLE: u32 = 0x0080_0000;
pub const DEPOSIT_AUTH: u32 = 0x0100_0000;

/// The eight named account flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FlagSet {
    pub require_dest_tag: bool,
    pub require_auth: bool,
    #[serde(rename = "DisallowXRP")]
    pub disallow_xrp: bool,
    pub disable_master: bool,
    pub no_freeze: bool,
    pub global_freeze: bool,
    pub default_ripple: bool,
    pub deposit_auth: bool,
}

fn has(flags: u32, mask: u32) -> bool {
    flags & mask == mask
}

impl FlagSet {
    /// Decode a raw bitmask. A missing bitmask decodes to all-false.
    pub fn decode(raw: Option<u32>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        Self {
            require_dest_tag: has(raw, REQUIRE_DEST_TAG),
            require_auth: has(raw, REQUIRE_AUTH),
            disallow_xrp: has(raw, DISALLOW_XRP),
            disable_master: has(raw, DISABLE_MASTER),
            no_freeze: has(raw, NO_FREEZE),
            global_freeze: has(raw, GLOBAL_FREEZE),
            default_ripple: has(raw, DEFAULT_RIPPLE),
            deposit_auth: has(raw, DEPOSIT_AUTH),
        }
    }

    /// Inverse of [`FlagSet::decode`].
    #[cfg(test)]
    pub fn bits(&self) -> u32 {
        [
            (self.require_dest_tag, REQUIRE_DEST_TAG),
            (self.require_auth, REQUIRE_AUTH),
            (self.disallow_xrp, DISALLOW_XRP),
            (self.disable_master, DISABLE_MASTER),
            (self.no_freeze, NO_FREEZE),
            (self.global_freeze, GLOBAL_FREEZE),
            (self.default_ripple, DEFAULT_RIPPLE),
            (self.deposit_auth, DEPOSIT_AUTH),
        ]
        .iter()
        .filter(|(set, _)| *set)
        .fold(0, |acc, (_, mask)| acc | mask)
    }
}
