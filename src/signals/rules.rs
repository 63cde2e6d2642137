use crate::core::AccountSnapshot;
use crate::signals::Finding;

/// A scoring rule that evaluates a single aspect of a wallet.
/// Returns `None` when its condition does not hold or its input is unknown.
pub trait Rule {
    fn name(&self) -> &str;
    fn evaluate(&self, account: &AccountSnapshot) -> Option<Finding>;
}

pub const NEW_ACCOUNT_DAYS: u32 = 7;
pub const YOUNG_ACCOUNT_DAYS: u32 = 30;
pub const HIGH_OWNER_COUNT: u32 = 20;

/// All wallet rules, in reporting order.
pub fn default_rules() -> Vec<Box<dyn Rule + Send + Sync>> {
    vec![
        Box::new(GlobalFreezeRule),
        Box::new(MasterKeyRule),
        Box::new(AccountAgeRule),
        Box::new(OwnerCountRule),
        Box::new(DomainMetadataRule),
        Box::new(MetadataListingRule),
        Box::new(DestTagRule),
    ]
}

// --- Individual Rules ---

struct GlobalFreezeRule;
impl Rule for GlobalFreezeRule {
    fn name(&self) -> &str { "global_freeze" }
    fn evaluate(&self, account: &AccountSnapshot) -> Option<Finding> {
        account
            .flags
            .global_freeze
            .then(|| Finding::new("Account has GlobalFreeze set", 3).badge("GlobalFreeze"))
    }
}

/// Master key disabled with no regular key left to sign with.
struct MasterKeyRule;
impl Rule for MasterKeyRule {
    fn name(&self) -> &str { "master_key" }
    fn evaluate(&self, account: &AccountSnapshot) -> Option<Finding> {
        (account.flags.disable_master && !account.regular_key_set).then(|| {
            Finding::new("Master key disabled without RegularKey", 2)
                .badge("Master disabled (no RegularKey)")
        })
    }
}

/// Age buckets are exclusive: a 5-day-old account scores +2, not +3.
struct AccountAgeRule;
impl Rule for AccountAgeRule {
    fn name(&self) -> &str { "account_age" }
    fn evaluate(&self, account: &AccountSnapshot) -> Option<Finding> {
        match account.age_days? {
            days if days < NEW_ACCOUNT_DAYS => Some(
                Finding::new(format!("Account age < {NEW_ACCOUNT_DAYS} days"), 2)
                    .detail(format!("{days} days")),
            ),
            days if days < YOUNG_ACCOUNT_DAYS => Some(
                Finding::new(format!("Account age < {YOUNG_ACCOUNT_DAYS} days"), 1)
                    .detail(format!("{days} days")),
            ),
            _ => None,
        }
    }
}

struct OwnerCountRule;
impl Rule for OwnerCountRule {
    fn name(&self) -> &str { "owner_count" }
    fn evaluate(&self, account: &AccountSnapshot) -> Option<Finding> {
        (account.owner_count > HIGH_OWNER_COUNT).then(|| {
            Finding::new(format!("High OwnerCount (>{HIGH_OWNER_COUNT})"), 1)
                .detail(account.owner_count.to_string())
        })
    }
}

/// Reports on the claimed domain even when nothing is scored, so the absence of
/// evidence stays visible.
struct DomainMetadataRule;
impl Rule for DomainMetadataRule {
    fn name(&self) -> &str { "domain_metadata" }
    fn evaluate(&self, account: &AccountSnapshot) -> Option<Finding> {
        let finding = match &account.domain {
            None => Finding::new("No domain configured", 0),
            Some(evidence) if evidence.metadata_found => {
                Finding::new("xrp.toml found on domain", -1)
                    .badge("xrp.toml")
                    .detail(evidence.domain.clone())
            }
            Some(evidence) => Finding::new("Domain set but xrp.toml not found", 0)
                .detail(evidence.domain.clone()),
        };
        Some(finding)
    }
}

struct MetadataListingRule;
impl Rule for MetadataListingRule {
    fn name(&self) -> &str { "metadata_listing" }
    fn evaluate(&self, account: &AccountSnapshot) -> Option<Finding> {
        let evidence = account.domain.as_ref()?;
        (evidence.metadata_found && evidence.address_listed)
            .then(|| Finding::new("Address listed in xrp.toml", -1).badge("TOML-listed"))
    }
}

struct DestTagRule;
impl Rule for DestTagRule {
    fn name(&self) -> &str { "require_dest_tag" }
    fn evaluate(&self, account: &AccountSnapshot) -> Option<Finding> {
        account
            .flags
            .require_dest_tag
            .then(|| Finding::new("RequireDestTag enabled", -1).badge("RequireDestTag"))
    }
}
