//! Read-time phone variants.
//!
//! Stored phone numbers were typed by staff and customers in whatever shape
//! they liked, so instead of trusting one canonical form a lookup tries every
//! plausible spelling of the input. Each rule below answers one known
//! data-quality anomaly; rules only ever add candidates.

use crate::domain::phone::{digits_only, has_usable_digits, normalize_phone};
use phonenumber::Mode;
use serde::Serialize;

/// Deployment default country calling code (Italy).
pub const DEFAULT_COUNTRY_CODE: &str = "39";
/// Ireland's calling code, which collides with Italian mobiles starting `353`.
pub const IRISH_COUNTRY_CODE: &str = "353";
/// Candidates shorter than this match too much to be safe.
pub const MIN_VARIANT_LEN: usize = 7;

const DOUBLE_PREFIX_LENGTHS: [usize; 3] = [3, 2, 1];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantRule {
    Original,
    Normalized,
    DigitsOnly,
    Canonical,
    DoublePrefixCollapse,
    ItalyToIreland,
    IrelandToItaly,
    MissingPlus,
    ItalyPrefixStripped,
    ItalyPrefixAdded,
    BareItalyDigits,
    TrunkZeroStripped,
}

impl VariantRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariantRule::Original => "original",
            VariantRule::Normalized => "normalized",
            VariantRule::DigitsOnly => "digits_only",
            VariantRule::Canonical => "canonical",
            VariantRule::DoublePrefixCollapse => "double_prefix_collapse",
            VariantRule::ItalyToIreland => "italy_to_ireland",
            VariantRule::IrelandToItaly => "ireland_to_italy",
            VariantRule::MissingPlus => "missing_plus",
            VariantRule::ItalyPrefixStripped => "italy_prefix_stripped",
            VariantRule::ItalyPrefixAdded => "italy_prefix_added",
            VariantRule::BareItalyDigits => "bare_italy_digits",
            VariantRule::TrunkZeroStripped => "trunk_zero_stripped",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhoneVariant {
    pub value: String,
    pub rule: VariantRule,
}

/// Ordered, duplicate-free set of candidate spellings.
///
/// Iteration order is generation order, which is also the order lookups
/// query in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VariantSet {
    entries: Vec<PhoneVariant>,
}

impl VariantSet {
    fn insert(&mut self, value: impl Into<String>, rule: VariantRule) {
        let value = value.into();
        if value.is_empty() || self.contains(&value) {
            return;
        }
        self.entries.push(PhoneVariant { value, rule });
    }

    pub fn contains(&self, value: &str) -> bool {
        self.entries.iter().any(|entry| entry.value == value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.value.as_str())
    }

    /// Every surviving variant with the rule that first produced it.
    pub fn explain(&self) -> &[PhoneVariant] {
        &self.entries
    }

    pub fn into_vec(self) -> Vec<String> {
        self.entries.into_iter().map(|entry| entry.value).collect()
    }
}

/// Every candidate spelling of `raw`, in query order.
///
/// Input whose normalized form carries no digit counts as empty: it yields
/// no variants, not even the raw string.
pub fn phone_variants(raw: &str) -> VariantSet {
    let mut set = VariantSet::default();
    let normalized = normalize_phone(raw);
    if raw.is_empty() || !has_usable_digits(&normalized) {
        return set;
    }
    let digits = digits_only(&normalized);
    let plus = normalized.starts_with('+');
    let italy_plus = format!("+{DEFAULT_COUNTRY_CODE}");
    let ireland_plus = format!("+{IRISH_COUNTRY_CODE}");

    set.insert(raw, VariantRule::Original);
    set.insert(normalized.as_str(), VariantRule::Normalized);
    set.insert(digits.as_str(), VariantRule::DigitsOnly);

    if let Some(canonical) = canonical_e164(&normalized) {
        set.insert(canonical, VariantRule::Canonical);
    }

    if plus {
        if let Some(collapsed) = collapse_double_prefix(&digits) {
            set.insert(collapsed, VariantRule::DoublePrefixCollapse);
        }
    }

    let italy_ireland = format!("{italy_plus}{IRISH_COUNTRY_CODE}");
    if normalized.starts_with(&italy_ireland) {
        set.insert(
            format!("+{}", &normalized[italy_plus.len()..]),
            VariantRule::ItalyToIreland,
        );
    }

    if normalized.starts_with(&ireland_plus) {
        set.insert(
            format!("{italy_plus}{}", &normalized[1..]),
            VariantRule::IrelandToItaly,
        );
    }

    if !plus {
        set.insert(format!("+{normalized}"), VariantRule::MissingPlus);
    }

    if let Some(rest) = normalized.strip_prefix(&italy_plus) {
        set.insert(rest, VariantRule::ItalyPrefixStripped);
    }

    if !plus {
        set.insert(format!("{italy_plus}{normalized}"), VariantRule::ItalyPrefixAdded);
    }

    if digits.len() > 10 {
        if let Some(rest) = digits.strip_prefix(DEFAULT_COUNTRY_CODE) {
            set.insert(format!("+{digits}"), VariantRule::BareItalyDigits);
            set.insert(rest, VariantRule::BareItalyDigits);
        }
    }

    if let Some(rest) = digits.strip_prefix('0') {
        set.insert(rest, VariantRule::TrunkZeroStripped);
        set.insert(format!("{italy_plus}{rest}"), VariantRule::TrunkZeroStripped);
    }

    set.entries
        .retain(|entry| entry.value.chars().count() >= MIN_VARIANT_LEN);
    set
}

/// E.164 form when the number parses as international and validates against
/// libphonenumber metadata. Numbers without `+` carry no country and are
/// left to the default-country rules.
pub fn canonical_e164(normalized: &str) -> Option<String> {
    if !normalized.starts_with('+') {
        return None;
    }
    let parsed = phonenumber::parse(None, normalized).ok()?;
    if !phonenumber::is_valid(&parsed) {
        return None;
    }
    Some(parsed.format().mode(Mode::E164).to_string())
}

/// `353353123…` → `+353123…`: a country code typed over a pre-filled one.
fn collapse_double_prefix(digits: &str) -> Option<String> {
    for len in DOUBLE_PREFIX_LENGTHS {
        if digits.len() < len * 2 {
            continue;
        }
        let (prefix, rest) = digits.split_at(len);
        if rest.starts_with(prefix) {
            return Some(format!("+{rest}"));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{canonical_e164, phone_variants, VariantRule, MIN_VARIANT_LEN};
    use crate::domain::phone::normalize_phone;

    #[test]
    fn empty_input_has_no_variants() {
        assert!(phone_variants("").is_empty());
    }

    #[test]
    fn garbage_input_has_no_variants() {
        assert!(phone_variants("not a phone").is_empty());
        assert!(phone_variants("+").is_empty());
    }

    #[test]
    fn normalized_form_is_member() {
        for raw in ["+39 333 467 0058", "(06) 1234 5678", "3534670058", "0039333467005"] {
            let set = phone_variants(raw);
            assert!(set.contains(&normalize_phone(raw)), "input {raw:?}");
            assert!(set.contains(raw), "input {raw:?}");
        }
    }

    #[test]
    fn short_candidates_are_dropped() {
        let set = phone_variants("012345");
        assert!(set.iter().all(|value| value.len() >= MIN_VARIANT_LEN));
        assert!(set.contains("+39012345"));
        assert!(!set.contains("12345"));
        assert!(phone_variants("12").is_empty());
    }

    #[test]
    fn variants_are_deterministic() {
        let first = phone_variants("+353353123456789");
        let second = phone_variants("+353353123456789");
        assert_eq!(first, second);
    }

    #[test]
    fn collapses_double_country_code() {
        let set = phone_variants("+353353123456789");
        assert!(set.contains("+353123456789"));
    }

    #[test]
    fn collapses_two_digit_double_prefix() {
        let set = phone_variants("+39393334670058");
        assert!(set.contains("+393334670058"));
    }

    #[test]
    fn maps_italian_353_mobile_to_irish_code() {
        let set = phone_variants("+393534670058");
        assert!(set.contains("+3534670058"));
        assert!(set.contains("3534670058"));
    }

    #[test]
    fn maps_irish_code_to_italian_353_mobile() {
        let set = phone_variants("+3534670058");
        assert!(set.contains("+393534670058"));
    }

    #[test]
    fn recovers_missing_plus() {
        let set = phone_variants("3534670058");
        assert!(set.contains("+3534670058"));
        assert!(set.contains("+393534670058"));
    }

    #[test]
    fn strips_trunk_zero() {
        let set = phone_variants("03334670058");
        assert!(set.contains("3334670058"));
        assert!(set.contains("+393334670058"));
    }

    #[test]
    fn handles_bare_italian_digits() {
        let set = phone_variants("393334670058");
        assert!(set.contains("+393334670058"));
        assert!(set.contains("3334670058"));
    }

    #[test]
    fn bare_italian_rule_needs_long_input() {
        let set = phone_variants("3912345678");
        assert!(!set.contains("12345678"));
    }

    #[test]
    fn keeps_generation_order() {
        let set = phone_variants("+39 353 4670058");
        let values: Vec<&str> = set.iter().collect();
        assert_eq!(values[0], "+39 353 4670058");
        assert_eq!(values[1], "+393534670058");
        assert_eq!(values[2], "393534670058");
        let explained = set.explain();
        assert_eq!(explained[0].rule, VariantRule::Original);
        assert_eq!(explained[1].rule, VariantRule::Normalized);
        assert_eq!(explained[2].rule, VariantRule::DigitsOnly);
    }

    #[test]
    fn duplicates_keep_first_rule() {
        let set = phone_variants("+393534670058");
        let normalized = set
            .explain()
            .iter()
            .filter(|entry| entry.value == "+393534670058")
            .count();
        assert_eq!(normalized, 1);
        assert_eq!(set.explain()[0].rule, VariantRule::Original);
    }

    #[test]
    fn canonical_form_needs_valid_international_number() {
        assert_eq!(
            canonical_e164("+390612345678").as_deref(),
            Some("+390612345678")
        );
        assert_eq!(canonical_e164("+999123456789"), None);
        assert_eq!(canonical_e164("0612345678"), None);
        assert_eq!(canonical_e164("390612345678"), None);
    }

    #[test]
    fn canonical_form_is_queried_right_after_digits() {
        let set = phone_variants("+39 06 1234 5678");
        let values: Vec<&str> = set.iter().collect();
        assert_eq!(
            values[..3],
            ["+39 06 1234 5678", "+390612345678", "390612345678"]
        );
        assert!(set
            .explain()
            .iter()
            .all(|entry| entry.rule != VariantRule::Canonical));
    }

    #[test]
    fn invalid_international_number_adds_no_canonical_form() {
        let set = phone_variants("+999123456789");
        assert!(set
            .explain()
            .iter()
            .all(|entry| entry.rule != VariantRule::Canonical));
    }

    #[test]
    fn national_number_gets_default_country_after_missing_plus() {
        let set = phone_variants("0612345678");
        let rules: Vec<(&str, VariantRule)> = set
            .explain()
            .iter()
            .map(|entry| (entry.value.as_str(), entry.rule))
            .collect();
        assert_eq!(
            rules,
            [
                ("0612345678", VariantRule::Original),
                ("+0612345678", VariantRule::MissingPlus),
                ("+390612345678", VariantRule::ItalyPrefixAdded),
                ("612345678", VariantRule::TrunkZeroStripped),
                ("+39612345678", VariantRule::TrunkZeroStripped),
            ]
        );
    }

    #[test]
    fn text_without_digits_is_empty_even_when_long() {
        assert!(phone_variants("nothing here").is_empty());
    }
}
