pub mod customer;
pub mod ids;
pub mod phone;
pub mod variants;

pub use customer::{validate_phone, validate_points, Customer};
pub use ids::CustomerId;
pub use phone::{digit_suffix, digits_only, has_usable_digits, normalize_phone};
pub use variants::{
    canonical_e164, phone_variants, PhoneVariant, VariantRule, VariantSet, DEFAULT_COUNTRY_CODE,
    MIN_VARIANT_LEN,
};
