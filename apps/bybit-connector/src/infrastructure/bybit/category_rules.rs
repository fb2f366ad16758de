//! Which request fields each market category accepts.
//!
//! Fields not listed here are legal everywhere.

use crate::domain::market::MarketCategory;
use crate::error::ConnectorError;

/// Where a field may appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldScope {
    /// Spot markets only.
    Spot,
    /// Linear and inverse contracts only.
    Contract,
    /// Option markets only.
    Option,
    /// Anything but options.
    NotOption,
}

impl FieldScope {
    /// Whether the scope includes the category.
    #[must_use]
    pub const fn permits(self, category: MarketCategory) -> bool {
        match self {
            Self::Spot => matches!(category, MarketCategory::Spot),
            Self::Contract => category.is_contract(),
            Self::Option => matches!(category, MarketCategory::Option),
            Self::NotOption => !matches!(category, MarketCategory::Option),
        }
    }

    const fn describe(self) -> &'static str {
        match self {
            Self::Spot => "spot markets",
            Self::Contract => "contract markets",
            Self::Option => "option markets",
            Self::NotOption => "non-option markets",
        }
    }
}

/// Category-restricted request fields.
pub const FIELD_RULES: &[(&str, FieldScope)] = &[
    ("orderFilter", FieldScope::Spot),
    ("isLeverage", FieldScope::Spot),
    ("marketUnit", FieldScope::Spot),
    ("triggerDirection", FieldScope::Contract),
    ("triggerBy", FieldScope::Contract),
    ("tpTriggerBy", FieldScope::Contract),
    ("slTriggerBy", FieldScope::Contract),
    ("tpslMode", FieldScope::Contract),
    ("bboSideType", FieldScope::Contract),
    ("bboLevel", FieldScope::Contract),
    ("closeOnTrigger", FieldScope::Contract),
    ("closePosition", FieldScope::Contract),
    ("mmp", FieldScope::Option),
    ("orderIv", FieldScope::Option),
    ("slippageToleranceType", FieldScope::NotOption),
    ("slippageTolerance", FieldScope::NotOption),
];

/// Scope of a field, if restricted.
#[must_use]
pub fn scope_of(field: &str) -> Option<FieldScope> {
    FIELD_RULES
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, scope)| *scope)
}

/// Whether `field` may be sent for `category`.
#[must_use]
pub fn permits(category: MarketCategory, field: &str) -> bool {
    scope_of(field).is_none_or(|scope| scope.permits(category))
}

/// Reject the first requested field the category forbids.
pub fn check_fields<'a>(
    category: MarketCategory,
    fields: impl IntoIterator<Item = &'a str>,
) -> Result<(), ConnectorError> {
    for field in fields {
        if let Some(scope) = scope_of(field) {
            if !scope.permits(category) {
                return Err(ConnectorError::parameter_invalid(
                    field,
                    format!(
                        "{field} is only valid for {}, not {category}",
                        scope.describe()
                    ),
                )
                .with_context("category", category.as_str()));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use test_case::test_case;

    #[test_case("orderFilter", MarketCategory::Spot, true)]
    #[test_case("orderFilter", MarketCategory::Linear, false)]
    #[test_case("triggerDirection", MarketCategory::Inverse, true)]
    #[test_case("triggerDirection", MarketCategory::Spot, false)]
    #[test_case("tpslMode", MarketCategory::Option, false)]
    #[test_case("closeOnTrigger", MarketCategory::Linear, true)]
    #[test_case("mmp", MarketCategory::Option, true)]
    #[test_case("orderIv", MarketCategory::Linear, false)]
    #[test_case("slippageTolerance", MarketCategory::Option, false)]
    #[test_case("slippageTolerance", MarketCategory::Spot, true)]
    #[test_case("orderLinkId", MarketCategory::Option, true)]
    fn field_permissions(field: &str, category: MarketCategory, allowed: bool) {
        assert_eq!(permits(category, field), allowed);
    }

    #[test]
    fn check_names_offending_field() {
        let err = check_fields(MarketCategory::Linear, ["qty", "orderFilter"]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ParameterInvalid);
        assert_eq!(err.context_value("field"), Some("orderFilter"));
        assert_eq!(err.context_value("category"), Some("linear"));
    }

    #[test]
    fn check_passes_unrestricted_fields() {
        assert!(check_fields(MarketCategory::Option, ["qty", "price", "orderLinkId"]).is_ok());
    }
}
