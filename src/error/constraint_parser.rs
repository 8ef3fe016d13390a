use regex::Regex;
use std::sync::OnceLock;

/// Tables whose constraint names the parser can split into `(table, column)`.
///
/// Longer names come before their prefixes so that `shopping_cart_items_*`
/// is not mistaken for `shopping_carts` or similar.
const KNOWN_TABLES: &[&str] = &[
    "delivery_tracking_history",
    "shopping_cart_items",
    "product_variants",
    "delivery_orders",
    "delivery_tariffs",
    "shopping_carts",
    "categories",
    "complaints",
    "addresses",
    "countries",
    "products",
    "reviews",
    "sellers",
    "cities",
];

/// Suffixes PostgreSQL appends to generated constraint names.
const CONSTRAINT_SUFFIXES: &[&str] = &["_fkey", "_pkey", "_key", "_check", "_idx", "_excl"];

/// Utility for parsing PostgreSQL constraint violation messages.
///
/// The column and the offending value are read from the `Key (col)=(value)`
/// detail line when present; the table and column otherwise come from the
/// constraint name (`<table>_<column>_<suffix>`).
pub struct ConstraintParser;

struct RegexPatterns {
    key_value: Regex,
    column_name: Regex,
    table_name: Regex,
    relation_name: Regex,
}

impl RegexPatterns {
    fn new() -> Self {
        // Patterns are literals; failure to compile is a programming error.
        Self {
            key_value: Regex::new(r"Key \(([^)]+)\)=\(([^)]*)\)").expect("valid key/value regex"),
            column_name: Regex::new(r#"column "([^"]+)""#).expect("valid column regex"),
            table_name: Regex::new(r#"on table "([^"]+)""#).expect("valid table regex"),
            relation_name: Regex::new(r#"relation "([^"]+)""#).expect("valid relation regex"),
        }
    }
}

static REGEX_PATTERNS: OnceLock<RegexPatterns> = OnceLock::new();

impl ConstraintParser {
    fn patterns() -> &'static RegexPatterns {
        REGEX_PATTERNS.get_or_init(RegexPatterns::new)
    }

    /// Parses a unique violation into `(table, column, value)`.
    pub fn parse_unique_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String, String)> {
        let key_value = Self::extract_key_value_from_message(message);

        if let Some((table, column)) = constraint_name.and_then(Self::parse_constraint_name) {
            let value = key_value
                .map(|(_, value)| value)
                .unwrap_or_else(|| "duplicate_value".to_string());
            return Some((table, column, value));
        }

        let (column, value) = key_value?;
        let table = Self::extract_table_from_message(message)
            .unwrap_or_else(|| "resource".to_string());
        Some((table, column, value))
    }

    /// Parses a not-null violation into `(table, column)`.
    pub fn parse_not_null_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String)> {
        let column = Self::extract_column_from_message(message)?;
        let table = Self::extract_table_from_message(message)
            .or_else(|| constraint_name.and_then(Self::parse_constraint_name).map(|(t, _)| t))
            .unwrap_or_else(|| "resource".to_string());
        Some((table, column))
    }

    /// Parses a foreign key violation into `(table, column, referenced_value)`.
    pub fn parse_foreign_key_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String, String)> {
        let key_value = Self::extract_key_value_from_message(message);

        if let Some((table, column)) = constraint_name.and_then(Self::parse_constraint_name) {
            let value = key_value
                .map(|(_, value)| value)
                .unwrap_or_else(|| "invalid_reference".to_string());
            return Some((table, column, value));
        }

        let (column, value) = key_value?;
        let table = Self::extract_table_from_message(message)
            .unwrap_or_else(|| "resource".to_string());
        Some((table, column, value))
    }

    /// Parses a check violation into `(table, constrained column)`.
    pub fn parse_check_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String)> {
        if let Some(parsed) = constraint_name.and_then(Self::parse_constraint_name) {
            return Some(parsed);
        }

        let column = Self::extract_column_from_message(message)?;
        let table = Self::extract_table_from_message(message)
            .unwrap_or_else(|| "resource".to_string());
        Some((table, column))
    }

    /// Splits a constraint name such as `product_variants_sku_key` into
    /// `("product_variants", "sku")`.
    ///
    /// Known tables are matched first so multi-word table names survive.
    /// Unknown tables fall back to "first segment is the table".
    pub fn parse_constraint_name(constraint_name: &str) -> Option<(String, String)> {
        let stem = CONSTRAINT_SUFFIXES
            .iter()
            .find_map(|suffix| constraint_name.strip_suffix(suffix))?;

        for table in KNOWN_TABLES {
            if let Some(column) = stem
                .strip_prefix(table)
                .and_then(|rest| rest.strip_prefix('_'))
                .filter(|column| !column.is_empty())
            {
                return Some((table.to_string(), column.to_string()));
            }
        }

        let (table, column) = stem.split_once('_')?;
        if table.is_empty() || column.is_empty() {
            return None;
        }
        Some((table.to_string(), column.to_string()))
    }

    pub fn extract_column_from_message(message: &str) -> Option<String> {
        Self::patterns()
            .column_name
            .captures(message)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Reads the table from `on table "x"` or, failing that, `relation "x"`.
    pub fn extract_table_from_message(message: &str) -> Option<String> {
        let patterns = Self::patterns();
        patterns
            .table_name
            .captures(message)
            .or_else(|| patterns.relation_name.captures(message))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Extracts `(column, value)` from a `Key (column)=(value)` detail line.
    pub fn extract_key_value_from_message(message: &str) -> Option<(String, String)> {
        Self::patterns().key_value.captures(message).and_then(|caps| {
            let field = caps.get(1)?.as_str().to_string();
            let value = caps.get(2)?.as_str().to_string();
            Some((field, value))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unique_violation_with_constraint_name() {
        let message = "duplicate key value violates unique constraint \"countries_iso_code_key\"\nDETAIL: Key (iso_code)=(DE) already exists.";
        let result = ConstraintParser::parse_unique_violation(message, Some("countries_iso_code_key"));
        assert_eq!(
            result,
            Some(("countries".to_string(), "iso_code".to_string(), "DE".to_string()))
        );
    }

    #[test]
    fn test_parse_unique_violation_multi_word_table() {
        let message = "duplicate key value violates unique constraint \"product_variants_sku_key\"\nDETAIL: Key (sku)=(TSHIRT-RED-M) already exists.";
        let result =
            ConstraintParser::parse_unique_violation(message, Some("product_variants_sku_key"));
        assert_eq!(
            result,
            Some((
                "product_variants".to_string(),
                "sku".to_string(),
                "TSHIRT-RED-M".to_string()
            ))
        );
    }

    #[test]
    fn test_parse_unique_violation_composite_key() {
        let message = "duplicate key value violates unique constraint \"cities_normalized_name_key\"\nDETAIL: Key (country_id, normalized_name)=(1, BERLIN) already exists.";
        let result =
            ConstraintParser::parse_unique_violation(message, Some("cities_normalized_name_key"));
        assert_eq!(
            result,
            Some((
                "cities".to_string(),
                "normalized_name".to_string(),
                "1, BERLIN".to_string()
            ))
        );
    }

    #[test]
    fn test_parse_unique_violation_without_constraint_name() {
        let message = "duplicate key value violates unique constraint\nDETAIL: Key (email)=(shop@example.com) already exists.";
        let result = ConstraintParser::parse_unique_violation(message, None);
        assert_eq!(
            result,
            Some((
                "resource".to_string(),
                "email".to_string(),
                "shop@example.com".to_string()
            ))
        );
    }

    #[test]
    fn test_parse_not_null_violation() {
        let message = "null value in column \"street\" violates not-null constraint";
        let result = ConstraintParser::parse_not_null_violation(message, None);
        assert_eq!(result, Some(("resource".to_string(), "street".to_string())));
    }

    #[test]
    fn test_parse_not_null_violation_with_relation() {
        let message =
            "null value in column \"street\" of relation \"addresses\" violates not-null constraint";
        let result = ConstraintParser::parse_not_null_violation(message, None);
        assert_eq!(result, Some(("addresses".to_string(), "street".to_string())));
    }

    #[test]
    fn test_parse_foreign_key_violation() {
        let message = "insert or update on table \"products\" violates foreign key constraint \"products_seller_id_fkey\"\nDETAIL: Key (seller_id)=(7d0a5a8e-0000-0000-0000-000000000001) is not present in table \"sellers\".";
        let result =
            ConstraintParser::parse_foreign_key_violation(message, Some("products_seller_id_fkey"));
        assert_eq!(
            result,
            Some((
                "products".to_string(),
                "seller_id".to_string(),
                "7d0a5a8e-0000-0000-0000-000000000001".to_string()
            ))
        );
    }

    #[test]
    fn test_parse_check_violation() {
        let message =
            "new row for relation \"reviews\" violates check constraint \"reviews_rating_check\"";
        let result = ConstraintParser::parse_check_violation(message, Some("reviews_rating_check"));
        assert_eq!(result, Some(("reviews".to_string(), "rating".to_string())));
    }

    #[test]
    fn test_parse_constraint_name() {
        assert_eq!(
            ConstraintParser::parse_constraint_name("sellers_normalized_name_key"),
            Some(("sellers".to_string(), "normalized_name".to_string()))
        );
        assert_eq!(
            ConstraintParser::parse_constraint_name("shopping_cart_items_product_id_key"),
            Some(("shopping_cart_items".to_string(), "product_id".to_string()))
        );
        assert_eq!(
            ConstraintParser::parse_constraint_name("delivery_tracking_history_delivery_order_id_fkey"),
            Some((
                "delivery_tracking_history".to_string(),
                "delivery_order_id".to_string()
            ))
        );
        assert_eq!(
            ConstraintParser::parse_constraint_name("posts_title_idx"),
            Some(("posts".to_string(), "title".to_string()))
        );
    }

    #[test]
    fn test_parse_constraint_name_rejects_unknown_shapes() {
        assert_eq!(ConstraintParser::parse_constraint_name("invalid"), None);
        assert_eq!(ConstraintParser::parse_constraint_name("no_suffix_here"), None);
        assert_eq!(ConstraintParser::parse_constraint_name("sellers_key"), None);
    }

    #[test]
    fn test_extract_column_from_message() {
        let message = "null value in column \"sku\" violates not-null constraint";
        assert_eq!(
            ConstraintParser::extract_column_from_message(message),
            Some("sku".to_string())
        );
        assert_eq!(ConstraintParser::extract_column_from_message("no column found here"), None);
    }

    #[test]
    fn test_extract_table_from_message() {
        let message = "insert or update on table \"cities\" violates foreign key constraint";
        assert_eq!(
            ConstraintParser::extract_table_from_message(message),
            Some("cities".to_string())
        );
        assert_eq!(ConstraintParser::extract_table_from_message("no table found here"), None);
    }

    #[test]
    fn test_extract_key_value_from_message() {
        let message = "Key (tariff_id)=(123) is not present in table \"delivery_tariffs\".";
        assert_eq!(
            ConstraintParser::extract_key_value_from_message(message),
            Some(("tariff_id".to_string(), "123".to_string()))
        );
    }

    #[test]
    fn test_regex_patterns_caching() {
        let patterns1 = ConstraintParser::patterns();
        let patterns2 = ConstraintParser::patterns();
        assert!(std::ptr::eq(patterns1, patterns2));
    }

    #[test]
    fn test_graceful_parsing_failures() {
        let message = "completely unrelated error message";
        assert_eq!(ConstraintParser::parse_unique_violation(message, None), None);
        assert_eq!(ConstraintParser::parse_not_null_violation(message, None), None);
        assert_eq!(ConstraintParser::parse_foreign_key_violation(message, None), None);
        assert_eq!(ConstraintParser::parse_check_violation(message, None), None);
    }
}
