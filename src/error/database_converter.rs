use crate::error::{AppError, ConstraintParser};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// Converts Diesel errors into typed `AppError` variants.
///
/// Constraint violations become `Duplicate` or `Validation` errors naming the
/// offending column; everything else is logged and wrapped as `Database` with
/// the original error kept as the source.
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    pub fn convert_diesel_error(error: DieselError, operation: &str) -> AppError {
        match error {
            DieselError::DatabaseError(kind, info) => {
                Self::convert_database_error(kind, info.as_ref(), operation)
            }
            DieselError::NotFound => AppError::NotFound {
                entity: "resource".to_string(),
                field: "id".to_string(),
                value: "unknown".to_string(),
            },
            other => {
                tracing::error!(operation, error = %other, "Database operation failed");
                AppError::Database {
                    operation: operation.to_string(),
                    source: anyhow::Error::from(other),
                }
            }
        }
    }

    /// PostgreSQL puts the `Key (col)=(value)` line in the detail field, so
    /// the message and the detail are parsed together.
    fn full_message(info: &(dyn DatabaseErrorInformation + Send + Sync)) -> String {
        match info.details() {
            Some(details) => format!("{}\nDETAIL: {}", info.message(), details),
            None => info.message().to_string(),
        }
    }

    fn convert_database_error(
        kind: DatabaseErrorKind,
        info: &(dyn DatabaseErrorInformation + Send + Sync),
        operation: &str,
    ) -> AppError {
        let message = Self::full_message(info);
        let constraint_name = info.constraint_name();

        let converted = match &kind {
            DatabaseErrorKind::UniqueViolation => {
                ConstraintParser::parse_unique_violation(&message, constraint_name).map(
                    |(entity, field, value)| AppError::Duplicate {
                        entity,
                        field,
                        value,
                    },
                )
            }
            DatabaseErrorKind::NotNullViolation => {
                ConstraintParser::parse_not_null_violation(&message, constraint_name).map(
                    |(entity, field)| AppError::Validation {
                        field,
                        reason: format!("Field is required for {}", entity),
                    },
                )
            }
            DatabaseErrorKind::ForeignKeyViolation => {
                ConstraintParser::parse_foreign_key_violation(&message, constraint_name).map(
                    |(entity, field, referenced_value)| AppError::Validation {
                        field,
                        reason: format!(
                            "Invalid reference from {} with value '{}'",
                            entity, referenced_value
                        ),
                    },
                )
            }
            DatabaseErrorKind::CheckViolation => {
                ConstraintParser::parse_check_violation(&message, constraint_name).map(
                    |(entity, field)| AppError::Validation {
                        field,
                        reason: format!("Check constraint failed for {}", entity),
                    },
                )
            }
            _ => None,
        };

        converted.unwrap_or_else(|| {
            tracing::error!(operation, kind = ?kind, message = %message, "Database operation failed");
            AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::msg(format!("{:?}: {}", kind, message)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockDatabaseErrorInfo {
        message: String,
        details: Option<String>,
        constraint_name: Option<String>,
    }

    impl MockDatabaseErrorInfo {
        fn new(message: &str, constraint_name: Option<&str>) -> Self {
            Self {
                message: message.to_string(),
                details: None,
                constraint_name: constraint_name.map(String::from),
            }
        }

        fn with_details(mut self, details: &str) -> Self {
            self.details = Some(details.to_string());
            self
        }
    }

    impl DatabaseErrorInformation for MockDatabaseErrorInfo {
        fn message(&self) -> &str {
            &self.message
        }

        fn details(&self) -> Option<&str> {
            self.details.as_deref()
        }

        fn hint(&self) -> Option<&str> {
            None
        }

        fn table_name(&self) -> Option<&str> {
            None
        }

        fn column_name(&self) -> Option<&str> {
            None
        }

        fn constraint_name(&self) -> Option<&str> {
            self.constraint_name.as_deref()
        }

        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn db_error(kind: DatabaseErrorKind, info: MockDatabaseErrorInfo) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(info))
    }

    #[test]
    fn test_convert_not_found_error() {
        let result = DatabaseErrorConverter::convert_diesel_error(DieselError::NotFound, "find");
        assert!(matches!(result, AppError::NotFound { .. }));
    }

    #[test]
    fn test_convert_unique_violation_reads_detail_field() {
        let info = MockDatabaseErrorInfo::new(
            "duplicate key value violates unique constraint \"sellers_normalized_name_key\"",
            Some("sellers_normalized_name_key"),
        )
        .with_details("Key (normalized_name)=(ACME) already exists.");

        let result = DatabaseErrorConverter::convert_diesel_error(
            db_error(DatabaseErrorKind::UniqueViolation, info),
            "insert seller",
        );

        match result {
            AppError::Duplicate {
                entity,
                field,
                value,
            } => {
                assert_eq!(entity, "sellers");
                assert_eq!(field, "normalized_name");
                assert_eq!(value, "ACME");
            }
            other => panic!("Expected Duplicate error, got: {:?}", other),
        }
    }

    #[test]
    fn test_convert_not_null_violation() {
        let info = MockDatabaseErrorInfo::new(
            "null value in column \"postal_code\" of relation \"addresses\" violates not-null constraint",
            None,
        );

        let result = DatabaseErrorConverter::convert_diesel_error(
            db_error(DatabaseErrorKind::NotNullViolation, info),
            "insert address",
        );

        match result {
            AppError::Validation { field, reason } => {
                assert_eq!(field, "postal_code");
                assert!(reason.contains("required"));
                assert!(reason.contains("addresses"));
            }
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    #[test]
    fn test_convert_foreign_key_violation() {
        let info = MockDatabaseErrorInfo::new(
            "insert or update on table \"cities\" violates foreign key constraint \"cities_country_id_fkey\"",
            Some("cities_country_id_fkey"),
        )
        .with_details("Key (country_id)=(999) is not present in table \"countries\".");

        let result = DatabaseErrorConverter::convert_diesel_error(
            db_error(DatabaseErrorKind::ForeignKeyViolation, info),
            "insert city",
        );

        match result {
            AppError::Validation { field, reason } => {
                assert_eq!(field, "country_id");
                assert!(reason.contains("Invalid reference"));
                assert!(reason.contains("999"));
            }
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    #[test]
    fn test_convert_check_violation() {
        let info = MockDatabaseErrorInfo::new(
            "new row for relation \"product_variants\" violates check constraint \"product_variants_stock_quantity_check\"",
            Some("product_variants_stock_quantity_check"),
        );

        let result = DatabaseErrorConverter::convert_diesel_error(
            db_error(DatabaseErrorKind::CheckViolation, info),
            "update variant",
        );

        match result {
            AppError::Validation { field, reason } => {
                assert_eq!(field, "stock_quantity");
                assert!(reason.contains("Check constraint failed"));
            }
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_violation_keeps_operation() {
        let info = MockDatabaseErrorInfo::new("something odd happened", None);

        let result = DatabaseErrorConverter::convert_diesel_error(
            db_error(DatabaseErrorKind::UniqueViolation, info),
            "insert product",
        );

        match result {
            AppError::Database { operation, source } => {
                assert_eq!(operation, "insert product");
                assert!(source.to_string().contains("something odd happened"));
            }
            other => panic!("Expected Database error, got: {:?}", other),
        }
    }

    #[test]
    fn test_serialization_failure_is_database_error() {
        let info = MockDatabaseErrorInfo::new("could not serialize access", None);

        let result = DatabaseErrorConverter::convert_diesel_error(
            db_error(DatabaseErrorKind::SerializationFailure, info),
            "change status",
        );

        assert!(matches!(result, AppError::Database { .. }));
    }
}
