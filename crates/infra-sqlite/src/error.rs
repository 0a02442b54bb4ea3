// sqlx::Error -> AppError mapping
//
// Orphan rules forbid `From<sqlx::Error> for AppError` here, so every query
// maps through this helper.

use accelerate_core::error::AppError;

pub(crate) fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            if let Some(code) = db_err.code() {
                let code_str = code.as_ref();

                // SQLite error codes: https://www.sqlite.org/rescode.html
                match code_str {
                    "2067" | "1555" => AppError::Conflict(format!(
                        "Unique constraint violation: {} ({})",
                        db_err.message(),
                        code_str
                    )),
                    "787" | "3850" => AppError::Database(format!(
                        "Foreign key constraint violation: {} ({})",
                        db_err.message(),
                        code_str
                    )),
                    "5" => AppError::Database(format!(
                        "Database locked (SQLITE_BUSY): {}",
                        db_err.message()
                    )),
                    "13" => AppError::Database(format!("Database full: {}", db_err.message())),
                    _ => AppError::Database(format!(
                        "Database error [{}]: {}",
                        code_str,
                        db_err.message()
                    )),
                }
            } else {
                AppError::Database(format!("Database error: {}", db_err.message()))
            }
        }
        sqlx::Error::RowNotFound => AppError::Database("Row not found".to_string()),
        sqlx::Error::ColumnNotFound(col) => AppError::Database(format!("Column not found: {}", col)),
        _ => AppError::Database(err.to_string()),
    }
}

/// Error for a JSON column that no longer parses
pub(crate) fn corrupt_column(table: &str, column: &str, err: serde_json::Error) -> AppError {
    AppError::Database(format!("Corrupt {}.{}: {}", table, column, err))
}

/// Fail an UPDATE that matched no row
pub(crate) fn ensure_updated(
    result: sqlx::sqlite::SqliteQueryResult,
    entity: &str,
    id: &str,
) -> Result<(), AppError> {
    if result.rows_affected() == 0 {
        Err(AppError::not_found(entity, id))
    } else {
        Ok(())
    }
}

/// Parse a nullable enum column
pub(crate) fn parse_opt<T>(value: Option<String>) -> Result<Option<T>, AppError>
where
    T: std::str::FromStr<Err = accelerate_core::domain::DomainError>,
{
    value
        .map(|v| v.parse::<T>())
        .transpose()
        .map_err(AppError::from)
}
