//! The validation gate for names that end up interpolated into SQL text.
//!
//! Table and column names cannot be bound as parameters, so anything that is
//! going to appear literally in a DDL or DML string must pass through
//! [`validate`] first. Values never go through here; they are always bound.

/// Rejection of a name that must not be interpolated into SQL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{role} `{name}` is not allowed (letters, digits and underscores only, not purely numeric, minimum length 1)")]
pub struct InvalidIdentifier {
    pub name: String,
    pub role: &'static str,
}

/// Checks that `name` is safe to embed in SQL as an identifier.
///
/// `role` describes what the name is used for (e.g. "table name") and is
/// included in the error message. Failure is a configuration error and is
/// never retried.
pub fn validate(name: &str, role: &'static str) -> Result<(), InvalidIdentifier> {
    if is_safe(name) {
        Ok(())
    } else {
        Err(InvalidIdentifier {
            name: name.to_string(),
            role,
        })
    }
}

/// The safe-identifier predicate behind [`validate`].
pub fn is_safe(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_safe_identifiers() {
        for name in ["a", "a1", "_a", "snake_case", "CamelCase", "location_lat", "t2_x"] {
            assert!(validate(name, "column name").is_ok(), "rejected `{name}`");
        }
    }

    #[test]
    fn rejects_empty_and_purely_numeric() {
        for name in ["", "1", "123", "007"] {
            assert!(validate(name, "column name").is_err(), "accepted `{name}`");
        }
    }

    #[test]
    fn rejects_quoting_and_statement_characters() {
        for name in [
            "a\"b",
            "a'b",
            "a;b",
            "a b",
            " ",
            "   ",
            "a-b",
            "a.b",
            "a)b",
            "drop table x; --",
        ] {
            assert!(validate(name, "table name").is_err(), "accepted `{name}`");
        }
    }

    #[test]
    fn error_names_the_role() {
        let err = validate("bad name", "database name").unwrap_err();
        assert!(err.to_string().contains("database name"));
        assert!(err.to_string().contains("bad name"));
    }
}
