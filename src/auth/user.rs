//! Code for creating the user table, adding users and checking their credentials.

use std::{fmt::Display, sync::OnceLock};

use email_address::EmailAddress;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    auth::{PasswordHash, ValidatedPassword},
};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user that can log in to the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The user's display name.
    pub name: String,
    /// The email address the user logs in with.
    pub email: EmailAddress,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns:
/// - [Error::DuplicateEmail] if a user with `email` already exists,
/// - [Error::SqlError] if another SQL related error occurred.
pub fn create_user(
    name: &str,
    email: EmailAddress,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (name, email, password) VALUES (?1, ?2, ?3)",
        (name, email.as_str(), password_hash.as_ref()),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        name: name.to_owned(),
        email,
        password_hash,
    })
}

fn map_row_to_user(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_email: String = row.get(2)?;
    let email = raw_email.parse::<EmailAddress>().map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(error))
    })?;
    let raw_password_hash: String = row.get(3)?;

    Ok(User {
        id: UserID::new(row.get(0)?),
        name: row.get(1)?,
        email,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
    })
}

/// Get the user whose email address is `email`.
///
/// # Errors
///
/// Returns:
/// - [Error::NotFound] if no user has the email address,
/// - [Error::SqlError] if another SQL related error occurred.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, name, email, password FROM user WHERE email = :email")?
        .query_row(&[(":email", email)], map_row_to_user)
        .map_err(|error| error.into())
}

/// A hash with the same cost as stored passwords, verified against when the
/// email address is unknown so that every failed log-in takes as long.
fn dummy_password_hash() -> Option<&'static PasswordHash> {
    static DUMMY_HASH: OnceLock<Option<PasswordHash>> = OnceLock::new();

    DUMMY_HASH
        .get_or_init(|| {
            ValidatedPassword::new("not a real password")
                .and_then(|password| PasswordHash::new(password, PasswordHash::DEFAULT_COST))
                .inspect_err(|error| tracing::error!("could not create dummy password hash: {error}"))
                .ok()
        })
        .as_ref()
}

/// Check the credentials of a user trying to log in.
///
/// Returns `Ok(None)` when the email address is unknown or the password does
/// not match, so callers can respond to both cases in the same way.
///
/// # Errors
///
/// Returns an error if the database could not be queried or the stored hash
/// could not be verified.
pub fn authenticate(
    email: &str,
    password: &str,
    connection: &Connection,
) -> Result<Option<User>, Error> {
    let user = match get_user_by_email(email, connection) {
        Ok(user) => user,
        Err(Error::NotFound) => {
            tracing::debug!("no user with the email {email}");
            if let Some(dummy_hash) = dummy_password_hash() {
                let _ = dummy_hash.verify(password);
            }
            return Ok(None);
        }
        Err(error) => return Err(error),
    };

    let is_password_valid = user
        .password_hash
        .verify(password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    Ok(is_password_valid.then_some(user))
}

#[cfg(test)]
mod user_tests {
    use email_address::EmailAddress;
    use rusqlite::Connection;

    use crate::{
        Error,
        auth::{PasswordHash, ValidatedPassword},
    };

    use super::{
        authenticate, create_user, create_user_table, dummy_password_hash, get_user_by_email,
    };

    fn get_db_connection() -> Connection {
        let conn =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");
        create_user_table(&conn).expect("Could not create user table");

        conn
    }

    fn email(raw: &str) -> EmailAddress {
        raw.parse().unwrap()
    }

    #[test]
    fn insert_user_succeeds() {
        let connection = get_db_connection();
        let password_hash = PasswordHash::new_unchecked("hunter2");

        let inserted_user = create_user(
            "User",
            email("user@nextmail.com"),
            password_hash.clone(),
            &connection,
        )
        .unwrap();

        assert!(inserted_user.id.as_i64() > 0);
        assert_eq!(inserted_user.password_hash, password_hash);
    }

    #[test]
    fn insert_duplicate_email_fails() {
        let connection = get_db_connection();
        create_user(
            "User",
            email("user@nextmail.com"),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        let result = create_user(
            "Another User",
            email("user@nextmail.com"),
            PasswordHash::new_unchecked("hunter3"),
            &connection,
        );

        assert_eq!(result, Err(Error::DuplicateEmail));
    }

    #[test]
    fn get_user_by_email_returns_inserted_user() {
        let connection = get_db_connection();
        let want = create_user(
            "User",
            email("user@nextmail.com"),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        let got = get_user_by_email("user@nextmail.com", &connection).unwrap();

        assert_eq!(want, got);
    }

    #[test]
    fn get_user_by_unknown_email_is_not_found() {
        let connection = get_db_connection();

        let result = get_user_by_email("nobody@nextmail.com", &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    fn insert_test_user(connection: &Connection) {
        let password = ValidatedPassword::new("123456").unwrap();
        create_user(
            "User",
            email("user@nextmail.com"),
            PasswordHash::new(password, 4).unwrap(),
            connection,
        )
        .unwrap();
    }

    #[test]
    fn authenticate_succeeds_with_correct_password() {
        let connection = get_db_connection();
        insert_test_user(&connection);

        let user = authenticate("user@nextmail.com", "123456", &connection).unwrap();

        assert_eq!(user.map(|user| user.name), Some("User".to_owned()));
    }

    #[test]
    fn authenticate_fails_with_wrong_password() {
        let connection = get_db_connection();
        insert_test_user(&connection);

        let user = authenticate("user@nextmail.com", "654321", &connection).unwrap();

        assert_eq!(user, None);
    }

    #[test]
    fn authenticate_fails_with_unknown_email() {
        let connection = get_db_connection();
        insert_test_user(&connection);

        let user = authenticate("someone@nextmail.com", "123456", &connection).unwrap();

        assert_eq!(user, None);
    }

    #[test]
    fn unknown_email_is_checked_against_a_real_hash() {
        let dummy_hash = dummy_password_hash().expect("dummy hash should be created");

        assert!(matches!(dummy_hash.verify("123456"), Ok(false)));
        assert!(dummy_hash.as_ref().starts_with(&format!("$2b${}$", PasswordHash::DEFAULT_COST)));
    }

    #[test]
    fn authenticate_fails_with_unknown_email_and_dummy_password() {
        let connection = get_db_connection();
        insert_test_user(&connection);

        let user = authenticate("someone@nextmail.com", "not a real password", &connection).unwrap();

        assert_eq!(user, None);
    }
}
