//! Creates the application's database schema.

use rusqlite::Connection;

use crate::{
    Error, auth::create_user_table, customer::create_customer_table,
    dashboard::create_revenue_table, invoice::create_invoice_table,
};

/// Create the all of the database tables for the application.
///
/// Foreign keys are enabled for `connection` and the tables are created in a
/// single transaction so a failure leaves the database untouched.
///
/// # Errors
/// This function may return a [Error::SqlError] if an SQL error occurred.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = connection.unchecked_transaction()?;

    create_customer_table(&transaction)?;
    create_invoice_table(&transaction)?;
    create_user_table(&transaction)?;
    create_revenue_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Build a `LIKE` pattern that matches `query` anywhere in a column.
///
/// `%`, `_` and `\` are escaped so that the user's text is matched literally.
/// Queries using the pattern must declare `ESCAPE '\'`.
pub fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');

    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }

    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::{initialize, like_pattern};

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(""), "%%");
        assert_eq!(like_pattern("Lee"), "%Lee%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn like_pattern_matches_literally() {
        let connection = Connection::open_in_memory().unwrap();
        let matches = |text: &str, query: &str| -> bool {
            connection
                .query_row(
                    "SELECT ?1 LIKE ?2 ESCAPE '\\'",
                    (text, like_pattern(query)),
                    |row| row.get(0),
                )
                .unwrap()
        };

        assert!(matches("100% paid", "0% p"));
        assert!(!matches("1000 paid", "0% p"));
        assert!(matches("Evil Rabbit", "rabbit"));
        assert!(!matches("Evil Rabbit", "r_bbit"));
    }

    #[test]
    fn can_initialize_twice() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).unwrap();
        let result = initialize(&connection);

        assert!(result.is_ok());
    }

    #[test]
    fn enables_foreign_keys() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).unwrap();

        let foreign_keys: i64 = connection
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .unwrap();
        assert_eq!(foreign_keys, 1);
    }
}
