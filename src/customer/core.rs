//! The customer type and its database operations.

use rusqlite::{Connection, Row};

use crate::Error;

/// The ID of a customer in the database.
pub type CustomerId = i64;

/// A customer that can be billed.
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    /// The ID of the customer.
    pub id: CustomerId,
    /// The customer's full name.
    pub name: String,
    /// The customer's email address.
    pub email: String,
    /// The path or URL of the customer's profile picture.
    pub image_url: String,
}

/// The fields needed to list a customer in a select box.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerField {
    pub id: CustomerId,
    pub name: String,
}

/// Create the customer table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_customer_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS customer (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            image_url TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_customer_name ON customer(name);",
    )?;

    Ok(())
}

/// Insert a customer and return it with its generated ID.
///
/// # Errors
///
/// Returns an [Error::SqlError] if the email address is already in use or
/// another SQL error occurred.
pub fn insert_customer(
    name: &str,
    email: &str,
    image_url: &str,
    connection: &Connection,
) -> Result<Customer, Error> {
    connection.execute(
        "INSERT INTO customer (name, email, image_url) VALUES (?1, ?2, ?3)",
        (name, email, image_url),
    )?;

    Ok(Customer {
        id: connection.last_insert_rowid(),
        name: name.to_owned(),
        email: email.to_owned(),
        image_url: image_url.to_owned(),
    })
}

fn map_row_to_customer_field(row: &Row) -> Result<CustomerField, rusqlite::Error> {
    Ok(CustomerField {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

/// Get the ID and name of every customer, ordered by name.
///
/// # Errors
///
/// Returns an [Error::SqlError] if an SQL error occurred.
pub fn fetch_customers(connection: &Connection) -> Result<Vec<CustomerField>, Error> {
    connection
        .prepare("SELECT id, name FROM customer ORDER BY name ASC")?
        .query_map([], map_row_to_customer_field)?
        .map(|maybe_customer| maybe_customer.map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::{CustomerField, create_customer_table, fetch_customers, insert_customer};

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_customer_table(&connection).expect("Could not create customer table");
        connection
    }

    #[test]
    fn insert_customer_succeeds() {
        let connection = get_test_connection();

        let customer = insert_customer(
            "Evil Rabbit",
            "evil@rabbit.com",
            "/customers/evil-rabbit.png",
            &connection,
        )
        .unwrap();

        assert!(customer.id > 0);
        assert_eq!(customer.name, "Evil Rabbit");
    }

    #[test]
    fn insert_duplicate_email_fails() {
        let connection = get_test_connection();
        insert_customer("A", "same@example.com", "/a.png", &connection).unwrap();

        let result = insert_customer("B", "same@example.com", "/b.png", &connection);

        assert!(result.is_err());
    }

    #[test]
    fn fetch_customers_orders_by_name() {
        let connection = get_test_connection();
        let zed = insert_customer("Zed", "zed@example.com", "/z.png", &connection).unwrap();
        let amy = insert_customer("Amy", "amy@example.com", "/a.png", &connection).unwrap();

        let customers = fetch_customers(&connection).unwrap();

        assert_eq!(
            customers,
            vec![
                CustomerField {
                    id: amy.id,
                    name: "Amy".to_owned()
                },
                CustomerField {
                    id: zed.id,
                    name: "Zed".to_owned()
                },
            ]
        );
    }

    #[test]
    fn fetch_customers_on_empty_table() {
        let connection = get_test_connection();

        assert_eq!(fetch_customers(&connection).unwrap(), vec![]);
    }
}
