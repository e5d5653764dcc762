//! Monthly revenue and the Y axis labels of the revenue chart.

use rusqlite::{Connection, Row};

use crate::Error;

/// The revenue for one month, in whole dollars.
#[derive(Debug, Clone, PartialEq)]
pub struct Revenue {
    /// The short month name, e.g. "Jan".
    pub month: String,
    /// The revenue in dollars.
    pub revenue: i64,
}

/// Create the revenue table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_revenue_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS revenue (
            month TEXT NOT NULL UNIQUE,
            revenue INTEGER NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Add the revenue for a month.
///
/// # Errors
///
/// Returns an [Error::SqlError] if the month already has revenue or another SQL error occurred.
pub fn insert_revenue(revenue: &Revenue, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO revenue (month, revenue) VALUES (?1, ?2)",
        (&revenue.month, revenue.revenue),
    )?;

    Ok(())
}

fn map_row_to_revenue(row: &Row) -> Result<Revenue, rusqlite::Error> {
    Ok(Revenue {
        month: row.get(0)?,
        revenue: row.get(1)?,
    })
}

/// Get the revenue of every month in the order the months were added.
///
/// # Errors
///
/// Returns an [Error::SqlError] if an SQL error occurred.
pub fn fetch_revenue(connection: &Connection) -> Result<Vec<Revenue>, Error> {
    connection
        .prepare("SELECT month, revenue FROM revenue ORDER BY rowid ASC")?
        .query_map([], map_row_to_revenue)?
        .map(|maybe_revenue| maybe_revenue.map_err(Error::from))
        .collect()
}

/// The step between the Y axis labels in dollars.
pub const Y_AXIS_STEP: i64 = 1000;

/// Build the Y axis labels for the revenue chart, from the top label down to "$0K".
///
/// The top label is the largest revenue rounded up to the next thousand.
/// No revenue gives no labels and a top label of zero.
pub fn generate_y_axis(revenue: &[Revenue]) -> (Vec<String>, i64) {
    let Some(highest_record) = revenue.iter().map(|record| record.revenue).max() else {
        return (Vec::new(), 0);
    };

    let top_label = (highest_record.max(0) + Y_AXIS_STEP - 1) / Y_AXIS_STEP * Y_AXIS_STEP;
    let labels = (0..=top_label / Y_AXIS_STEP)
        .rev()
        .map(|thousands| format!("${thousands}K"))
        .collect();

    (labels, top_label)
}
