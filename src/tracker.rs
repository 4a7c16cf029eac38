//! Seat accounting for licenses.
//!
//! Every function here expects to run on a connection that already holds the
//! SQLite write lock (an `IMMEDIATE` transaction opened by the engine). That is
//! what makes `reserve`'s count-then-insert atomic with respect to other
//! reservations on the same license.

use rusqlite::Connection;

use crate::db::queries;
use crate::error::{AppError, Result};
use crate::models::{Activation, License};

/// Outcome of reserving a seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reservation {
    /// The device already held a seat; nothing changed
    Existing(Activation),
    /// A new seat was taken
    Created(Activation),
}

impl Reservation {
    pub fn activation(&self) -> &Activation {
        match self {
            Reservation::Existing(a) | Reservation::Created(a) => a,
        }
    }

    pub fn into_activation(self) -> Activation {
        match self {
            Reservation::Existing(a) | Reservation::Created(a) => a,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Reservation::Created(_))
    }
}

/// Reserve a seat on `license` for `device_id`.
///
/// Lookup-or-insert on `(license_id, device_id)`: an existing activation is
/// returned unchanged, otherwise the live count is checked against
/// `max_activations` before inserting. The caller is responsible for checking
/// license status.
pub fn reserve(
    conn: &Connection,
    license: &License,
    device_id: &str,
    ip_address: Option<&str>,
) -> Result<Reservation> {
    if let Some(existing) = queries::get_activation(conn, &license.id, device_id)? {
        return Ok(Reservation::Existing(existing));
    }

    let live = count(conn, &license.id)?;
    if live >= license.max_activations {
        return Err(AppError::ActivationLimitExceeded {
            max: license.max_activations,
        });
    }

    let activation = queries::new_activation(&license.id, device_id, ip_address);
    queries::insert_activation(conn, &activation)?;
    Ok(Reservation::Created(activation))
}

/// Free the seat held by one device. Returns false if it held none.
pub fn release(conn: &Connection, license_id: &str, device_id: &str) -> Result<bool> {
    queries::delete_activation(conn, license_id, device_id)
}

/// Free every seat on a license, returning how many were removed.
pub fn release_all(conn: &Connection, license_id: &str) -> Result<usize> {
    queries::delete_activations_for_license(conn, license_id)
}

/// Live activation count for a license.
pub fn count(conn: &Connection, license_id: &str) -> Result<u32> {
    queries::count_activations_for_license(conn, license_id)
}
