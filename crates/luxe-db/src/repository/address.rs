//! # Address Repository
//!
//! The customer address book.
//!
//! ## Default Uniqueness
//! At most one default-shipping and one default-billing address per owner.
//! Setting a new default clears the previous one in the same transaction,
//! so no read can ever observe two defaults for the same role.
//!
//! Address rows referenced by placed orders may still be edited or deleted
//! here - order history is unaffected because orders carry their own frozen
//! snapshot of the postal fields.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use luxe_core::{Address, AddressRole, PostalAddress};

/// Repository for address-book operations.
#[derive(Debug, Clone)]
pub struct AddressRepository {
    pool: SqlitePool,
}

const SELECT_ADDRESS: &str = r#"
    SELECT id, owner_id, recipient, phone, line1, line2, city, state,
           postal_code, country, role, is_default_shipping,
           is_default_billing, created_at
    FROM addresses
"#;

impl AddressRepository {
    /// Creates a new AddressRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AddressRepository { pool }
    }

    /// Gets an address by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Address>> {
        let address = sqlx::query_as::<_, Address>(&format!("{} WHERE id = ?1", SELECT_ADDRESS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(address)
    }

    /// Lists an owner's addresses, defaults first, then newest.
    pub async fn list_for_owner(&self, owner_id: &str) -> DbResult<Vec<Address>> {
        let addresses = sqlx::query_as::<_, Address>(&format!(
            r#"{}
            WHERE owner_id = ?1
            ORDER BY is_default_shipping DESC, is_default_billing DESC,
                     created_at DESC
            "#,
            SELECT_ADDRESS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(addresses)
    }

    /// Saves a new address to an owner's book.
    ///
    /// When either default flag is set, the previous default for that role
    /// is cleared inside the same transaction - the uniqueness invariant
    /// holds at every commit point.
    pub async fn insert(
        &self,
        owner_id: &str,
        postal: &PostalAddress,
        role: AddressRole,
        is_default_shipping: bool,
        is_default_billing: bool,
    ) -> DbResult<Address> {
        debug!(owner_id = %owner_id, ?role, "Saving address");

        let address = Address {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            recipient: postal.recipient.clone(),
            phone: postal.phone.clone(),
            line1: postal.line1.clone(),
            line2: postal.line2.clone(),
            city: postal.city.clone(),
            state: postal.state.clone(),
            postal_code: postal.postal_code.clone(),
            country: postal.country.clone(),
            role,
            is_default_shipping,
            is_default_billing,
            created_at: Utc::now(),
        };

        let mut tx = self.pool.begin().await?;

        if is_default_shipping {
            sqlx::query("UPDATE addresses SET is_default_shipping = 0 WHERE owner_id = ?1")
                .bind(owner_id)
                .execute(&mut *tx)
                .await?;
        }
        if is_default_billing {
            sqlx::query("UPDATE addresses SET is_default_billing = 0 WHERE owner_id = ?1")
                .bind(owner_id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO addresses (
                id, owner_id, recipient, phone, line1, line2, city, state,
                postal_code, country, role, is_default_shipping,
                is_default_billing, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&address.id)
        .bind(&address.owner_id)
        .bind(&address.recipient)
        .bind(&address.phone)
        .bind(&address.line1)
        .bind(&address.line2)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.postal_code)
        .bind(&address.country)
        .bind(address.role)
        .bind(address.is_default_shipping)
        .bind(address.is_default_billing)
        .bind(address.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(address)
    }

    /// Marks an existing address as the owner's default for one role,
    /// clearing the previous default in the same transaction.
    pub async fn set_default(
        &self,
        owner_id: &str,
        address_id: &str,
        role: AddressRole,
    ) -> DbResult<()> {
        debug!(owner_id = %owner_id, address_id = %address_id, ?role, "Setting default address");

        let flag_column = match role {
            AddressRole::Shipping => "is_default_shipping",
            AddressRole::Billing => "is_default_billing",
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!(
            "UPDATE addresses SET {} = 0 WHERE owner_id = ?1",
            flag_column
        ))
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query(&format!(
            "UPDATE addresses SET {} = 1 WHERE id = ?1 AND owner_id = ?2",
            flag_column
        ))
        .bind(address_id)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Dropping the transaction rolls back the cleared flags
            return Err(DbError::not_found("Address", address_id));
        }

        tx.commit().await?;

        Ok(())
    }

    /// Removes an address from the owner's book.
    ///
    /// Fails with a foreign-key violation if a placed order references the
    /// row; those addresses stay (the book UI hides them instead).
    pub async fn delete(&self, owner_id: &str, address_id: &str) -> DbResult<()> {
        debug!(owner_id = %owner_id, address_id = %address_id, "Deleting address");

        let result = sqlx::query("DELETE FROM addresses WHERE id = ?1 AND owner_id = ?2")
            .bind(address_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Address", address_id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
