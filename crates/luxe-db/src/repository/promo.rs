//! # Promotion Repository
//!
//! Database operations for promo codes.
//!
//! ## Redemption Accounting
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Checkout flow                                                          │
//! │                                                                         │
//! │  check(code, subtotal)  ──► discount or tagged rejection (no writes)    │
//! │          │                                                              │
//! │          ▼                                                              │
//! │  place_order(...)       ──► order commits                               │
//! │          │                                                              │
//! │          ▼                                                              │
//! │  record_use(code)       ──► uses = uses + 1, ONLY IF uses < limit       │
//! │                                                                         │
//! │  The increment is a single conditional UPDATE, so two concurrent        │
//! │  checkouts racing on the last redemption cannot push uses past the      │
//! │  cap - one of them simply affects zero rows.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use luxe_core::error::PromoRejection;
use luxe_core::{promo, Money, PromoKind, Promotion};

/// The outcome of checking a promo code: a discount, or why not.
///
/// Rejections are values, not errors - only infrastructure failures surface
/// as `DbError`.
pub type PromoOutcome = Result<Money, PromoRejection>;

/// Repository for promotion database operations.
#[derive(Debug, Clone)]
pub struct PromoRepository {
    pool: SqlitePool,
}

/// Raw promos row; `kind`/`value` fold into the tagged [`PromoKind`].
#[derive(Debug, sqlx::FromRow)]
struct PromoRow {
    code: String,
    kind: String,
    value: i64,
    usage_limit: Option<i64>,
    uses: i64,
    per_customer_only: bool,
    expires_at: Option<DateTime<Utc>>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PromoRow> for Promotion {
    type Error = DbError;

    fn try_from(row: PromoRow) -> Result<Self, Self::Error> {
        let kind = match row.kind.as_str() {
            "percentage" => PromoKind::Percentage {
                bps: row.value as u32,
            },
            "fixed" => PromoKind::Fixed {
                amount_cents: row.value,
            },
            other => {
                return Err(DbError::Internal(format!(
                    "unknown promo kind '{}' for code {}",
                    other, row.code
                )))
            }
        };

        Ok(Promotion {
            code: row.code,
            kind,
            usage_limit: row.usage_limit,
            uses: row.uses,
            per_customer_only: row.per_customer_only,
            expires_at: row.expires_at,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Splits a [`PromoKind`] into its storage columns.
fn kind_columns(kind: PromoKind) -> (&'static str, i64) {
    match kind {
        PromoKind::Percentage { bps } => ("percentage", bps as i64),
        PromoKind::Fixed { amount_cents } => ("fixed", amount_cents),
    }
}

const SELECT_PROMO: &str = r#"
    SELECT code, kind, value, usage_limit, uses, per_customer_only,
           expires_at, active, created_at, updated_at
    FROM promos
"#;

impl PromoRepository {
    /// Creates a new PromoRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PromoRepository { pool }
    }

    /// Looks up a promotion by code, case-insensitively.
    ///
    /// The `promos.code` column collates NOCASE, so `SAVE10` and `save10`
    /// hit the same row.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Promotion>> {
        let row = sqlx::query_as::<_, PromoRow>(&format!("{} WHERE code = ?1", SELECT_PROMO))
            .bind(code.trim())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Promotion::try_from).transpose()
    }

    /// Lists all promotions for the admin back-office, newest first.
    pub async fn list(&self) -> DbResult<Vec<Promotion>> {
        let rows =
            sqlx::query_as::<_, PromoRow>(&format!("{} ORDER BY created_at DESC", SELECT_PROMO))
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(Promotion::try_from).collect()
    }

    /// Checks a promo code against a cart subtotal.
    ///
    /// Resolves the lookup (PROMO_NOT_FOUND on a miss) and delegates the
    /// eligibility rules to the pure validator at the current instant.
    /// Read-only: never consumes a redemption.
    pub async fn check(&self, code: &str, subtotal: Money) -> DbResult<PromoOutcome> {
        let outcome = match self.get_by_code(code).await? {
            None => Err(PromoRejection::NotFound),
            Some(p) => promo::validate(&p, subtotal, Utc::now()),
        };

        debug!(code = %code, ok = outcome.is_ok(), "Promo check");
        Ok(outcome)
    }

    /// Creates a new promotion (admin).
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - code already exists (any casing)
    pub async fn insert(&self, promo: &Promotion) -> DbResult<()> {
        debug!(code = %promo.code, "Inserting promotion");

        let (kind, value) = kind_columns(promo.kind);

        sqlx::query(
            r#"
            INSERT INTO promos (
                code, kind, value, usage_limit, uses, per_customer_only,
                expires_at, active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&promo.code)
        .bind(kind)
        .bind(value)
        .bind(promo.usage_limit)
        .bind(promo.uses)
        .bind(promo.per_customer_only)
        .bind(promo.expires_at)
        .bind(promo.active)
        .bind(promo.created_at)
        .bind(promo.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates a promotion's terms (admin). The redemption counter is NOT
    /// writable here - only `record_use` touches it.
    pub async fn update(&self, promo: &Promotion) -> DbResult<()> {
        debug!(code = %promo.code, "Updating promotion");

        let (kind, value) = kind_columns(promo.kind);
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE promos SET
                kind = ?2,
                value = ?3,
                usage_limit = ?4,
                per_customer_only = ?5,
                expires_at = ?6,
                active = ?7,
                updated_at = ?8
            WHERE code = ?1
            "#,
        )
        .bind(&promo.code)
        .bind(kind)
        .bind(value)
        .bind(promo.usage_limit)
        .bind(promo.per_customer_only)
        .bind(promo.expires_at)
        .bind(promo.active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Promotion", &promo.code));
        }

        Ok(())
    }

    /// Deletes a promotion (admin).
    pub async fn delete(&self, code: &str) -> DbResult<()> {
        debug!(code = %code, "Deleting promotion");

        let result = sqlx::query("DELETE FROM promos WHERE code = ?1")
            .bind(code.trim())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Promotion", code));
        }

        Ok(())
    }

    /// Records one redemption of a code, respecting the usage cap.
    ///
    /// Called by the checkout caller AFTER the order has durably committed,
    /// never during validation. The increment is conditional inside a
    /// single UPDATE statement, so concurrent redemptions of a
    /// near-exhausted code cannot overrun the limit.
    ///
    /// ## Returns
    /// * `Ok(true)` - the redemption was counted
    /// * `Ok(false)` - the code is missing or already at its cap
    pub async fn record_use(&self, code: &str) -> DbResult<bool> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE promos SET
                uses = uses + 1,
                updated_at = ?2
            WHERE code = ?1
              AND (usage_limit IS NULL OR uses < usage_limit)
            "#,
        )
        .bind(code.trim())
        .bind(now)
        .execute(&self.pool)
        .await?;

        let counted = result.rows_affected() > 0;
        debug!(code = %code, counted, "Recording promo use");
        Ok(counted)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
