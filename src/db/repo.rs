//! Repository layer for database operations.
//!
//! The `Repository` is the Ledger Store boundary: range queries over daily
//! vendor records, monthly closing-balance checkpoints, retention rows, the
//! vendor directory, and operator scopes. The analytics core only reads;
//! the upsert methods exist for the external entry/import collaborators and
//! for test seeding.

use crate::domain::{
    BrandId, DailyVendorRecord, Decimal, MonthlyClosingBalance, RetentionBucket,
    RetentionPercentage, Vendor, VendorId,
};
use chrono::NaiveDate;
use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use std::str::FromStr;
use tracing::warn;

/// A report caller's view scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorScope {
    /// May view every vendor.
    All,
    /// May view only the listed vendors.
    Vendors(Vec<VendorId>),
}

/// A report caller resolved from its api key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    pub api_key: String,
    pub name: String,
    pub scope: OperatorScope,
}

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    // =========================================================================
    // Vendor directory
    // =========================================================================

    /// Insert or update a vendor directory entry.
    pub async fn upsert_vendor(&self, vendor: &Vendor) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO vendors (vendor_id, name, brand_id)
            VALUES (?, ?, ?)
            ON CONFLICT(vendor_id) DO UPDATE SET name = excluded.name, brand_id = excluded.brand_id
            "#,
        )
        .bind(vendor.vendor_id.as_i64())
        .bind(&vendor.name)
        .bind(vendor.brand_id.as_i64())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Look up a single vendor by id.
    pub async fn query_vendor(&self, vendor_id: VendorId) -> Result<Option<Vendor>, sqlx::Error> {
        let row = sqlx::query("SELECT vendor_id, name, brand_id FROM vendors WHERE vendor_id = ?")
            .bind(vendor_id.as_i64())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(vendor_from_row))
    }

    /// All vendors, ordered by id.
    pub async fn query_vendors(&self) -> Result<Vec<Vendor>, sqlx::Error> {
        let rows = sqlx::query("SELECT vendor_id, name, brand_id FROM vendors ORDER BY vendor_id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(vendor_from_row).collect())
    }

    /// All vendors belonging to a brand, ordered by id.
    pub async fn query_vendors_by_brand(
        &self,
        brand_id: BrandId,
    ) -> Result<Vec<Vendor>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT vendor_id, name, brand_id FROM vendors WHERE brand_id = ? ORDER BY vendor_id",
        )
        .bind(brand_id.as_i64())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(vendor_from_row).collect())
    }

    // =========================================================================
    // Daily vendor records
    // =========================================================================

    /// Insert or replace the record for (vendor, day).
    pub async fn upsert_daily_record(
        &self,
        record: &DailyVendorRecord,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO daily_vendor_records (
                vendor_id, day, deposit, withdraw, registration_count, ftd_count,
                ad_expense, ads_commission_rate, ads_chargeback, ads_views,
                ads_clicks, top_up_amount
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(vendor_id, day) DO UPDATE SET
                deposit = excluded.deposit,
                withdraw = excluded.withdraw,
                registration_count = excluded.registration_count,
                ftd_count = excluded.ftd_count,
                ad_expense = excluded.ad_expense,
                ads_commission_rate = excluded.ads_commission_rate,
                ads_chargeback = excluded.ads_chargeback,
                ads_views = excluded.ads_views,
                ads_clicks = excluded.ads_clicks,
                top_up_amount = excluded.top_up_amount
            "#,
        )
        .bind(record.vendor_id.as_i64())
        .bind(record.day.to_string())
        .bind(record.deposit.to_canonical_string())
        .bind(record.withdraw.to_canonical_string())
        .bind(record.registration_count)
        .bind(record.ftd_count)
        .bind(record.ad_expense.to_canonical_string())
        .bind(record.ads_commission_rate.to_canonical_string())
        .bind(record.ads_chargeback.to_canonical_string())
        .bind(record.ads_views)
        .bind(record.ads_clicks)
        .bind(record.top_up_amount.to_canonical_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Records for a vendor in the inclusive [from, to] range, ascending by day.
    pub async fn query_daily_records(
        &self,
        vendor_id: VendorId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyVendorRecord>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT vendor_id, day, deposit, withdraw, registration_count, ftd_count,
                   ad_expense, ads_commission_rate, ads_chargeback, ads_views,
                   ads_clicks, top_up_amount
            FROM daily_vendor_records
            WHERE vendor_id = ? AND day >= ? AND day <= ?
            ORDER BY day ASC
            "#,
        )
        .bind(vendor_id.as_i64())
        .bind(from.to_string())
        .bind(to.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(daily_record_from_row).collect()
    }

    /// Records for a vendor with `from <= day < before`, ascending by day.
    ///
    /// Used for the partial-month prefix fold when a range opens mid-month.
    pub async fn query_daily_records_before(
        &self,
        vendor_id: VendorId,
        from: NaiveDate,
        before: NaiveDate,
    ) -> Result<Vec<DailyVendorRecord>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT vendor_id, day, deposit, withdraw, registration_count, ftd_count,
                   ad_expense, ads_commission_rate, ads_chargeback, ads_views,
                   ads_clicks, top_up_amount
            FROM daily_vendor_records
            WHERE vendor_id = ? AND day >= ? AND day < ?
            ORDER BY day ASC
            "#,
        )
        .bind(vendor_id.as_i64())
        .bind(from.to_string())
        .bind(before.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(daily_record_from_row).collect()
    }

    // =========================================================================
    // Monthly closing-balance checkpoints
    // =========================================================================

    /// Insert or replace a month-end checkpoint.
    pub async fn upsert_closing_balance(
        &self,
        checkpoint: &MonthlyClosingBalance,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO monthly_closing_balances (vendor_id, year, month, closing_balance)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(vendor_id, year, month) DO UPDATE SET
                closing_balance = excluded.closing_balance
            "#,
        )
        .bind(checkpoint.vendor_id.as_i64())
        .bind(checkpoint.year)
        .bind(checkpoint.month as i64)
        .bind(checkpoint.closing_balance.to_canonical_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Closing balance for (vendor, year, month), if a checkpoint exists.
    pub async fn query_closing_balance(
        &self,
        vendor_id: VendorId,
        year: i32,
        month: u32,
    ) -> Result<Option<Decimal>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT closing_balance FROM monthly_closing_balances
            WHERE vendor_id = ? AND year = ? AND month = ?
            "#,
        )
        .bind(vendor_id.as_i64())
        .bind(year)
        .bind(month as i64)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| {
            let raw: String = row.get("closing_balance");
            parse_decimal_column("closing_balance", &raw, vendor_id)
        }))
    }

    // =========================================================================
    // Retention percentages
    // =========================================================================

    /// Insert or replace one retention row.
    pub async fn upsert_retention(
        &self,
        retention: &RetentionPercentage,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO retention_percentages (vendor_id, day, bucket, percentage)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(vendor_id, day, bucket) DO UPDATE SET
                percentage = excluded.percentage
            "#,
        )
        .bind(retention.vendor_id.as_i64())
        .bind(retention.day.to_string())
        .bind(retention.bucket.as_str())
        .bind(retention.percentage.to_canonical_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Retention rows for a vendor in the inclusive [from, to] range.
    ///
    /// Rows with an unknown bucket name are skipped with a warning; buckets
    /// with no row default to zero at the scoring layer.
    pub async fn query_retention(
        &self,
        vendor_id: VendorId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<RetentionPercentage>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT vendor_id, day, bucket, percentage
            FROM retention_percentages
            WHERE vendor_id = ? AND day >= ? AND day <= ?
            ORDER BY day ASC
            "#,
        )
        .bind(vendor_id.as_i64())
        .bind(from.to_string())
        .bind(to.to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let bucket_str: String = row.get("bucket");
            let bucket = match RetentionBucket::from_str(&bucket_str) {
                Ok(b) => b,
                Err(e) => {
                    warn!(vendor_id = %vendor_id, error = %e, "Skipping unknown retention bucket");
                    continue;
                }
            };
            let day_str: String = row.get("day");
            let raw: String = row.get("percentage");
            out.push(RetentionPercentage {
                vendor_id: VendorId::new(row.get("vendor_id")),
                day: parse_day_column(&day_str)?,
                bucket,
                percentage: parse_decimal_column("percentage", &raw, vendor_id),
            });
        }
        Ok(out)
    }

    // =========================================================================
    // Operators (access-control boundary)
    // =========================================================================

    /// Insert or replace an operator and its vendor scope.
    pub async fn upsert_operator(&self, operator: &Operator) -> Result<(), sqlx::Error> {
        let scope_str = match operator.scope {
            OperatorScope::All => "all",
            OperatorScope::Vendors(_) => "vendors",
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO operators (api_key, name, scope)
            VALUES (?, ?, ?)
            ON CONFLICT(api_key) DO UPDATE SET name = excluded.name, scope = excluded.scope
            "#,
        )
        .bind(&operator.api_key)
        .bind(&operator.name)
        .bind(scope_str)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM operator_vendors WHERE api_key = ?")
            .bind(&operator.api_key)
            .execute(&mut *tx)
            .await?;

        if let OperatorScope::Vendors(ref vendor_ids) = operator.scope {
            for vendor_id in vendor_ids {
                sqlx::query("INSERT INTO operator_vendors (api_key, vendor_id) VALUES (?, ?)")
                    .bind(&operator.api_key)
                    .bind(vendor_id.as_i64())
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    /// Resolve an operator by api key, including its vendor scope.
    pub async fn query_operator(&self, api_key: &str) -> Result<Option<Operator>, sqlx::Error> {
        let row = sqlx::query("SELECT api_key, name, scope FROM operators WHERE api_key = ?")
            .bind(api_key)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let scope_str: String = row.get("scope");
        let scope = if scope_str == "all" {
            OperatorScope::All
        } else {
            let vendor_rows = sqlx::query(
                "SELECT vendor_id FROM operator_vendors WHERE api_key = ? ORDER BY vendor_id",
            )
            .bind(api_key)
            .fetch_all(&self.pool)
            .await?;
            OperatorScope::Vendors(
                vendor_rows
                    .iter()
                    .map(|r| VendorId::new(r.get("vendor_id")))
                    .collect(),
            )
        };

        Ok(Some(Operator {
            api_key: row.get("api_key"),
            name: row.get("name"),
            scope,
        }))
    }
}

fn vendor_from_row(row: sqlx::sqlite::SqliteRow) -> Vendor {
    Vendor {
        vendor_id: VendorId::new(row.get("vendor_id")),
        name: row.get("name"),
        brand_id: BrandId::new(row.get("brand_id")),
    }
}

fn daily_record_from_row(row: sqlx::sqlite::SqliteRow) -> Result<DailyVendorRecord, sqlx::Error> {
    let vendor_id = VendorId::new(row.get("vendor_id"));
    let day_str: String = row.get("day");

    let dec = |column: &str| -> Decimal {
        let raw: String = row.get(column);
        parse_decimal_column(column, &raw, vendor_id)
    };

    Ok(DailyVendorRecord {
        vendor_id,
        day: parse_day_column(&day_str)?,
        deposit: dec("deposit"),
        withdraw: dec("withdraw"),
        registration_count: row.get("registration_count"),
        ftd_count: row.get("ftd_count"),
        ad_expense: dec("ad_expense"),
        ads_commission_rate: dec("ads_commission_rate"),
        ads_chargeback: dec("ads_chargeback"),
        ads_views: row.get("ads_views"),
        ads_clicks: row.get("ads_clicks"),
        top_up_amount: dec("top_up_amount"),
    })
}

/// Parse a stored decimal column, warning and defaulting to zero on corruption.
fn parse_decimal_column(column: &str, raw: &str, vendor_id: VendorId) -> Decimal {
    Decimal::from_str(raw).unwrap_or_else(|e| {
        warn!(
            vendor_id = %vendor_id,
            column = column,
            value = raw,
            error = %e,
            "Failed to parse stored decimal, using default"
        );
        Decimal::default()
    })
}

/// Parse a stored ISO day column; corruption here is a hard decode error.
fn parse_day_column(raw: &str) -> Result<NaiveDate, sqlx::Error> {
    NaiveDate::from_str(raw).map_err(|e| sqlx::Error::ColumnDecode {
        index: "day".to_string(),
        source: Box::new(e),
    })
}
