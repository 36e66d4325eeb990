use std::fmt;

use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tokio::task::JoinSet;

use crate::{errors::AppError, placeholder, utils};

/// Idempotent schema, in dependency order: referenced tables come before the
/// tables holding foreign keys to them.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS customers (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        image_url TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS invoices (
        id TEXT PRIMARY KEY NOT NULL,
        customer_id TEXT NOT NULL,
        amount INTEGER NOT NULL,
        status TEXT NOT NULL CHECK (status IN ('pending', 'paid')),
        date TEXT NOT NULL,
        FOREIGN KEY (customer_id) REFERENCES customers(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS revenue (
        month TEXT NOT NULL UNIQUE,
        revenue INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS currencies (
        currency_code TEXT PRIMARY KEY NOT NULL CHECK (length(currency_code) = 3),
        currency_name TEXT NOT NULL,
        conversion_rate REAL NOT NULL,
        last_updated TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS currencies_touch_last_updated
    AFTER UPDATE ON currencies
    FOR EACH ROW WHEN NEW.last_updated IS OLD.last_updated
    BEGIN
        UPDATE currencies SET last_updated = CURRENT_TIMESTAMP
        WHERE currency_code = NEW.currency_code;
    END
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS stocks (
        ticker TEXT PRIMARY KEY NOT NULL,
        company_name TEXT NOT NULL,
        market TEXT NOT NULL,
        stock_type TEXT NOT NULL,
        currency_code TEXT NOT NULL,
        FOREIGN KEY (currency_code) REFERENCES currencies(currency_code) ON DELETE CASCADE
    )
    "#,
];

pub async fn create_tables(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(&mut *conn).await?;
    }
    Ok(())
}

/// Rows actually inserted per table by one seeding run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub users: u64,
    pub customers: u64,
    pub invoices: u64,
    pub revenue: u64,
    pub currencies: u64,
    pub stocks: u64,
}

impl SeedReport {
    pub fn total(&self) -> u64 {
        self.users + self.customers + self.invoices + self.revenue + self.currencies + self.stocks
    }
}

impl fmt::Display for SeedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "users={} customers={} invoices={} revenue={} currencies={} stocks={}",
            self.users, self.customers, self.invoices, self.revenue, self.currencies, self.stocks
        )
    }
}

/// Creates every table and inserts the placeholder rows inside one
/// transaction. Any failure rolls the whole run back.
pub async fn seed_database(pool: &SqlitePool) -> Result<SeedReport, AppError> {
    let mut tx = pool.begin().await.map_err(|e| {
        log::error!("Failed to begin seeding transaction: {}", e);
        AppError::DatabaseError(e)
    })?;

    match seed_all(&mut tx).await {
        Ok(report) => {
            tx.commit().await.map_err(|e| {
                log::error!("Failed to commit seeding transaction: {}", e);
                AppError::DatabaseError(e)
            })?;
            log::info!("Database seeded, {} new rows: {}", report.total(), report);
            Ok(report)
        }
        Err(e) => {
            log::error!("Seeding failed, rolling back: {}", e);
            if let Err(rollback_err) = tx.rollback().await {
                log::error!("Rollback failed: {}", rollback_err);
            }
            Err(e)
        }
    }
}

async fn seed_all(conn: &mut SqliteConnection) -> Result<SeedReport, AppError> {
    create_tables(conn).await?;

    Ok(SeedReport {
        users: seed_users(conn).await?,
        customers: seed_customers(conn).await?,
        invoices: seed_invoices(conn).await?,
        revenue: seed_revenue(conn).await?,
        currencies: seed_currencies(conn).await?,
        stocks: seed_stocks(conn).await?,
    })
}

async fn seed_users(conn: &mut SqliteConnection) -> Result<u64, AppError> {
    // Argon2 is CPU bound, so hash every password off the async workers first.
    let mut hashing = JoinSet::new();
    for user in placeholder::USERS {
        hashing.spawn_blocking(move || utils::hash_password(user.password).map(|hash| (user, hash)));
    }
    let mut hashed = Vec::with_capacity(placeholder::USERS.len());
    while let Some(joined) = hashing.join_next().await {
        hashed.push(joined??);
    }

    let mut inserted = 0;
    for (user, hash) in hashed {
        inserted += sqlx::query(
            "INSERT INTO users (id, name, email, password) VALUES (?, ?, ?, ?) ON CONFLICT (id) DO NOTHING",
        )
        .bind(user.id)
        .bind(user.name)
        .bind(user.email)
        .bind(hash)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    }
    Ok(inserted)
}

async fn seed_customers(conn: &mut SqliteConnection) -> Result<u64, AppError> {
    let mut inserted = 0;
    for customer in placeholder::CUSTOMERS {
        inserted += sqlx::query(
            "INSERT INTO customers (id, name, email, image_url) VALUES (?, ?, ?, ?) ON CONFLICT (id) DO NOTHING",
        )
        .bind(customer.id)
        .bind(customer.name)
        .bind(customer.email)
        .bind(customer.image_url)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    }
    Ok(inserted)
}

async fn seed_invoices(conn: &mut SqliteConnection) -> Result<u64, AppError> {
    let mut inserted = 0;
    for invoice in placeholder::INVOICES {
        inserted += sqlx::query(
            "INSERT INTO invoices (id, customer_id, amount, status, date) VALUES (?, ?, ?, ?, ?) ON CONFLICT (id) DO NOTHING",
        )
        .bind(invoice.id)
        .bind(invoice.customer_id)
        .bind(invoice.amount)
        .bind(invoice.status)
        .bind(invoice.date)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    }
    Ok(inserted)
}

async fn seed_revenue(conn: &mut SqliteConnection) -> Result<u64, AppError> {
    let mut inserted = 0;
    for rev in placeholder::REVENUE {
        inserted += sqlx::query(
            "INSERT INTO revenue (month, revenue) VALUES (?, ?) ON CONFLICT (month) DO NOTHING",
        )
        .bind(rev.month)
        .bind(rev.revenue)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    }
    Ok(inserted)
}

async fn seed_currencies(conn: &mut SqliteConnection) -> Result<u64, AppError> {
    let mut inserted = 0;
    for currency in placeholder::CURRENCIES {
        inserted += sqlx::query(
            "INSERT INTO currencies (currency_code, currency_name, conversion_rate) VALUES (?, ?, ?) ON CONFLICT (currency_code) DO NOTHING",
        )
        .bind(currency.currency_code)
        .bind(currency.currency_name)
        .bind(currency.conversion_rate)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    }
    Ok(inserted)
}

async fn seed_stocks(conn: &mut SqliteConnection) -> Result<u64, AppError> {
    let mut inserted = 0;
    for stock in placeholder::STOCKS {
        inserted += sqlx::query(
            "INSERT INTO stocks (ticker, company_name, market, stock_type, currency_code) VALUES (?, ?, ?, ?, ?) ON CONFLICT (ticker) DO NOTHING",
        )
        .bind(stock.ticker)
        .bind(stock.company_name)
        .bind(stock.market)
        .bind(stock.stock_type)
        .bind(stock.currency_code)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    }
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    const TABLES: [&str; 6] = ["users", "customers", "invoices", "revenue", "currencies", "stocks"];

    async fn row_counts(pool: &SqlitePool) -> Vec<i64> {
        let mut counts = Vec::new();
        for table in TABLES {
            let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
                .fetch_one(pool)
                .await
                .unwrap();
            counts.push(count);
        }
        counts
    }

    async fn table_exists(pool: &SqlitePool, name: &str) -> bool {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind(name)
                .fetch_one(pool)
                .await
                .unwrap();
        count == 1
    }

    #[actix_web::test]
    async fn seeds_every_table() {
        let pool = test_pool().await;
        let report = seed_database(&pool).await.unwrap();

        assert_eq!(report.users, placeholder::USERS.len() as u64);
        assert_eq!(report.customers, placeholder::CUSTOMERS.len() as u64);
        assert_eq!(report.invoices, placeholder::INVOICES.len() as u64);
        assert_eq!(report.revenue, placeholder::REVENUE.len() as u64);
        assert_eq!(report.currencies, placeholder::CURRENCIES.len() as u64);
        assert_eq!(report.stocks, placeholder::STOCKS.len() as u64);

        let counts = row_counts(&pool).await;
        assert_eq!(
            counts,
            vec![
                placeholder::USERS.len() as i64,
                placeholder::CUSTOMERS.len() as i64,
                placeholder::INVOICES.len() as i64,
                placeholder::REVENUE.len() as i64,
                placeholder::CURRENCIES.len() as i64,
                placeholder::STOCKS.len() as i64,
            ]
        );
    }

    #[actix_web::test]
    async fn seeding_twice_changes_nothing() {
        let pool = test_pool().await;
        seed_database(&pool).await.unwrap();
        let first = row_counts(&pool).await;

        let second_report = seed_database(&pool).await.unwrap();
        assert_eq!(second_report.total(), 0);
        assert_eq!(row_counts(&pool).await, first);
    }

    #[actix_web::test]
    async fn seeded_passwords_are_hashed() {
        let pool = test_pool().await;
        seed_database(&pool).await.unwrap();

        let stored: String = sqlx::query_scalar("SELECT password FROM users WHERE email = ?")
            .bind("user@nextmail.com")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_ne!(stored, "123456");
        assert!(utils::verify_password("123456", &stored).unwrap());
    }

    #[actix_web::test]
    async fn failure_rolls_back_the_whole_run() {
        let pool = test_pool().await;
        // No unique constraint on month, so the conflict clause is rejected
        // after users, customers and invoices were already written.
        sqlx::query("CREATE TABLE revenue (month TEXT, revenue INTEGER)")
            .execute(&pool)
            .await
            .unwrap();

        assert!(seed_database(&pool).await.is_err());

        assert!(!table_exists(&pool, "users").await);
        assert!(!table_exists(&pool, "customers").await);
        assert!(!table_exists(&pool, "invoices").await);
        assert!(table_exists(&pool, "revenue").await);
    }

    #[actix_web::test]
    async fn currency_updates_restamp_last_updated() {
        let pool = test_pool().await;
        seed_database(&pool).await.unwrap();
        sqlx::query("UPDATE currencies SET last_updated = '2000-01-01 00:00:00' WHERE currency_code = 'USD'")
            .execute(&pool)
            .await
            .unwrap();

        sqlx::query("UPDATE currencies SET conversion_rate = 7.2 WHERE currency_code = 'USD'")
            .execute(&pool)
            .await
            .unwrap();

        let stamped: String =
            sqlx::query_scalar("SELECT last_updated FROM currencies WHERE currency_code = 'USD'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_ne!(stamped, "2000-01-01 00:00:00");
    }
}
