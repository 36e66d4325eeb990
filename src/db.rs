use std::{str::FromStr, time::Duration};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode},
    SqlitePool,
};

use crate::{
    errors::AppError,
    seed,
    structs::{
        CardData, Currency, CustomerField, CustomerSummary, Invoice, InvoiceListing, InvoiceStatus, Revenue,
        StockListing, User,
    },
    utils::{format_currency, hash_password},
    AppState,
};

pub const ITEMS_PER_PAGE: i64 = 6;

pub async fn connect(database_url: &str) -> Result<SqlitePool, AppError> {
    let opts = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .read_only(false)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePool::connect_with(opts).await?;
    Ok(pool)
}

/// Creates any missing table so pages work before the first seeding run.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), AppError> {
    let mut conn = pool.acquire().await?;
    seed::create_tables(&mut conn).await?;
    Ok(())
}

/// `%query%` for LIKE matching. SQLite's LIKE is already case-insensitive for ASCII.
fn like_pattern(query: &str) -> String {
    format!("%{}%", query.trim())
}

pub async fn get_all_users(state: &AppState) -> Result<Vec<User>, sqlx::Error> {
    let pool = state.db_pool.clone();
    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY name ASC")
        .fetch_all(&pool)
        .await?;
    Ok(users)
}

pub async fn get_user_by_email(state: &AppState, email: &str) -> Result<Option<User>, sqlx::Error> {
    let pool = state.db_pool.clone();
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(&pool)
        .await?;
    Ok(user)
}

pub async fn create_user(
    state: &AppState,
    name: String,
    email: String,
    password: String,
) -> Result<User, AppError> {
    let id = uuid::Uuid::new_v4().to_string();
    // Keep argon2 off the async workers.
    let pwd_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;
    let pool = state.db_pool.clone();
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (id, name, email, password) VALUES (?, ?, ?, ?) RETURNING *",
    )
    .bind(id)
    .bind(name)
    .bind(email)
    .bind(pwd_hash)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        log::error!("Failed to create user: {}", e);
        AppError::DatabaseError(e)
    })?;
    log::info!("User created: {}", user.email);
    Ok(user)
}

pub async fn fetch_card_data(state: &AppState) -> Result<CardData, sqlx::Error> {
    let pool = state.db_pool.clone();
    let number_of_customers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
        .fetch_one(&pool)
        .await?;
    let number_of_invoices: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoices")
        .fetch_one(&pool)
        .await?;
    let (paid, pending): (i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COALESCE(SUM(CASE WHEN status = 'paid' THEN amount ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN status = 'pending' THEN amount ELSE 0 END), 0)
        FROM invoices
        "#,
    )
    .fetch_one(&pool)
    .await?;

    Ok(CardData {
        number_of_customers,
        number_of_invoices,
        total_paid_invoices: format_currency(paid),
        total_pending_invoices: format_currency(pending),
    })
}

pub async fn fetch_revenue(state: &AppState) -> Result<Vec<Revenue>, sqlx::Error> {
    let pool = state.db_pool.clone();
    sqlx::query_as::<_, Revenue>("SELECT month, revenue FROM revenue ORDER BY rowid")
        .fetch_all(&pool)
        .await
}

pub async fn fetch_latest_invoices(state: &AppState) -> Result<Vec<InvoiceListing>, sqlx::Error> {
    let pool = state.db_pool.clone();
    sqlx::query_as::<_, InvoiceListing>(
        r#"
        SELECT invoices.id, invoices.customer_id, invoices.amount, invoices.status, invoices.date,
               customers.name, customers.email, customers.image_url
        FROM invoices
        JOIN customers ON invoices.customer_id = customers.id
        ORDER BY invoices.date DESC
        LIMIT 5
        "#,
    )
    .fetch_all(&pool)
    .await
}

const INVOICE_FILTER: &str = r#"
    FROM invoices
    JOIN customers ON invoices.customer_id = customers.id
    WHERE customers.name LIKE ?1
       OR customers.email LIKE ?1
       OR CAST(invoices.amount AS TEXT) LIKE ?1
       OR invoices.date LIKE ?1
       OR invoices.status LIKE ?1
"#;

pub async fn fetch_filtered_invoices(
    state: &AppState,
    query: &str,
    page: i64,
) -> Result<Vec<InvoiceListing>, sqlx::Error> {
    let pool = state.db_pool.clone();
    let offset = (page.max(1) - 1) * ITEMS_PER_PAGE;
    let sql = format!(
        r#"
        SELECT invoices.id, invoices.customer_id, invoices.amount, invoices.status, invoices.date,
               customers.name, customers.email, customers.image_url
        {}
        ORDER BY invoices.date DESC
        LIMIT ?2 OFFSET ?3
        "#,
        INVOICE_FILTER
    );
    sqlx::query_as::<_, InvoiceListing>(&sql)
        .bind(like_pattern(query))
        .bind(ITEMS_PER_PAGE)
        .bind(offset)
        .fetch_all(&pool)
        .await
}

pub async fn fetch_invoice_pages(state: &AppState, query: &str) -> Result<i64, sqlx::Error> {
    let pool = state.db_pool.clone();
    let sql = format!("SELECT COUNT(*) {}", INVOICE_FILTER);
    let count: i64 = sqlx::query_scalar(&sql)
        .bind(like_pattern(query))
        .fetch_one(&pool)
        .await?;
    Ok((count + ITEMS_PER_PAGE - 1) / ITEMS_PER_PAGE)
}

pub async fn fetch_invoice_by_id(state: &AppState, id: &str) -> Result<Option<Invoice>, sqlx::Error> {
    let pool = state.db_pool.clone();
    sqlx::query_as::<_, Invoice>("SELECT * FROM invoices WHERE id = ?")
        .bind(id)
        .fetch_optional(&pool)
        .await
}

pub async fn customer_exists(state: &AppState, id: &str) -> Result<bool, sqlx::Error> {
    let pool = state.db_pool.clone();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE id = ?")
        .bind(id)
        .fetch_one(&pool)
        .await?;
    Ok(count > 0)
}

pub async fn create_invoice(
    state: &AppState,
    customer_id: &str,
    amount: i64,
    status: InvoiceStatus,
) -> Result<Invoice, sqlx::Error> {
    let pool = state.db_pool.clone();
    let id = uuid::Uuid::new_v4().to_string();
    let date = chrono::Utc::now().format("%Y-%m-%d").to_string();
    let invoice = sqlx::query_as::<_, Invoice>(
        "INSERT INTO invoices (id, customer_id, amount, status, date) VALUES (?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(id)
    .bind(customer_id)
    .bind(amount)
    .bind(status.as_str())
    .bind(date)
    .fetch_one(&pool)
    .await?;
    log::info!("Invoice created: {}", invoice.id);
    Ok(invoice)
}

/// Returns `None` when no invoice has this id.
pub async fn update_invoice(
    state: &AppState,
    id: &str,
    customer_id: &str,
    amount: i64,
    status: InvoiceStatus,
) -> Result<Option<Invoice>, sqlx::Error> {
    let pool = state.db_pool.clone();
    let invoice = sqlx::query_as::<_, Invoice>(
        "UPDATE invoices SET customer_id = ?, amount = ?, status = ? WHERE id = ? RETURNING *",
    )
    .bind(customer_id)
    .bind(amount)
    .bind(status.as_str())
    .bind(id)
    .fetch_optional(&pool)
    .await?;
    if let Some(invoice) = &invoice {
        log::info!("Invoice updated: {}", invoice.id);
    }
    Ok(invoice)
}

pub async fn delete_invoice(state: &AppState, id: &str) -> Result<bool, sqlx::Error> {
    let pool = state.db_pool.clone();
    let deleted = sqlx::query("DELETE FROM invoices WHERE id = ?")
        .bind(id)
        .execute(&pool)
        .await?
        .rows_affected();
    log::info!("Invoice with id {} deleted ({} rows)", id, deleted);
    Ok(deleted > 0)
}

pub async fn fetch_customer_names(state: &AppState) -> Result<Vec<CustomerField>, sqlx::Error> {
    let pool = state.db_pool.clone();
    sqlx::query_as::<_, CustomerField>("SELECT id, name FROM customers ORDER BY name ASC")
        .fetch_all(&pool)
        .await
}

pub async fn fetch_filtered_customers(
    state: &AppState,
    query: &str,
) -> Result<Vec<CustomerSummary>, sqlx::Error> {
    let pool = state.db_pool.clone();
    sqlx::query_as::<_, CustomerSummary>(
        r#"
        SELECT
            customers.id,
            customers.name,
            customers.email,
            customers.image_url,
            COUNT(invoices.id) AS total_invoices,
            COALESCE(SUM(CASE WHEN invoices.status = 'pending' THEN invoices.amount ELSE 0 END), 0) AS total_pending,
            COALESCE(SUM(CASE WHEN invoices.status = 'paid' THEN invoices.amount ELSE 0 END), 0) AS total_paid
        FROM customers
        LEFT JOIN invoices ON customers.id = invoices.customer_id
        WHERE customers.name LIKE ?1 OR customers.email LIKE ?1
        GROUP BY customers.id, customers.name, customers.email, customers.image_url
        ORDER BY customers.name ASC
        "#,
    )
    .bind(like_pattern(query))
    .fetch_all(&pool)
    .await
}

pub async fn fetch_filtered_stocks(
    state: &AppState,
    query: &str,
) -> Result<Vec<StockListing>, sqlx::Error> {
    let pool = state.db_pool.clone();
    sqlx::query_as::<_, StockListing>(
        r#"
        SELECT stocks.ticker, stocks.company_name, stocks.market, stocks.stock_type,
               stocks.currency_code, currencies.currency_name, currencies.conversion_rate
        FROM stocks
        JOIN currencies ON stocks.currency_code = currencies.currency_code
        WHERE stocks.ticker LIKE ?1 OR stocks.company_name LIKE ?1 OR stocks.market LIKE ?1
        ORDER BY stocks.ticker ASC
        "#,
    )
    .bind(like_pattern(query))
    .fetch_all(&pool)
    .await
}

pub async fn fetch_currencies(state: &AppState) -> Result<Vec<Currency>, sqlx::Error> {
    let pool = state.db_pool.clone();
    sqlx::query_as::<_, Currency>("SELECT * FROM currencies ORDER BY currency_code ASC")
        .fetch_all(&pool)
        .await
}

/// Single-connection in-memory database; every connection to `sqlite::memory:`
/// would otherwise see its own empty database.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let opts = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(opts)
        .await
        .unwrap()
}
