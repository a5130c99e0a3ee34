use sqlx::sqlite::SqlitePool;
use sqlx::Row;

/// Load every (currency_code, amount) row stored for a user
pub async fn load_wallet(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<(String, String)>, sqlx::Error> {
    let rows = sqlx::query("SELECT currency_code, amount FROM wallet WHERE user_id = ? ORDER BY currency_code")
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|r| (r.get::<String, _>("currency_code"), r.get::<String, _>("amount")))
        .collect())
}

/// Insert or overwrite the stored amount for one currency
pub async fn save_currency(
    pool: &SqlitePool,
    user_id: &str,
    currency_code: &str,
    amount: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO wallet (user_id, currency_code, amount, updated_at) \
         VALUES (?, ?, ?, CURRENT_TIMESTAMP) \
         ON CONFLICT (user_id, currency_code) \
         DO UPDATE SET amount = excluded.amount, updated_at = CURRENT_TIMESTAMP",
    )
    .bind(user_id)
    .bind(currency_code)
    .bind(amount)
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete one currency row. Deleting a missing row is not an error.
pub async fn delete_currency(
    pool: &SqlitePool,
    user_id: &str,
    currency_code: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM wallet WHERE user_id = ? AND currency_code = ?")
        .bind(user_id)
        .bind(currency_code)
        .execute(pool)
        .await?;

    Ok(())
}

