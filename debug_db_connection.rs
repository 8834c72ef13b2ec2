//! Database connectivity check
//!
//! Connects to `DATABASE_URL`, applies migrations and prints row counts.
//! Useful when the server silently falls back to the in-memory store.

use sqlx::postgres::PgPool;
use sqlx::Row;

use userhub::backend::store::PgStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL is not set");
        std::process::exit(1);
    };

    println!("DEBUGGING DATABASE CONNECTION");
    println!("=============================");

    let pool = match PgPool::connect(&database_url).await {
        Ok(pool) => {
            println!("Connection successful");
            pool
        }
        Err(e) => {
            eprintln!("Connection failed: {}", e);
            std::process::exit(1);
        }
    };

    let row = sqlx::query("SELECT current_database() AS db, current_user AS usr")
        .fetch_one(&pool)
        .await?;
    let db: String = row.try_get("db")?;
    let user: String = row.try_get("usr")?;
    println!("Database: {} (as {})", db, user);

    PgStore::new(pool.clone()).migrate().await?;
    println!("Migrations applied");

    for table in ["permissions", "users"] {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&pool)
            .await?;
        println!("{}: {} row(s)", table, count);
    }

    Ok(())
}
