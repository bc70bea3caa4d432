use crate::{app_env, build_router, db, persistence, SharedData};
use axum::Router;
use chrono::{Duration, Utc};
use dotenv::dotenv;
use lazy_static::lazy_static;
use rand::{thread_rng, Rng};
use sqlx::{Connection, PgConnection, PgPool};
use std::env;
use std::future::Future;
use tokio::runtime::Runtime;

lazy_static! {
    static ref TOKIO_RT: Runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Tokio runtime failed to initialize");
}

struct TestDatabase {
    base_url: String,
    db_name: String,
}

impl TestDatabase {
    async fn create(base_url: &str) -> Result<TestDatabase, sqlx::Error> {
        let db_id: u32 = thread_rng().gen_range(10_000..99_999);
        let db_name = format!("test_db_{db_id}");
        let mut conn = PgConnection::connect(base_url).await?;

        sqlx::query(&format!("CREATE DATABASE {db_name}"))
            .execute(&mut conn)
            .await?;
        conn.close().await?;

        Ok(TestDatabase {
            base_url: base_url.trim_end_matches('/').to_owned(),
            db_name,
        })
    }

    fn url(&self) -> String {
        format!("{}/{}", self.base_url, self.db_name)
    }

    async fn drop_db(self) {
        let result = async {
            let mut conn = PgConnection::connect(&self.base_url).await?;
            sqlx::query(&format!("DROP DATABASE IF EXISTS {}", self.db_name))
                .execute(&mut conn)
                .await?;
            conn.close().await
        }
        .await;

        if let Err(err) = result {
            println!(
                "Warning: failed to drop test database {}, you may need to do it manually. Error: {err}",
                self.db_name
            );
        }
    }
}

/// Creates a fresh, migrated database for a single test and drops it afterward.
///
/// Expects that the TEST_DB_URL environment variable holds a postgres connection string
/// without a database name, for a user allowed to create databases.
pub fn prepare_db_and_test<F, R>(test_fn: F)
where
    R: Future<Output = ()>,
    F: FnOnce(PgPool) -> R,
{
    if dotenv().is_err() {
        println!("Test is running without .env file.");
    }

    TOKIO_RT.block_on(async move {
        let base_url = env::var(app_env::test::TEST_DB_URL).expect(
            "You must provide the TEST_DB_URL environment variable as the base postgres connection string",
        );
        let test_db = TestDatabase::create(&base_url)
            .await
            .unwrap_or_else(|err| panic!("Failed to start test database: {err}"));

        let pool = db::connect_sqlx(&test_db.url(), 5).expect("test database URL should parse");
        db::migrate(&pool).await.expect("migrations should apply");

        test_fn(pool.clone()).await;

        pool.close().await;
        test_db.drop_db().await;
    });
}

/// Registers a user with a session as the auth provider would
pub async fn seed_session(pool: &PgPool, user_id: &str, name: &str, token: &str) {
    seed_session_expiring(pool, user_id, name, token, Duration::hours(1)).await;
}

pub async fn seed_session_expiring(
    pool: &PgPool,
    user_id: &str,
    name: &str,
    token: &str,
    expires_in: Duration,
) {
    sqlx::query(r#"INSERT INTO "user" (id, name, email) VALUES ($1, $2, $3) ON CONFLICT DO NOTHING"#)
        .bind(user_id)
        .bind(name)
        .bind(format!("{user_id}@example.com"))
        .execute(pool)
        .await
        .expect("user should insert");

    sqlx::query("INSERT INTO session (id, token, user_id, expires_at) VALUES ($1, $2, $3, $4)")
        .bind(format!("session-{token}"))
        .bind(token)
        .bind(user_id)
        .bind(Utc::now() + expires_in)
        .execute(pool)
        .await
        .expect("session should insert");
}

pub fn router_for(pool: PgPool) -> Router {
    build_router(SharedData {
        ext_cxn: persistence::ExternalConnectivity::new(pool),
        session_cookie_name: app_env::DEFAULT_SESSION_COOKIE_NAME.to_owned(),
    })
}
