use std::env;
use std::path::Path;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::{Connection, SqliteConnection};
use diesel_migrations::RunMigrationsError;
use dotenv::dotenv;

pub type PoolType = Pool<ConnectionManager<InnerConnType>>;
pub type ConnType = PooledConnection<ConnectionManager<InnerConnType>>;
pub type InnerConnType = SqliteConnection;

/// Applied to every checked-out connection. `busy_timeout` matters: the
/// assignment arbiter opens EXCLUSIVE transactions, so concurrent writers
/// must wait for the lock instead of failing with `SQLITE_BUSY`.
const CONNECTION_INIT: &str = r"
PRAGMA busy_timeout = 15000;
PRAGMA synchronous = NORMAL;
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Database connection error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("Database query error: {0}")]
    Diesel(#[from] diesel::result::Error),
    #[error("Runtime error: {0}")]
    RuntimeError(#[from] tokio::task::JoinError),
}

pub type DbResult<T> = Result<T, Error>;

#[derive(Clone)]
pub struct DbExecutor {
    pub pool: PoolType,
}

impl DbExecutor {
    pub fn new<S: Into<String>>(database_url: S) -> DbResult<Self> {
        let database_url = database_url.into();
        log::info!("using database at: {}", database_url);
        let manager = ConnectionManager::new(database_url);
        let pool = Pool::builder().build(manager)?;
        Ok(DbExecutor { pool })
    }

    pub fn from_env() -> DbResult<Self> {
        dotenv().ok();
        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| "servease.db".into());
        Self::new(database_url)
    }

    pub fn from_data_dir(data_dir: &Path, name: &str) -> anyhow::Result<Self> {
        let db = data_dir.join(name).with_extension("db");
        Ok(Self::new(db.to_string_lossy())?)
    }

    pub fn conn(&self) -> DbResult<ConnType> {
        prepare_connection(&self.pool)
    }

    pub fn as_dao<'a, T: AsDao<'a>>(&'a self) -> T {
        AsDao::as_dao(&self.pool)
    }

    pub fn apply_migration<
        T: FnOnce(&ConnType, &mut dyn std::io::Write) -> Result<(), RunMigrationsError>,
    >(
        &self,
        migration: T,
    ) -> anyhow::Result<()> {
        let conn = self.conn()?;
        migration(&conn, &mut std::io::stderr())?;
        Ok(())
    }
}

pub trait AsDao<'a> {
    fn as_dao(pool: &'a PoolType) -> Self;
}

fn prepare_connection(pool: &PoolType) -> DbResult<ConnType> {
    let conn = pool.get()?;
    conn.batch_execute(CONNECTION_INIT)?;
    Ok(conn)
}

async fn with_connection<R: Send + 'static, Error, F>(pool: &PoolType, f: F) -> Result<R, Error>
where
    Error: Send
        + 'static
        + From<tokio::task::JoinError>
        + From<r2d2::Error>
        + From<diesel::result::Error>,
    F: FnOnce(&ConnType) -> Result<R, Error> + Send + 'static,
{
    let pool = pool.clone();
    match tokio::task::spawn_blocking(move || {
        let conn = prepare_connection(&pool).map_err(|e| match e {
            self::Error::Pool(e) => Error::from(e),
            self::Error::Diesel(e) => Error::from(e),
            self::Error::RuntimeError(e) => Error::from(e),
        })?;
        f(&conn)
    })
    .await
    {
        Ok(result) => result,
        Err(join_err) => Err(From::from(join_err)),
    }
}

/// Runs `f` inside an IMMEDIATE transaction: the write lock is taken at
/// BEGIN, so the closure's read-modify-write sequences are atomic with
/// respect to every other writer.
pub async fn do_with_transaction<R: Send + 'static, Error, F>(
    pool: &PoolType,
    f: F,
) -> Result<R, Error>
where
    Error: Send
        + 'static
        + From<tokio::task::JoinError>
        + From<r2d2::Error>
        + From<diesel::result::Error>,
    F: FnOnce(&ConnType) -> Result<R, Error> + Send + 'static,
{
    with_connection(pool, move |conn| conn.immediate_transaction(|| f(conn))).await
}

/// Runs `f` inside an EXCLUSIVE transaction. This is the SQLite stand-in
/// for `SELECT ... FOR UPDATE`: a contended check-then-act sequence
/// serializes against all other transactions for its whole duration.
pub async fn do_with_exclusive_transaction<R: Send + 'static, Error, F>(
    pool: &PoolType,
    f: F,
) -> Result<R, Error>
where
    Error: Send
        + 'static
        + From<tokio::task::JoinError>
        + From<r2d2::Error>
        + From<diesel::result::Error>,
    F: FnOnce(&ConnType) -> Result<R, Error> + Send + 'static,
{
    with_connection(pool, move |conn| conn.exclusive_transaction(|| f(conn))).await
}

pub async fn readonly_transaction<R: Send + 'static, Error, F>(
    pool: &PoolType,
    f: F,
) -> Result<R, Error>
where
    Error: Send
        + 'static
        + From<tokio::task::JoinError>
        + From<r2d2::Error>
        + From<diesel::result::Error>,
    F: FnOnce(&ConnType) -> Result<R, Error> + Send + 'static,
{
    with_connection(pool, move |conn| conn.transaction(|| f(conn))).await
}
