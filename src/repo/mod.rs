mod users;

#[cfg(test)]
pub(crate) mod test;

use sqlx::{Pool, Postgres};
pub use users::*;
use crate::config::DatabaseConfig;

#[derive(Clone)]
pub struct Repositories {
    pub users: Users,
}

impl Repositories {
    pub fn new(db_conn: &Pool<Postgres>) -> Self {
        Self {
            users: Users::new(db_conn.clone()),
        }
    }
}

pub async fn establish_database_connection(config: &DatabaseConfig) -> Result<Pool<Postgres>, anyhow::Error> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(config.url.as_str()).await?;
    sqlx::migrate!().run(&pool).await?;
    Ok(pool)
}


#[macro_export]
macro_rules! repository {
    ($name:ident, $($methods:item),*) => {
        #[derive(Clone)]
        pub struct $name {
            pool: sqlx::Pool<sqlx::Postgres>,
        }

        impl $name {
            pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
                Self { pool }
            }

            $($methods)*
        }
    };
}
