//! MySQL driver bindings

use async_trait::async_trait;
use mysql_async::{Opts, Pool};

use crate::db::driver::PoolDriver;

#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlDriver;

#[async_trait]
impl PoolDriver for MySqlDriver {
    type Pool = Pool;

    fn create_pool(&self, uri: &str) -> Result<Pool, String> {
        let opts = Opts::from_url(uri).map_err(|e| e.to_string())?;
        Ok(Pool::new(opts))
    }

    async fn check_out(&self, pool: &Pool) -> Result<(), String> {
        let conn = pool.get_conn().await.map_err(|e| e.to_string())?;
        // dropping the connection returns it to the pool
        drop(conn);
        Ok(())
    }

    async fn end(&self, pool: &Pool) -> Result<(), String> {
        pool.clone().disconnect().await.map_err(|e| e.to_string())
    }
}
