use diesel::prelude::*;

use servease_persistence::executor::{
    do_with_transaction, readonly_transaction, AsDao, PoolType,
};

use crate::error::Result;
use crate::models::provider::Provider;
use crate::schema::bk_provider::dsl;

pub struct ProviderDao<'c> {
    pool: &'c PoolType,
}

impl<'c> AsDao<'c> for ProviderDao<'c> {
    fn as_dao(pool: &'c PoolType) -> Self {
        Self { pool }
    }
}

impl<'c> ProviderDao<'c> {
    pub async fn get(&self, provider_id: i64) -> Result<Option<Provider>> {
        readonly_transaction(self.pool, move |conn| {
            Ok(dsl::bk_provider
                .find(provider_id)
                .first(conn)
                .optional()?)
        })
        .await
    }

    /// Discovery input: active providers that shared their coordinates.
    pub async fn active_with_location(&self) -> Result<Vec<(i64, f64, f64)>> {
        readonly_transaction(self.pool, move |conn| {
            let providers: Vec<Provider> = dsl::bk_provider
                .filter(dsl::active.eq(true))
                .filter(dsl::latitude.is_not_null())
                .filter(dsl::longitude.is_not_null())
                .load(conn)?;
            Ok(providers
                .into_iter()
                .filter_map(|p| match (p.latitude, p.longitude) {
                    (Some(lat), Some(lon)) => Some((p.id, lat, lon)),
                    _ => None,
                })
                .collect())
        })
        .await
    }

    pub async fn upsert(&self, provider: Provider) -> Result<()> {
        do_with_transaction(self.pool, move |conn| {
            diesel::replace_into(dsl::bk_provider)
                .values(&provider)
                .execute(conn)?;
            Ok(())
        })
        .await
    }
}
