use chrono::{NaiveDateTime, Utc};

use crate::schema::bk_provider;

/// Service-provider directory entry. Provisioning happens outside this
/// service; discovery only reads active entries with known coordinates.
#[derive(Queryable, Insertable, Identifiable, Debug, Clone)]
#[table_name = "bk_provider"]
pub struct Provider {
    pub id: i64,
    pub name: String,
    pub active: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: NaiveDateTime,
}

impl Provider {
    pub fn new(id: i64, name: impl Into<String>, latitude: Option<f64>, longitude: Option<f64>) -> Self {
        Self {
            id,
            name: name.into(),
            active: true,
            latitude,
            longitude,
            created_at: Utc::now().naive_utc(),
        }
    }
}
