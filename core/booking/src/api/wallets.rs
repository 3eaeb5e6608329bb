use actix_web::web::{get, Data, Path};
use actix_web::{HttpResponse, Scope};

use servease_persistence::executor::DbExecutor;

use crate::dao::WalletDao;
use crate::models::wallet::OwnerKind;
use crate::utils::response;

use super::model;

const RECENT_TX_LIMIT: i64 = 10;

pub fn register_endpoints(scope: Scope) -> Scope {
    scope.route("/wallets/{customer_id}", get().to(get_wallet))
}

async fn get_wallet(db: Data<DbExecutor>, path: Path<i64>) -> HttpResponse {
    let customer_id = path.into_inner();
    let dao: WalletDao = db.as_dao();
    match dao
        .get_with_recent(OwnerKind::Customer, customer_id, RECENT_TX_LIMIT)
        .await
    {
        Ok(Some((wallet, recent))) => response::ok(model::WalletResponse {
            customer_id,
            wallet_id: wallet.id,
            balance: wallet.balance.into(),
            transactions: recent.into_iter().map(Into::into).collect(),
        }),
        Ok(None) => response::not_found(),
        Err(e) => response::server_error(&e),
    }
}
