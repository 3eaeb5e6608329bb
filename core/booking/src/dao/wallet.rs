use bigdecimal::{BigDecimal, Zero};
use chrono::Utc;
use diesel::prelude::*;
use lazy_static::lazy_static;
use uuid::Uuid;

use servease_persistence::executor::{readonly_transaction, AsDao, ConnType, PoolType};
use servease_persistence::types::BigDecimalField;

use crate::error::{Error, Result};
use crate::models::wallet::{OwnerKind, TxType, Wallet, WalletTx};
use crate::schema::bk_wallet::dsl as wallet_dsl;
use crate::schema::bk_wallet_tx::dsl as tx_dsl;

lazy_static! {
    static ref SECURITY_DEPOSIT_CAP: BigDecimal = BigDecimal::from(5000);
    static ref SECURITY_DEPOSIT_RATE: BigDecimal = "0.10".parse().unwrap();
}

pub fn security_deposit_cap() -> &'static BigDecimal {
    &SECURITY_DEPOSIT_CAP
}

/// How much of a payout is withheld as security deposit: 10% of the base
/// amount, but never past the 5000 cap.
pub fn deposit_deduction(base_amount: &BigDecimal, collected: &BigDecimal) -> BigDecimal {
    if collected >= &*SECURITY_DEPOSIT_CAP {
        return BigDecimal::zero();
    }
    let remaining = &*SECURITY_DEPOSIT_CAP - collected;
    let deduction = base_amount * &*SECURITY_DEPOSIT_RATE;
    if deduction > remaining {
        remaining
    } else {
        deduction
    }
}

/// Wallets are created lazily, with a zero balance, on the first entry that
/// needs them.
pub fn get_or_create(conn: &ConnType, owner_kind: OwnerKind, owner_id: i64) -> Result<Wallet> {
    let existing: Option<Wallet> = wallet_dsl::bk_wallet
        .filter(wallet_dsl::owner_kind.eq(owner_kind))
        .filter(wallet_dsl::owner_id.eq(owner_id))
        .first(conn)
        .optional()?;
    match existing {
        Some(wallet) => Ok(wallet),
        None => {
            let wallet = Wallet::new(owner_kind, owner_id);
            diesel::insert_into(wallet_dsl::bk_wallet)
                .values(&wallet)
                .execute(conn)?;
            Ok(wallet)
        }
    }
}

pub fn get_by_id(conn: &ConnType, wallet_id: &str) -> Result<Wallet> {
    Ok(wallet_dsl::bk_wallet.find(wallet_id).first(conn)?)
}

/// The single write path for balances: re-reads the balance under the
/// caller's transaction, writes the new one, and appends the immutable
/// ledger row carrying `balance_after`. A balance is never touched any
/// other way.
pub fn apply_entry(
    conn: &ConnType,
    wallet_id: &str,
    engagement_id: Option<&str>,
    tx_type: TxType,
    amount: &BigDecimal,
    description: &str,
) -> Result<WalletTx> {
    if amount < &BigDecimal::zero() {
        return Err(Error::bad_request("ledger amounts must be non-negative"));
    }
    let current: BigDecimalField = wallet_dsl::bk_wallet
        .find(wallet_id)
        .select(wallet_dsl::balance)
        .first(conn)?;
    let new_balance = if tx_type.is_credit() {
        &current.0 + amount
    } else {
        &current.0 - amount
    };
    diesel::update(wallet_dsl::bk_wallet.find(wallet_id))
        .set((
            wallet_dsl::balance.eq(BigDecimalField(new_balance.clone())),
            wallet_dsl::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(conn)?;
    let tx = WalletTx {
        id: Uuid::new_v4().to_string(),
        wallet_id: wallet_id.to_string(),
        engagement_id: engagement_id.map(Into::into),
        tx_type,
        amount: amount.clone().into(),
        description: description.to_string(),
        balance_after: new_balance.into(),
        created_at: Utc::now().naive_utc(),
    };
    diesel::insert_into(tx_dsl::bk_wallet_tx)
        .values(&tx)
        .execute(conn)?;
    Ok(tx)
}

/// Raises the collected deposit, keeping the invariant `0 <= collected <=
/// cap`. Callers size `amount` with [`deposit_deduction`].
pub fn add_security_deposit(conn: &ConnType, wallet_id: &str, amount: &BigDecimal) -> Result<()> {
    let current: BigDecimalField = wallet_dsl::bk_wallet
        .find(wallet_id)
        .select(wallet_dsl::security_deposit_collected)
        .first(conn)?;
    let new_total = &current.0 + amount;
    if new_total > *SECURITY_DEPOSIT_CAP {
        return Err(Error::internal(format!(
            "security deposit for wallet {} would exceed the cap ({} > {})",
            wallet_id, new_total, *SECURITY_DEPOSIT_CAP
        )));
    }
    diesel::update(wallet_dsl::bk_wallet.find(wallet_id))
        .set((
            wallet_dsl::security_deposit_collected.eq(BigDecimalField(new_total)),
            wallet_dsl::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(conn)?;
    Ok(())
}

pub struct WalletDao<'c> {
    pool: &'c PoolType,
}

impl<'c> AsDao<'c> for WalletDao<'c> {
    fn as_dao(pool: &'c PoolType) -> Self {
        Self { pool }
    }
}

impl<'c> WalletDao<'c> {
    pub async fn get(&self, owner_kind: OwnerKind, owner_id: i64) -> Result<Option<Wallet>> {
        readonly_transaction(self.pool, move |conn| {
            Ok(wallet_dsl::bk_wallet
                .filter(wallet_dsl::owner_kind.eq(owner_kind))
                .filter(wallet_dsl::owner_id.eq(owner_id))
                .first(conn)
                .optional()?)
        })
        .await
    }

    /// Wallet plus its most recent ledger entries, newest first.
    pub async fn get_with_recent(
        &self,
        owner_kind: OwnerKind,
        owner_id: i64,
        limit: i64,
    ) -> Result<Option<(Wallet, Vec<WalletTx>)>> {
        readonly_transaction(self.pool, move |conn| {
            let wallet: Option<Wallet> = wallet_dsl::bk_wallet
                .filter(wallet_dsl::owner_kind.eq(owner_kind))
                .filter(wallet_dsl::owner_id.eq(owner_id))
                .first(conn)
                .optional()?;
            match wallet {
                Some(wallet) => {
                    let recent = tx_dsl::bk_wallet_tx
                        .filter(tx_dsl::wallet_id.eq(&wallet.id))
                        .order(tx_dsl::created_at.desc())
                        .limit(limit)
                        .load(conn)?;
                    Ok(Some((wallet, recent)))
                }
                None => Ok(None),
            }
        })
        .await
    }

    /// Full ledger in creation order; replaying it must reproduce the
    /// stored balance.
    pub async fn transactions(&self, wallet_id: String) -> Result<Vec<WalletTx>> {
        readonly_transaction(self.pool, move |conn| {
            Ok(tx_dsl::bk_wallet_tx
                .filter(tx_dsl::wallet_id.eq(wallet_id))
                .order(tx_dsl::created_at.asc())
                .load(conn)?)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deduction_is_ten_percent_below_the_cap() {
        let d = deposit_deduction(&BigDecimal::from(3000), &BigDecimal::zero());
        assert_eq!(d, "300.0".parse().unwrap());
    }

    #[test]
    fn deduction_shrinks_to_the_remaining_headroom() {
        let d = deposit_deduction(&BigDecimal::from(20000), &BigDecimal::from(4500));
        assert_eq!(d, BigDecimal::from(500));
    }

    #[test]
    fn deduction_is_zero_at_the_cap() {
        let d = deposit_deduction(&BigDecimal::from(1000), &BigDecimal::from(5000));
        assert_eq!(d, BigDecimal::zero());
    }
}
