use bigdecimal::{BigDecimal, Zero};
use diesel::backend::Backend;
use diesel::deserialize::{FromSql, Result as DeserializeResult};
use diesel::serialize::{Output, Result as SerializeResult, ToSql};
use diesel::sql_types::Text;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io::Write;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Decimal amounts are stored as TEXT so that no precision is lost in the
/// database round-trip.
#[derive(Debug, Clone, AsExpression, FromSqlRow, Default, PartialEq, PartialOrd, Eq, Ord)]
#[sql_type = "Text"]
pub struct BigDecimalField(pub BigDecimal);

impl From<BigDecimalField> for BigDecimal {
    fn from(x: BigDecimalField) -> Self {
        x.0
    }
}

impl From<BigDecimal> for BigDecimalField {
    fn from(x: BigDecimal) -> Self {
        Self(x)
    }
}

impl Display for BigDecimalField {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

impl Add<BigDecimalField> for BigDecimalField {
    type Output = BigDecimalField;

    fn add(self, rhs: BigDecimalField) -> Self::Output {
        (self.0 + rhs.0).into()
    }
}

impl<'a> Add<&'a BigDecimal> for &'a BigDecimalField {
    type Output = BigDecimalField;

    fn add(self, rhs: &'a BigDecimal) -> Self::Output {
        (&self.0 + rhs).into()
    }
}

impl Sub<BigDecimalField> for BigDecimalField {
    type Output = BigDecimalField;

    fn sub(self, rhs: BigDecimalField) -> Self::Output {
        (self.0 - rhs.0).into()
    }
}

impl<'a> Sub<&'a BigDecimal> for &'a BigDecimalField {
    type Output = BigDecimalField;

    fn sub(self, rhs: &'a BigDecimal) -> Self::Output {
        (&self.0 - rhs).into()
    }
}

impl<DB> ToSql<Text, DB> for BigDecimalField
where
    DB: Backend,
    String: ToSql<Text, DB>,
{
    fn to_sql<W: Write>(&self, out: &mut Output<W, DB>) -> SerializeResult {
        let s = self.0.to_string();
        s.to_sql(out)
    }
}

impl<DB> FromSql<Text, DB> for BigDecimalField
where
    DB: Backend,
    String: FromSql<Text, DB>,
{
    fn from_sql(bytes: Option<&DB::RawValue>) -> DeserializeResult<Self> {
        let s = String::from_sql(bytes)?;
        match BigDecimal::from_str(&s) {
            Ok(x) => Ok(BigDecimalField(x)),
            Err(e) => Err(e.into()),
        }
    }
}

pub trait Summable {
    fn sum(self) -> BigDecimal;
}

impl<T> Summable for T
where
    T: IntoIterator,
    T::Item: Into<BigDecimal>,
{
    fn sum(self) -> BigDecimal {
        self.into_iter()
            .map(Into::into)
            .fold(BigDecimal::zero(), <BigDecimal as Add<BigDecimal>>::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summing_fields_matches_plain_decimals() {
        let fields: Vec<BigDecimalField> = vec![
            BigDecimal::from(100).into(),
            "0.18".parse::<BigDecimal>().unwrap().into(),
            BigDecimal::from(1000).into(),
        ];
        assert_eq!(fields.sum(), "1100.18".parse::<BigDecimal>().unwrap());
    }
}
