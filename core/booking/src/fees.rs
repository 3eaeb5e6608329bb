use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use lazy_static::lazy_static;
use serde::Serialize;

use crate::error::Error;

lazy_static! {
    static ref PLATFORM_FEE_RATE: BigDecimal = "0.10".parse().unwrap();
    static ref GST_RATE: BigDecimal = "0.18".parse().unwrap();
    static ref MINOR_UNITS: BigDecimal = BigDecimal::from(100);
}

/// Platform fee, tax and total derived from a base amount. Pure
/// computation; the only failure mode is a non-positive input.
#[derive(Clone, Debug, Serialize)]
pub struct FeeBreakdown {
    pub base_amount: BigDecimal,
    pub platform_fee: BigDecimal,
    pub gst: BigDecimal,
    pub total_amount: BigDecimal,
}

impl FeeBreakdown {
    pub fn from_base(base_amount: &BigDecimal) -> Result<Self, Error> {
        if base_amount <= &BigDecimal::zero() {
            return Err(Error::bad_request("base_amount must be positive"));
        }
        let platform_fee = base_amount * &*PLATFORM_FEE_RATE;
        let gst = &platform_fee * &*GST_RATE;
        let total_amount = base_amount + &platform_fee + &gst;
        Ok(Self {
            base_amount: base_amount.clone(),
            platform_fee,
            gst,
            total_amount,
        })
    }

    /// Total in minor currency units (paise), as the gateway expects.
    pub fn total_minor_units(&self) -> Result<u64, Error> {
        (&self.total_amount * &*MINOR_UNITS)
            .round(0)
            .to_u64()
            .ok_or_else(|| Error::bad_request("total amount out of range"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worked_example_from_the_rate_card() {
        let fees = FeeBreakdown::from_base(&BigDecimal::from(1000)).unwrap();
        assert_eq!(fees.platform_fee, BigDecimal::from(100));
        assert_eq!(fees.gst, BigDecimal::from(18));
        assert_eq!(fees.total_amount, BigDecimal::from(1118));
        assert_eq!(fees.total_minor_units().unwrap(), 111_800);
    }

    #[test]
    fn fractional_base_keeps_precision() {
        let fees = FeeBreakdown::from_base(&"2500.50".parse().unwrap()).unwrap();
        assert_eq!(fees.platform_fee, "250.050".parse().unwrap());
        assert_eq!(fees.gst, "45.00900".parse().unwrap());
        assert_eq!(fees.total_amount, "2795.55900".parse().unwrap());
    }

    #[test]
    fn non_positive_base_is_rejected() {
        assert!(FeeBreakdown::from_base(&BigDecimal::zero()).is_err());
        assert!(FeeBreakdown::from_base(&BigDecimal::from(-10)).is_err());
    }
}
