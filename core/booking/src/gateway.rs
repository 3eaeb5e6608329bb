use async_trait::async_trait;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    #[error("order creation failed: {0}")]
    Order(String),
    #[error("gateway misconfigured: {0}")]
    Config(String),
}

/// Port to the external payment gateway. Only the contract lives here:
/// order creation sized in minor currency units, and HMAC-SHA256 signature
/// verification over `order_ref|payment_ref` on settlement callbacks.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(
        &self,
        amount_minor: u64,
        currency: &str,
        receipt: &str,
    ) -> Result<String, GatewayError>;

    fn verify_signature(&self, order_ref: &str, payment_ref: &str, signature: &str) -> bool;
}

/// Gateway implementation that issues order references locally and checks
/// callback signatures against the configured shared secret. The hosted
/// gateway's SDK is deliberately not wired in; deployments that use one
/// provide their own `PaymentGateway`.
pub struct LocalGateway {
    key_secret: String,
}

impl LocalGateway {
    pub fn new(key_secret: impl Into<String>) -> Self {
        Self {
            key_secret: key_secret.into(),
        }
    }

    fn mac(&self, order_ref: &str, payment_ref: &str) -> HmacSha256 {
        // HMAC accepts keys of any length, so this cannot fail.
        let mut mac = HmacSha256::new_from_slice(self.key_secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(order_ref.as_bytes());
        mac.update(b"|");
        mac.update(payment_ref.as_bytes());
        mac
    }

    /// Hex signature for a callback, as the gateway would compute it.
    pub fn sign(&self, order_ref: &str, payment_ref: &str) -> String {
        hex::encode(self.mac(order_ref, payment_ref).finalize().into_bytes())
    }
}

#[async_trait]
impl PaymentGateway for LocalGateway {
    async fn create_order(
        &self,
        amount_minor: u64,
        currency: &str,
        receipt: &str,
    ) -> Result<String, GatewayError> {
        if amount_minor == 0 {
            return Err(GatewayError::Order("zero-amount order".into()));
        }
        let order_ref = format!("order_{}", Uuid::new_v4().to_simple());
        log::debug!(
            "created gateway order {} ({} {} minor units, receipt {})",
            order_ref,
            amount_minor,
            currency,
            receipt
        );
        Ok(order_ref)
    }

    fn verify_signature(&self, order_ref: &str, payment_ref: &str, signature: &str) -> bool {
        let bytes = match hex::decode(signature) {
            Ok(bytes) => bytes,
            Err(_) => return false,
        };
        self.mac(order_ref, payment_ref).verify_slice(&bytes).is_ok()
    }
}
