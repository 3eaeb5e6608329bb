use bigdecimal::BigDecimal;
use structopt::StructOpt;

#[derive(StructOpt, Clone, Debug)]
pub struct Config {
    #[structopt(flatten)]
    pub gateway: GatewayConfig,
    #[structopt(flatten)]
    pub booking: BookingConfig,
}

#[derive(StructOpt, Clone, Debug)]
pub struct GatewayConfig {
    /// Shared secret used for the HMAC signature on settlement callbacks.
    #[structopt(long, env = "SERVEASE_GATEWAY_SECRET", default_value = "", hide_env_values = true)]
    pub key_secret: String,

    /// Skips callback signature verification. Development convenience only,
    /// never enable on a production deployment.
    #[structopt(long, env = "SERVEASE_GATEWAY_SKIP_VERIFY")]
    pub skip_signature_verification: bool,

    #[structopt(long, env = "SERVEASE_CURRENCY", default_value = "INR")]
    pub currency: String,
}

#[derive(StructOpt, Clone, Debug)]
pub struct BookingConfig {
    /// Radius for nearby-provider discovery, in kilometres.
    #[structopt(long, env = "SERVEASE_DISCOVERY_RADIUS_KM", default_value = "5.0")]
    pub discovery_radius_km: f64,

    /// Flat penalty debited when a customer modifies an existing leave
    /// without cancelling it first.
    #[structopt(long, env = "SERVEASE_LEAVE_PENALTY", default_value = "100")]
    pub leave_modification_penalty: BigDecimal,
}

impl Config {
    pub fn from_env() -> Result<Config, structopt::clap::Error> {
        // Empty command line arguments, because we want to use ENV fallback
        // or default values if ENV variables are not set.
        Config::from_iter_safe(&[""])
    }
}
