mod availability;
mod engagement;
mod leave;
mod payment;
mod payout;
mod provider;
mod wallet;

pub use self::availability::AvailabilityDao;
pub use self::engagement::{CreatedBooking, EngagementDao};
pub use self::leave::{LeaveDao, LeaveOutcome, LeaveReversal};
pub use self::payment::{PaymentDao, Settlement, SettlementReceipt};
pub use self::payout::PayoutDao;
pub use self::provider::ProviderDao;
pub use self::wallet::{security_deposit_cap, WalletDao};
