//! Booking payment split arithmetic.
//!
//! All percentages are fixed basis points applied to cent amounts with
//! round-half-up. The completion leg is defined as total minus deposit so
//! the two charges always reconcile to the full total; the cancellation
//! leg and both platform fees round independently.

// Fee configuration
pub const DEPOSIT_BPS: u32 = 2_000; // 20% of total, charged upfront
pub const CANCELLATION_BPS: u32 = 3_000; // 30% of total on cancellation
pub const PLATFORM_FEE_BPS: u32 = 500; // 5% platform commission

const BPS_DENOMINATOR: u128 = 10_000;

/// Convert a decimal currency amount to cents, rounding half-up.
pub fn to_cents(amount: f64) -> u64 {
    (amount * 100.0).round() as u64
}

/// Share of `cents` at `bps` basis points, rounded half-up.
/// Intermediate math is u128 so the multiply cannot overflow.
pub fn bps_of(cents: u64, bps: u32) -> u64 {
    ((cents as u128 * bps as u128 + BPS_DENOMINATOR / 2) / BPS_DENOMINATOR) as u64
}

/// Which leg of the booking payment an intent belongs to. The tag is the
/// `stage` value carried in intent metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentStage {
    BookingDeposit,
    Completion,
    Cancellation,
}

impl PaymentStage {
    pub fn tag(&self) -> &'static str {
        match self {
            PaymentStage::BookingDeposit => "booking_deposit",
            PaymentStage::Completion => "completion",
            PaymentStage::Cancellation => "cancellation",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "booking_deposit" => Some(PaymentStage::BookingDeposit),
            "completion" => Some(PaymentStage::Completion),
            "cancellation" => Some(PaymentStage::Cancellation),
            _ => None,
        }
    }
}

/// The full cent breakdown for one booking total.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BookingSplit {
    pub total_cents: u64,
    pub deposit_cents: u64,
    pub completion_cents: u64,
    pub completion_fee_cents: u64,
    pub cancellation_cents: u64,
    pub cancellation_fee_cents: u64,
}

impl BookingSplit {
    pub fn from_amount(total_amount: f64) -> Self {
        Self::from_cents(to_cents(total_amount))
    }

    pub fn from_cents(total_cents: u64) -> Self {
        let deposit_cents = bps_of(total_cents, DEPOSIT_BPS);
        let cancellation_cents = bps_of(total_cents, CANCELLATION_BPS);

        BookingSplit {
            total_cents,
            deposit_cents,
            // Remainder, not an independent 80% rounding: deposit plus
            // completion must always equal the total.
            completion_cents: total_cents - deposit_cents,
            // The completion commission is 5% of the FULL total.
            completion_fee_cents: bps_of(total_cents, PLATFORM_FEE_BPS),
            cancellation_cents,
            cancellation_fee_cents: bps_of(cancellation_cents, PLATFORM_FEE_BPS),
        }
    }

    /// Amount charged for the given stage, in cents.
    pub fn stage_amount(&self, stage: PaymentStage) -> u64 {
        match stage {
            PaymentStage::BookingDeposit => self.deposit_cents,
            PaymentStage::Completion => self.completion_cents,
            PaymentStage::Cancellation => self.cancellation_cents,
        }
    }

    /// Platform fee for the given stage; the deposit carries none.
    pub fn stage_fee(&self, stage: PaymentStage) -> Option<u64> {
        match stage {
            PaymentStage::BookingDeposit => None,
            PaymentStage::Completion => Some(self.completion_fee_cents),
            PaymentStage::Cancellation => Some(self.cancellation_fee_cents),
        }
    }
}
