pub mod error;
pub mod prepayment;

pub use error::PrepayError;
pub use prepayment::{
    calculate_prepayment_savings, LoanScenario, PaymentFrequency, PrepaymentInput,
    PrepaymentResult,
};
