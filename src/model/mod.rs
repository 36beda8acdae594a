//! Types that represent the core data model, such as `Transaction` and `Category`.
mod amount;
mod category;
mod payment_type;
mod transaction;

pub use amount::{Amount, AmountError};
pub use category::{is_income_category, Category, FlowClass, Tab};
pub use payment_type::PaymentType;
pub use transaction::Transaction;
