pub mod flex;

pub mod user;
pub mod wallet;
pub mod provider;
pub mod order;
pub mod quote;
pub mod lightning;

pub use user::{CurrentSession, UserProfile};
pub use wallet::{Balance, BalanceState, Wallet};
pub use provider::Provider;
pub use order::{Direction, NewOrder, Order, OrderStatus};
pub use quote::{FeeQuote, QuoteInput};
pub use lightning::{Invoice, LightningTransaction, PaymentResult};
