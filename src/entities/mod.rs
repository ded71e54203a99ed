pub mod credit_transaction;
pub mod incoming_order;
pub mod inventory_item;
pub mod order;
pub mod rating;
pub mod supplier;
pub mod user;

pub use credit_transaction::CreditStatus;
pub use order::{OrderLine, OrderLines, OrderStatus};
pub use user::UserRole;
