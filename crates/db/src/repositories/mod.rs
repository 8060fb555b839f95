//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. The order and credit repositories own the transaction
//! boundaries: every multi-row workflow commits atomically or not at all.

pub mod catalog;
pub mod credit;
pub mod order;
pub mod user;

pub use catalog::{CatalogError, CatalogRepository, CreateProduceInput, CreateProductInput};
pub use credit::{CreditAccountError, CreditRepository, RepaymentInput};
pub use order::{OrderError, OrderRepository, OrderWithItems};
pub use user::{CreateUserInput, UserRepository};
