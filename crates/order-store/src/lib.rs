pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use common::{Order, OrderId, OrderStatus, TransitionPolicy, UserId};
pub use error::{OrderStoreError, Result};
pub use memory::InMemoryOrderRepository;
pub use postgres::PostgresOrderRepository;
pub use store::{OrderRepository, StatusChange};
