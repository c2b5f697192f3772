//! Contract resolution: the record cache, the fetch coalescer, the factory,
//! and the service that composes them with the remote clients.

pub mod cache;
pub mod coalescer;
pub mod factory;
pub mod service;

pub use cache::ContractCache;
pub use coalescer::{CoalesceOutcome, FetchCoalescer};
pub use factory::ContractFactory;
pub use service::ContractService;
