pub mod admission;
pub mod notify;
pub mod payment;
pub mod repository;
pub mod route;

pub use admission::KeyedLocks;
