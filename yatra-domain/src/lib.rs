pub mod booking;
pub mod error;
pub mod schedule;
pub mod validate;

pub use error::DomainError;
