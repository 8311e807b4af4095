pub mod app_config;
pub mod memory;
pub mod postgres;
pub mod stub;

pub use app_config::Config;
pub use memory::MemoryStore;
pub use postgres::PgStore;
