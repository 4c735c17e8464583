pub mod config;
pub mod dashboard;
pub mod fetch;
pub mod load;
pub mod resolve;
pub mod schema;

pub use dashboard::{refresh, Snapshot};
pub use resolve::{resolve, Cell, KpiRecord, RawTable};
pub use schema::KpiSchema;
