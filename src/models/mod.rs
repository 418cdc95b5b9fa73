pub mod row;
pub mod snapshot;
