pub mod routes;
pub mod schema;

#[cfg(test)]
mod testing;

pub use routes::router;
pub use schema::{BlogSchema, SharedStore, build_schema};
