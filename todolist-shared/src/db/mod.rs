/// Database layer
///
/// - `pool`: PostgreSQL connection pool management
/// - `migrations`: migration runner for the bundled SQL migrations

pub mod migrations;
pub mod pool;
