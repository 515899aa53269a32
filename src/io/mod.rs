pub mod csv;
pub mod results;
pub mod sqlite;
