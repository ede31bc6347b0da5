pub mod metric;
pub mod player;
pub mod row;
pub mod season;

pub use metric::*;
pub use player::*;
pub use row::Row;
pub use season::*;
