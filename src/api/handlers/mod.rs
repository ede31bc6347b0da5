pub mod league;
pub mod players;
pub mod system;

pub use league::*;
pub use players::*;
pub use system::*;
