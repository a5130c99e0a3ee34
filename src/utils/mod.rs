pub mod errors;
pub mod money;
pub mod ratelimit;
pub mod table;

pub use money::format2;
pub use ratelimit::check_cooldown;
pub use table::{Align, Table};
