mod adder;
mod counter;
mod sr_latch;
pub use adder::*;
pub use counter::*;
pub use sr_latch::*;
