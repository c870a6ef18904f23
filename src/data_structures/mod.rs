mod arena;
mod work_queue;
pub use arena::*;
pub use work_queue::*;
