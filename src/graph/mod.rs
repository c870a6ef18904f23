mod handles;
#[macro_use]
mod circuit;
mod component;
mod edge;
mod kinds;
mod node;
mod port;
mod propagation;
pub use circuit::*;
pub use component::*;
pub use edge::*;
pub use handles::*;
pub use kinds::*;
pub use node::*;
pub use port::*;
pub use propagation::{PortFault, Propagation};
