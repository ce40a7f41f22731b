//! Node model and content addressing

pub mod hasher;
pub mod node;

pub use hasher::{address, address_of, long_name, NodeAddress};
pub use node::{ChildRef, Node};
