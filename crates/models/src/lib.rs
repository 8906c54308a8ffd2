mod token;
mod pool;
mod swap;
mod network;

pub use token::*;
pub use pool::*;
pub use swap::*;
pub use network::*;
