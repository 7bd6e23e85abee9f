pub mod accessor;
pub mod bits;
pub mod chain;
pub mod layout;
#[cfg(test)]
pub mod mock;
pub mod process;
pub mod resolver;
pub mod session;
pub mod table;

pub use accessor::{Accessor, Primitive};
pub use bits::set_bits;
pub use chain::{AddressChain, Deref, PointerWidth};
#[cfg(test)]
pub use mock::{MockProcess, MockProcessBuilder};
pub use process::{ProcessHandle, ProcessMemory};
pub use resolver::resolve;
pub use session::{Connector, Session};
pub use table::{AddressTable, Addresses};
