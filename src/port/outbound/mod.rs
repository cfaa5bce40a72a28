//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe infrastructure dependencies: the order API,
//! dedup and recipient storage, and the chat channel.

pub mod channel;
pub mod dedup;
pub mod orders;
pub mod recipient;
