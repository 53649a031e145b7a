//! Invoicing backend library modules.

pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod server;

#[cfg(test)]
pub mod test_support;
