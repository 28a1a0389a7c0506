//! Gateway vocabulary and the ports the core talks to.
//!
//! Nothing in here performs I/O: the envelope codec is pure, and everything the
//! host owns (transaction storage, invoice processing, HTTP) is a trait in
//! [`ports`].

pub mod callback;
pub mod envelope;
pub mod invoice;
pub mod order;
pub mod ports;
pub mod request;
pub mod status;
pub mod transaction;
