//! Edges facing the host and the operator: webhook acknowledgement policy,
//! CSV replay of captured callbacks, JSON order documents.

pub mod csv;
pub mod order_file;
pub mod webhook;
