//! Stateless domain services: each operation validates its input,
//! calls the store and shapes the output for the client.

pub mod comment;
pub mod user;
