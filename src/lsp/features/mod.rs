//! LSP features
//!
//! Each feature is implemented independently of the protocol backend so it can
//! be driven and tested without a client connection.

pub mod completion;
