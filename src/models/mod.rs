//! Wire-level data models.
//!
//! Every response body the gateway emits is defined here and serialized as
//! JSON via `serde`. None of them outlive a single request.

pub mod responses;
