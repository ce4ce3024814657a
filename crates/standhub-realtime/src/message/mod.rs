//! Wire envelope types, codec, and outbound builders.

pub mod builder;
pub mod serializer;
pub mod types;
pub mod validator;
