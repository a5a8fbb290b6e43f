pub mod client;

pub mod config;
pub use config::{ConnectionDescriptor, DbEngine};

mod error;
pub use error::Error;

pub mod event;
pub use event::{Event, Value};

pub mod flatten;

pub mod ident;

pub mod schema;
pub use schema::{EventSchema, Property, ValueType};

/// A Result type alias that uses rowsink's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

pub use async_trait::async_trait;
