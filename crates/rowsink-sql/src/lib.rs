pub mod dialect;
pub use dialect::{Dialect, ErrorClass};

pub mod serializer;
pub use serializer::{Params, Placeholder, Serializer};

pub mod stmt;
pub use stmt::Statement;
