//! Renders statements into dialect-specific SQL text.

/// Writes a sequence of SQL fragments into the formatter.
macro_rules! fmt {
    ($f:expr, $( $fragments:expr )*) => {{
        $(
            $fragments.to_sql($f);
        )*
    }};
}

mod ident;
use ident::Ident;

mod params;
pub use params::{Params, Placeholder};

// Fragment serializers
mod statement;

use crate::dialect::Dialect;
use crate::stmt::Statement;

/// Serialize a statement to a SQL string
#[derive(Debug, Clone, Copy)]
pub struct Serializer {
    /// The database dialect handles the differences between SQL engines.
    dialect: Dialect,

    /// Whether generated identifiers are quoted.
    quote_identifiers: bool,
}

struct Formatter<'a, T> {
    /// Handle to the serializer
    serializer: &'a Serializer,

    /// Where to write the serialized SQL
    dst: &'a mut String,

    /// Where to store parameters
    params: &'a mut T,
}

/// One SQL fragment. Fragments write themselves in sequence via `fmt!`.
trait ToSql {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>);
}

impl ToSql for &str {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        f.dst.push_str(self);
    }
}

/// Comma delimited
struct Comma<L>(L);

impl<L> ToSql for Comma<L>
where
    L: IntoIterator,
    L::Item: ToSql,
{
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let mut s = "";
        for i in self.0 {
            fmt!(f, s i);
            s = ", ";
        }
    }
}

impl Serializer {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            quote_identifiers: dialect.quotes_identifiers(),
        }
    }

    pub fn postgresql() -> Self {
        Self::new(Dialect::postgresql())
    }

    pub fn mysql() -> Self {
        Self::new(Dialect::mysql())
    }

    pub fn with_quoted_identifiers(mut self, quote: bool) -> Self {
        self.quote_identifiers = quote;
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn serialize(&self, stmt: &Statement<'_>, params: &mut impl Params) -> String {
        let mut ret = String::new();

        let mut fmt = Formatter {
            serializer: self,
            dst: &mut ret,
            params,
        };

        stmt.to_sql(&mut fmt);

        ret.push(';');
        ret
    }
}
