use super::{Formatter, Params, ToSql};

pub(super) struct Ident<S>(pub(super) S);

impl<S: AsRef<str>> ToSql for Ident<S> {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        let name = self.0.as_ref();
        debug_assert!(
            rowsink_core::ident::is_safe(name),
            "identifier `{name}` must pass the guard before serialization"
        );

        if f.serializer.quote_identifiers {
            let quote = f.serializer.dialect.quote_char();
            f.dst.push(quote);
            f.dst.push_str(name);
            f.dst.push(quote);
        } else {
            f.dst.push_str(name);
        }
    }
}
