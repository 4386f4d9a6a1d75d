//! Composable SQL text with positional `?` arguments.

use std::borrow::Cow;
use std::fmt;

use crate::types::Arg;

/// Anything that can stand in for a `?` placeholder as a whole SQL fragment.
///
/// The returned args must already be flattened: one scalar per `?` in the returned text.
pub trait SqlFragment: fmt::Debug + Send + Sync {
    fn sql(&self) -> (Cow<'_, str>, Cow<'_, [Arg]>);
}

/// A SQL statement built from fragments, tracking one argument per `?`.
///
/// ```rust
/// use sql_compose::{Query, args};
///
/// let mut q = Query::default();
/// q.append("select * from users where 1", []);
/// q.append("and name = ?", args!["alice"]);
///
/// let admins = Query::new("select id from admins where level > ?", args![5]);
/// q.append("and id in (?)", args![admins]);
///
/// let (sql, args) = q.sql();
/// assert_eq!(
///     sql,
///     "select * from users where 1 and name = ? and id in (select id from admins where level > ?)"
/// );
/// assert_eq!(args.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    text: String,
    args: Vec<Arg>,
}

impl Query {
    /// Start a query from an initial fragment.
    ///
    /// # Panics
    /// Panics if the number of `?` in `fragment` differs from the number of `args`.
    pub fn new<I>(fragment: &str, args: I) -> Self
    where
        I: IntoIterator<Item = Arg>,
    {
        let mut query = Self::default();
        query.append(fragment, args);
        query
    }

    /// Append a fragment and its arguments, separated from the previous text by one space.
    ///
    /// # Panics
    /// Panics if the number of `?` in `fragment` differs from the number of `args`. Nothing is
    /// appended in that case.
    pub fn append<I>(&mut self, fragment: &str, args: I)
    where
        I: IntoIterator<Item = Arg>,
    {
        let args: Vec<Arg> = args.into_iter().collect();
        let want = fragment.matches('?').count();
        let got = args.len();
        if want != got {
            panic!("want {want} args, got {got}");
        }

        if !self.text.is_empty() && !self.text.ends_with(char::is_whitespace) {
            self.text.push(' ');
        }
        self.text.push_str(fragment);
        self.args.extend(args);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The unexpanded text, with sub-queries still represented by `?`.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The unexpanded arguments.
    #[must_use]
    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    /// Produce the final text and flattened arguments.
    ///
    /// Sub-query arguments are expanded in place of their placeholder, recursively. Without
    /// any sub-query argument the stored text and arguments are returned as-is.
    #[must_use]
    pub fn sql(&self) -> (Cow<'_, str>, Cow<'_, [Arg]>) {
        if !self.args.iter().any(Arg::is_fragment) {
            return (Cow::Borrowed(&self.text), Cow::Borrowed(&self.args));
        }

        let mut text = String::with_capacity(self.text.len());
        let mut args = Vec::with_capacity(self.args.len());
        let mut count = 0;
        for c in self.text.chars() {
            if c != '?' {
                text.push(c);
                continue;
            }

            match &self.args[count] {
                Arg::Fragment(fragment) => {
                    let (sub_text, sub_args) = fragment.sql();
                    text.push_str(&sub_text);
                    args.extend_from_slice(&sub_args);
                }
                arg => {
                    text.push(c);
                    args.push(arg.clone());
                }
            }
            count += 1;
        }

        (Cow::Owned(text), Cow::Owned(args))
    }
}

impl SqlFragment for Query {
    fn sql(&self) -> (Cow<'_, str>, Cow<'_, [Arg]>) {
        Query::sql(self)
    }
}

impl From<Query> for Arg {
    fn from(query: Query) -> Self {
        Arg::fragment(query)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql().0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::types::RowValues;

    fn values(args: &[Arg]) -> Vec<RowValues> {
        args.iter().filter_map(Arg::as_value).cloned().collect()
    }

    #[test]
    fn builds_in_order() {
        let mut b = Query::default();
        b.append("select * from tasks", []);
        b.append("where 1", []);
        b.append("and one=?", args![1]);
        b.append("and two=?", args![2]);
        b.append("returning *", []);

        let (query, args) = b.sql();
        assert_eq!(
            query,
            "select * from tasks where 1 and one=? and two=? returning *"
        );
        assert_eq!(values(&args), vec![RowValues::Int(1), RowValues::Int(2)]);
    }

    #[test]
    fn fast_path_borrows_the_buffer() {
        let q = Query::new("select * from t where a=? and b=?", args![1, "x"]);
        let (text, args) = q.sql();
        assert!(matches!(text, Cow::Borrowed(_)));
        assert!(matches!(args, Cow::Borrowed(_)));
        assert_eq!(text, q.text());
        assert_eq!(&*args, q.args());
    }

    #[test]
    fn expands_nested_subqueries_depth_first() {
        let mut where_a = Query::default();
        where_a.append("three=?", args![3]);
        let where_b = Query::new("four=?", args![4]);
        let mut where_c = Query::default();
        where_c.append("? or ?", args![where_a, where_b]);
        let where_ = Query::new("?", args![where_c]);

        let mut b = Query::default();
        b.append(
            "select * from (?) union (?)",
            args![
                Query::new("select * from tasks where a=?", args!["a"]),
                Query::new(
                    "select * from tasks where a=? and ?",
                    args!["aa", Query::new("xx=?", args![10])]
                ),
            ],
        );
        b.append("where ?", args![where_]);

        let (query, args) = b.sql();
        assert_eq!(
            query,
            "select * from (select * from tasks where a=?) union (select * from tasks where a=? and xx=?) where three=? or four=?"
        );
        assert_eq!(
            values(&args),
            vec![
                RowValues::Text("a".into()),
                RowValues::Text("aa".into()),
                RowValues::Int(10),
                RowValues::Int(3),
                RowValues::Int(4),
            ]
        );
        assert!(!args.iter().any(Arg::is_fragment));
    }

    #[test]
    fn placeholder_free_subquery_contributes_no_args() {
        let q = Query::new(
            "select * from t where id in (?) and x=?",
            args![Query::new("select id from u", []), 9],
        );
        let (text, args) = q.sql();
        assert_eq!(text, "select * from t where id in (select id from u) and x=?");
        assert_eq!(values(&args), vec![RowValues::Int(9)]);
    }

    #[test]
    fn expansion_is_repeatable() {
        let q = Query::new("a=? and ?", args![1, Query::new("b=?", args![2])]);
        assert_eq!(q.sql(), q.sql());
    }

    #[test]
    #[should_panic(expected = "want 3 args, got 2")]
    fn mismatched_args_panic() {
        let mut b = Query::default();
        b.append("one=?, two=?, three=?", args![1, 2]);
    }

    #[test]
    fn mismatch_leaves_query_untouched() {
        let mut b = Query::new("select 1", []);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            b.append("where a=?", []);
        }));
        assert!(result.is_err());
        assert_eq!(b.text(), "select 1");
        assert!(b.args().is_empty());
    }

    #[test]
    fn no_double_space_after_trailing_whitespace() {
        let mut b = Query::new("select *\n", []);
        b.append("from t", []);
        assert_eq!(b.text(), "select *\nfrom t");
    }

    #[test]
    fn end_to_end_scenario() {
        let mut q = Query::default();
        q.append("select * from t", []);
        q.append("where 1", []);
        q.append("and a=?", args![1]);
        q.append("and b=?", args![2]);
        let (text, args) = q.sql();
        assert_eq!(text, "select * from t where 1 and a=? and b=?");
        assert_eq!(values(&args), vec![RowValues::Int(1), RowValues::Int(2)]);
    }
}
