//! Backend-neutral query model.
//!
//! Repositories build typed [`Filter`]s and [`Select`]s over an entity's
//! [`Column`] enum. Both lower into the untyped [`Query`] that a
//! [`QueryBackend`](crate::backend::QueryBackend) executes, so a filter can
//! only ever name columns that exist on the table it is applied to.

use std::fmt;
use std::marker::PhantomData;

use serde_json::Value;

/// One result row, keyed by column name. Embedded relations appear under the
/// embedded table's name (an array for children, an object or null for a parent).
pub type Row = serde_json::Map<String, Value>;

/// A column of one table.
pub trait Column: Copy + fmt::Debug + Send + Sync + 'static {
    /// Table the column belongs to.
    const TABLE: &'static str;

    fn name(self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    IsNull,
    NotNull,
    /// `value` is an array; matches any element.
    In,
}

/// A single constraint on one column. Predicates in a list are conjunctive.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: &'static str,
    pub op: Op,
    pub value: Value,
}

impl Predicate {
    pub(crate) fn eq(column: &'static str, value: impl Into<Value>) -> Self {
        Self {
            column,
            op: Op::Eq,
            value: value.into(),
        }
    }
}

/// Typed conjunction of predicates over the columns of one table.
pub struct Filter<C> {
    predicates: Vec<Predicate>,
    _column: PhantomData<C>,
}

impl<C> Clone for Filter<C> {
    fn clone(&self) -> Self {
        Self {
            predicates: self.predicates.clone(),
            _column: PhantomData,
        }
    }
}

impl<C> fmt::Debug for Filter<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.predicates).finish()
    }
}

impl<C: Column> Default for Filter<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Column> Filter<C> {
    /// An empty filter matches every row.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            predicates: Vec::new(),
            _column: PhantomData,
        }
    }

    fn push(mut self, column: C, op: Op, value: Value) -> Self {
        self.predicates.push(Predicate {
            column: column.name(),
            op,
            value,
        });
        self
    }

    /// `column = value`. A null value adds no constraint; use
    /// [`is_null`](Self::is_null) to match missing values.
    #[must_use]
    pub fn eq(self, column: C, value: impl Into<Value>) -> Self {
        match value.into() {
            Value::Null => self,
            value => self.push(column, Op::Eq, value),
        }
    }

    /// `column = value` when `value` is set and not null; adds nothing otherwise.
    #[must_use]
    pub fn eq_opt<V: Into<Value>>(self, column: C, value: Option<V>) -> Self {
        match value {
            Some(value) => self.eq(column, value),
            None => self,
        }
    }

    #[must_use]
    pub fn neq(self, column: C, value: impl Into<Value>) -> Self {
        self.push(column, Op::Neq, value.into())
    }

    #[must_use]
    pub fn gt(self, column: C, value: impl Into<Value>) -> Self {
        self.push(column, Op::Gt, value.into())
    }

    #[must_use]
    pub fn gte(self, column: C, value: impl Into<Value>) -> Self {
        self.push(column, Op::Gte, value.into())
    }

    #[must_use]
    pub fn lt(self, column: C, value: impl Into<Value>) -> Self {
        self.push(column, Op::Lt, value.into())
    }

    #[must_use]
    pub fn lte(self, column: C, value: impl Into<Value>) -> Self {
        self.push(column, Op::Lte, value.into())
    }

    #[must_use]
    pub fn is_null(self, column: C) -> Self {
        self.push(column, Op::IsNull, Value::Null)
    }

    #[must_use]
    pub fn not_null(self, column: C) -> Self {
        self.push(column, Op::NotNull, Value::Null)
    }

    /// `column IN (values)`. An empty list matches nothing.
    #[must_use]
    pub fn in_<V, I>(self, column: C, values: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.push(column, Op::In, Value::Array(values))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    #[must_use]
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub(crate) fn into_predicates(self) -> Vec<Predicate> {
        self.predicates
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub column: &'static str,
    pub ascending: bool,
}

/// How an embedded table relates to the table it is embedded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Embedded rows reference the outer row: `embedded.foreign_key = outer.id`.
    Children { foreign_key: &'static str },
    /// The outer row references the embedded row: `outer.foreign_key = embedded.id`.
    Parent { foreign_key: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Join {
    /// Keep outer rows without a match (empty list / null).
    #[default]
    Left,
    /// Drop outer rows without a match.
    Inner,
}

/// Untyped embed node, as handed to a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub table: &'static str,
    pub relation: Relation,
    pub join: Join,
    pub predicates: Vec<Predicate>,
    pub order: Vec<Order>,
    pub embeds: Vec<Embedding>,
}

/// Typed builder for a related table embedded in a select.
pub struct Embed<C> {
    node: Embedding,
    _column: PhantomData<C>,
}

impl<C: Column> Embed<C> {
    /// Embed the rows of `C::TABLE` whose `foreign_key` points at the outer row.
    #[must_use]
    pub fn children(foreign_key: C) -> Self {
        Self::with_relation(Relation::Children {
            foreign_key: foreign_key.name(),
        })
    }

    /// Embed the `C::TABLE` row the outer row points at through `foreign_key`,
    /// a column of the outer table.
    #[must_use]
    pub fn parent(foreign_key: impl Column) -> Self {
        Self::with_relation(Relation::Parent {
            foreign_key: foreign_key.name(),
        })
    }

    const fn with_relation(relation: Relation) -> Self {
        Self {
            node: Embedding {
                table: C::TABLE,
                relation,
                join: Join::Left,
                predicates: Vec::new(),
                order: Vec::new(),
                embeds: Vec::new(),
            },
            _column: PhantomData,
        }
    }

    /// Require a match: outer rows without one are dropped.
    #[must_use]
    pub fn inner(mut self) -> Self {
        self.node.join = Join::Inner;
        self
    }

    /// Constrain the embedded rows (and, for inner embeds, the outer rows).
    #[must_use]
    pub fn filter(mut self, filter: Filter<C>) -> Self {
        self.node.predicates.extend(filter.into_predicates());
        self
    }

    #[must_use]
    pub fn order_asc(mut self, column: C) -> Self {
        self.node.order.push(Order {
            column: column.name(),
            ascending: true,
        });
        self
    }

    #[must_use]
    pub fn order_desc(mut self, column: C) -> Self {
        self.node.order.push(Order {
            column: column.name(),
            ascending: false,
        });
        self
    }

    #[must_use]
    pub fn embed<E: Column>(mut self, embed: Embed<E>) -> Self {
        self.node.embeds.push(embed.node);
        self
    }
}

/// Typed select over one table.
pub struct Select<C> {
    filter: Filter<C>,
    order: Vec<Order>,
    limit: Option<usize>,
    embeds: Vec<Embedding>,
}

impl<C: Column> Default for Select<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Column> Select<C> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            filter: Filter::new(),
            order: Vec::new(),
            limit: None,
            embeds: Vec::new(),
        }
    }

    #[must_use]
    pub fn filter(mut self, filter: Filter<C>) -> Self {
        self.filter.predicates.extend(filter.into_predicates());
        self
    }

    #[must_use]
    pub fn order_asc(mut self, column: C) -> Self {
        self.order.push(Order {
            column: column.name(),
            ascending: true,
        });
        self
    }

    #[must_use]
    pub fn order_desc(mut self, column: C) -> Self {
        self.order.push(Order {
            column: column.name(),
            ascending: false,
        });
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn embed<E: Column>(mut self, embed: Embed<E>) -> Self {
        self.embeds.push(embed.node);
        self
    }

    #[must_use]
    pub fn into_query(self) -> Query {
        Query {
            table: C::TABLE,
            predicates: self.filter.into_predicates(),
            embeds: self.embeds,
            order: self.order,
            limit: self.limit,
        }
    }
}

impl<C: Column> From<Filter<C>> for Select<C> {
    fn from(filter: Filter<C>) -> Self {
        Self::new().filter(filter)
    }
}

/// Untyped select, as executed by a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: &'static str,
    pub predicates: Vec<Predicate>,
    pub embeds: Vec<Embedding>,
    pub order: Vec<Order>,
    pub limit: Option<usize>,
}

impl Query {
    #[must_use]
    pub const fn new(table: &'static str) -> Self {
        Self {
            table,
            predicates: Vec::new(),
            embeds: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    #[must_use]
    pub fn with_predicates(mut self, predicates: Vec<Predicate>) -> Self {
        self.predicates = predicates;
        self
    }
}

#[cfg(test)]
pub(crate) mod test_columns {
    use super::Column;

    #[derive(Debug, Clone, Copy)]
    pub enum Parent {
        Id,
        Title,
    }

    impl Column for Parent {
        const TABLE: &'static str = "parents";

        fn name(self) -> &'static str {
            match self {
                Self::Id => "id",
                Self::Title => "title",
            }
        }
    }

    #[derive(Debug, Clone, Copy)]
    pub enum Child {
        ParentId,
        Status,
        Rank,
    }

    impl Column for Child {
        const TABLE: &'static str = "children";

        fn name(self) -> &'static str {
            match self {
                Self::ParentId => "parent_id",
                Self::Status => "status",
                Self::Rank => "rank",
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_columns::{Child, Parent};
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn eq_opt_skips_unset_values() {
        let filter = Filter::<Parent>::new()
            .eq_opt(Parent::Title, None::<String>)
            .eq_opt(Parent::Id, Some("p-1"));
        assert_eq!(filter.predicates().len(), 1);
        assert_eq!(filter.predicates()[0], Predicate::eq("id", "p-1"));
    }

    #[test]
    fn null_values_add_no_constraint() {
        let filter = Filter::<Parent>::new()
            .eq(Parent::Title, Value::Null)
            .eq_opt(Parent::Title, Some(None::<String>))
            .eq(Parent::Id, "p-1");
        assert_eq!(filter.predicates(), &[Predicate::eq("id", "p-1")]);

        let explicit = Filter::<Parent>::new().is_null(Parent::Title);
        assert_eq!(explicit.predicates()[0].op, Op::IsNull);
    }

    #[test]
    fn in_collects_values_into_array() {
        let filter = Filter::<Child>::new().in_(Child::Status, ["a", "b"]);
        assert_eq!(filter.predicates()[0].value, json!(["a", "b"]));
    }

    #[test]
    fn select_lowers_into_query() {
        let query = Select::<Parent>::new()
            .filter(Filter::new().eq(Parent::Title, "Plan"))
            .order_desc(Parent::Id)
            .limit(5)
            .embed(
                Embed::children(Child::ParentId)
                    .inner()
                    .filter(Filter::new().neq(Child::Status, "done"))
                    .order_asc(Child::Rank),
            )
            .into_query();

        assert_eq!(query.table, "parents");
        assert_eq!(query.limit, Some(5));
        assert_eq!(
            query.order,
            vec![Order {
                column: "id",
                ascending: false
            }]
        );
        let embed = &query.embeds[0];
        assert_eq!(embed.table, "children");
        assert_eq!(embed.join, Join::Inner);
        assert_eq!(
            embed.relation,
            Relation::Children {
                foreign_key: "parent_id"
            }
        );
        assert_eq!(embed.predicates[0].op, Op::Neq);
    }

    #[test]
    fn parent_embed_names_outer_foreign_key() {
        let embed: Embed<Parent> = Embed::parent(Child::ParentId);
        assert_eq!(embed.node.table, "parents");
        assert_eq!(
            embed.node.relation,
            Relation::Parent {
                foreign_key: "parent_id"
            }
        );
        assert_eq!(embed.node.join, Join::Left);
    }
}
