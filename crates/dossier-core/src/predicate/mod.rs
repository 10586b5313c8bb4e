/// Declarative filter expressions over document fields.
///
/// A [`Predicate`] is a small boolean expression tree whose leaves test one
/// document field each. It is data, not a callback: callers can evaluate it
/// in memory with [`Predicate::matches`], render it as SQL with
/// [`sql::to_sql`], print it, or serialise it and hand it to another process.
///
/// # Normal form
///
/// Trees built through the smart constructors [`Predicate::and`],
/// [`Predicate::or`] and [`Predicate::not`] are kept small:
///
/// - constants are folded (`x AND true` → `x`, `x OR true` → `true`);
/// - nested `And`/`Or` of the same kind are flattened;
/// - sibling `ClassificationIn` leaves merge (union under `Or`, intersection
///   under `And`), and a leaf covering every level folds to `true`;
/// - duplicate children are dropped;
/// - `Not` is pushed into `ClassificationIn` as the set complement.
///
/// Building a variant directly bypasses this; the result still evaluates
/// correctly, it is just not simplified.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classification::{Classification, ClassificationSet};
use crate::newtypes::UserId;
use crate::structures::Document;

pub mod sql;


/// A boolean expression over a document's access-relevant fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "arg", rename_all = "snake_case")]
pub enum Predicate {
    /// Matches every document.
    True,
    /// Matches no document.
    False,
    /// Matches archived documents.
    Archived,
    /// Matches documents whose classification is in the set.
    ClassificationIn(ClassificationSet),
    /// Matches documents owned by the user.
    OwnerIs(UserId),
    /// Matches documents whose share list contains the user.
    SharedWith(UserId),
    /// Negation.
    Not(Box<Predicate>),
    /// Conjunction; an empty list is `true`.
    And(Vec<Predicate>),
    /// Disjunction; an empty list is `false`.
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Leaf matching exactly one classification level.
    pub fn classification_is(level: Classification) -> Self {
        Self::ClassificationIn(ClassificationSet::only(level))
    }

    /// Leaf matching a classification set, folded to a constant when the set
    /// is empty or complete.
    pub fn classification_in(set: ClassificationSet) -> Self {
        if set.is_empty() {
            Self::False
        } else if set.is_all() {
            Self::True
        } else {
            Self::ClassificationIn(set)
        }
    }

    /// Simplifying conjunction.
    pub fn and<I: IntoIterator<Item = Predicate>>(parts: I) -> Self {
        let mut out: Vec<Predicate> = Vec::new();
        let mut classes: Option<(usize, ClassificationSet)> = None;

        let mut stack: Vec<Predicate> = parts.into_iter().collect();
        stack.reverse();
        while let Some(part) = stack.pop() {
            match part {
                Self::True => {}
                Self::False => return Self::False,
                Self::And(inner) => stack.extend(inner.into_iter().rev()),
                Self::ClassificationIn(set) => {
                    classes = Some(match classes {
                        Some((pos, acc)) => (pos, acc.intersection(set)),
                        None => (out.len(), set),
                    });
                }
                other @ (Self::Archived
                | Self::OwnerIs(_)
                | Self::SharedWith(_)
                | Self::Not(_)
                | Self::Or(_)) => push_unique(&mut out, other),
            }
        }

        if let Some((pos, set)) = classes {
            if set.is_empty() {
                return Self::False;
            }
            if !set.is_all() {
                out.insert(pos, Self::ClassificationIn(set));
            }
        }

        if contains_complementary_pair(&out) {
            return Self::False;
        }
        collapse(out, Self::True, Self::And)
    }

    /// Simplifying disjunction.
    pub fn or<I: IntoIterator<Item = Predicate>>(parts: I) -> Self {
        let mut out: Vec<Predicate> = Vec::new();
        let mut classes: Option<(usize, ClassificationSet)> = None;

        let mut stack: Vec<Predicate> = parts.into_iter().collect();
        stack.reverse();
        while let Some(part) = stack.pop() {
            match part {
                Self::False => {}
                Self::True => return Self::True,
                Self::Or(inner) => stack.extend(inner.into_iter().rev()),
                Self::ClassificationIn(set) => {
                    classes = Some(match classes {
                        Some((pos, acc)) => (pos, acc.union(set)),
                        None => (out.len(), set),
                    });
                }
                other @ (Self::Archived
                | Self::OwnerIs(_)
                | Self::SharedWith(_)
                | Self::Not(_)
                | Self::And(_)) => push_unique(&mut out, other),
            }
        }

        if let Some((pos, set)) = classes {
            if set.is_all() {
                return Self::True;
            }
            if !set.is_empty() {
                out.insert(pos, Self::ClassificationIn(set));
            }
        }

        if contains_complementary_pair(&out) {
            return Self::True;
        }
        collapse(out, Self::False, Self::Or)
    }

    /// Simplifying negation.
    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Predicate) -> Self {
        match inner {
            Self::True => Self::False,
            Self::False => Self::True,
            Self::Not(p) => *p,
            Self::ClassificationIn(set) => Self::classification_in(set.complement()),
            other @ (Self::Archived
            | Self::OwnerIs(_)
            | Self::SharedWith(_)
            | Self::And(_)
            | Self::Or(_)) => Self::Not(Box::new(other)),
        }
    }

    /// Evaluates the predicate against one document.
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Self::True => true,
            Self::False => false,
            Self::Archived => doc.is_archived,
            Self::ClassificationIn(set) => set.contains(doc.classification),
            Self::OwnerIs(user) => doc.is_owned_by(user),
            Self::SharedWith(user) => doc.is_shared_with(user),
            Self::Not(p) => !p.matches(doc),
            Self::And(ps) => ps.iter().all(|p| p.matches(doc)),
            Self::Or(ps) => ps.iter().any(|p| p.matches(doc)),
        }
    }

    /// Returns the documents from `docs` that the predicate matches, in
    /// input order.
    pub fn filter<'a, I>(&self, docs: I) -> Vec<&'a Document>
    where
        I: IntoIterator<Item = &'a Document>,
    {
        docs.into_iter().filter(|d| self.matches(d)).collect()
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        match self {
            Self::True
            | Self::False
            | Self::Archived
            | Self::ClassificationIn(_)
            | Self::OwnerIs(_)
            | Self::SharedWith(_) => 1,
            Self::Not(p) => 1 + p.node_count(),
            Self::And(ps) | Self::Or(ps) => 1 + ps.iter().map(Self::node_count).sum::<usize>(),
        }
    }
}

fn push_unique(out: &mut Vec<Predicate>, p: Predicate) {
    if !out.contains(&p) {
        out.push(p);
    }
}

/// Returns `true` if the list contains both some `x` and `Not(x)`.
fn contains_complementary_pair(parts: &[Predicate]) -> bool {
    parts.iter().any(|p| match p {
        Predicate::Not(inner) => parts.contains(inner),
        Predicate::True
        | Predicate::False
        | Predicate::Archived
        | Predicate::ClassificationIn(_)
        | Predicate::OwnerIs(_)
        | Predicate::SharedWith(_)
        | Predicate::And(_)
        | Predicate::Or(_) => false,
    })
}

fn collapse(
    mut parts: Vec<Predicate>,
    identity: Predicate,
    wrap: fn(Vec<Predicate>) -> Predicate,
) -> Predicate {
    match parts.len() {
        0 => identity,
        1 => parts.remove(0),
        _ => wrap(parts),
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => f.write_str("true"),
            Self::False => f.write_str("false"),
            Self::Archived => f.write_str("archived"),
            Self::ClassificationIn(set) if set.len() == 1 => {
                write!(f, "classification = ")?;
                for c in set.iter() {
                    write!(f, "{c}")?;
                }
                Ok(())
            }
            Self::ClassificationIn(set) => write!(f, "classification IN {set}"),
            Self::OwnerIs(u) => write!(f, "owner = {u}"),
            Self::SharedWith(u) => write!(f, "shared_with CONTAINS {u}"),
            Self::Not(p) => match p.as_ref() {
                Self::And(_) | Self::Or(_) => write!(f, "NOT ({p})"),
                Self::True
                | Self::False
                | Self::Archived
                | Self::ClassificationIn(_)
                | Self::OwnerIs(_)
                | Self::SharedWith(_)
                | Self::Not(_) => write!(f, "NOT {p}"),
            },
            Self::And(ps) => write_joined(f, ps, " AND ", true),
            Self::Or(ps) => write_joined(f, ps, " OR ", false),
        }
    }
}

fn write_joined(
    f: &mut fmt::Formatter<'_>,
    parts: &[Predicate],
    sep: &str,
    wrap_or: bool,
) -> fmt::Result {
    for (i, p) in parts.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        let needs_parens = match p {
            Predicate::Or(_) => wrap_or,
            Predicate::And(_) => !wrap_or,
            Predicate::True
            | Predicate::False
            | Predicate::Archived
            | Predicate::ClassificationIn(_)
            | Predicate::OwnerIs(_)
            | Predicate::SharedWith(_)
            | Predicate::Not(_) => false,
        };
        if needs_parens {
            write!(f, "({p})")?;
        } else {
            write!(f, "{p}")?;
        }
    }
    Ok(())
}
