/// Rendering of a [`Predicate`] as a parameterised SQL `WHERE` fragment.
///
/// Values are never interpolated into the SQL text. Every user id and
/// classification level becomes a positional placeholder (`$1`, `$2`, …) and
/// is returned alongside the text in [`SqlFragment::params`], in placeholder
/// order.
///
/// Share lists are assumed to live in a join table, so `SharedWith` renders
/// as an `EXISTS` sub-select against [`SqlSchema::share_table`].
use serde::{Deserialize, Serialize};

use super::Predicate;
use crate::classification::Classification;

/// Table and column names the fragment refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlSchema {
    /// Document table (or its alias in the enclosing query).
    pub document_table: String,
    /// Primary key column of the document table.
    pub id_column: String,
    /// Owner foreign-key column.
    pub owner_column: String,
    /// Classification column.
    pub classification_column: String,
    /// Boolean archived flag column.
    pub archived_column: String,
    /// Join table holding one row per (document, user) share.
    pub share_table: String,
    /// Document foreign key in the share table.
    pub share_document_column: String,
    /// User foreign key in the share table.
    pub share_user_column: String,
    /// Store classification values upper-cased (`'PUBLIC'`).
    pub upper_case_classifications: bool,
}

impl Default for SqlSchema {
    fn default() -> Self {
        Self {
            document_table: "documents".to_owned(),
            id_column: "id".to_owned(),
            owner_column: "owner_id".to_owned(),
            classification_column: "classification".to_owned(),
            archived_column: "is_archived".to_owned(),
            share_table: "document_shares".to_owned(),
            share_document_column: "document_id".to_owned(),
            share_user_column: "user_id".to_owned(),
            upper_case_classifications: true,
        }
    }
}

/// A bound value for one placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlParam {
    /// Text value (user ids and classification levels).
    Text(String),
}

/// SQL text plus its positional parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlFragment {
    /// Boolean SQL expression with `$n` placeholders.
    pub sql: String,
    /// Parameter values; `params[0]` binds `$1`.
    pub params: Vec<SqlParam>,
}

/// Renders `predicate` against `schema`.
pub fn to_sql(predicate: &Predicate, schema: &SqlSchema) -> SqlFragment {
    let mut writer = Writer {
        schema,
        sql: String::new(),
        params: Vec::new(),
    };
    writer.expr(predicate);
    SqlFragment {
        sql: writer.sql,
        params: writer.params,
    }
}

struct Writer<'a> {
    schema: &'a SqlSchema,
    sql: String,
    params: Vec<SqlParam>,
}

impl Writer<'_> {
    fn bind(&mut self, value: String) -> String {
        self.params.push(SqlParam::Text(value));
        format!("${}", self.params.len())
    }

    fn column(&self, column: &str) -> String {
        format!("{}.{}", self.schema.document_table, column)
    }

    fn level(&self, level: Classification) -> String {
        if self.schema.upper_case_classifications {
            level.as_str().to_ascii_uppercase()
        } else {
            level.as_str().to_owned()
        }
    }

    fn expr(&mut self, predicate: &Predicate) {
        match predicate {
            Predicate::True => self.sql.push_str("TRUE"),
            Predicate::False => self.sql.push_str("FALSE"),
            Predicate::Archived => {
                let col = self.column(&self.schema.archived_column);
                self.sql.push_str(&col);
            }
            Predicate::ClassificationIn(set) => {
                let col = self.column(&self.schema.classification_column);
                let placeholders: Vec<String> = set
                    .iter()
                    .map(|c| {
                        let value = self.level(c);
                        self.bind(value)
                    })
                    .collect();
                match placeholders.as_slice() {
                    [] => self.sql.push_str("FALSE"),
                    [one] => self.sql.push_str(&format!("{col} = {one}")),
                    many => self
                        .sql
                        .push_str(&format!("{col} IN ({})", many.join(", "))),
                }
            }
            Predicate::OwnerIs(user) => {
                let col = self.column(&self.schema.owner_column);
                let ph = self.bind(user.to_string());
                self.sql.push_str(&format!("{col} = {ph}"));
            }
            Predicate::SharedWith(user) => {
                let id = self.column(&self.schema.id_column);
                let ph = self.bind(user.to_string());
                let s = self.schema;
                self.sql.push_str(&format!(
                    "EXISTS (SELECT 1 FROM {t} WHERE {t}.{d} = {id} AND {t}.{u} = {ph})",
                    t = s.share_table,
                    d = s.share_document_column,
                    u = s.share_user_column,
                ));
            }
            Predicate::Not(inner) => {
                self.sql.push_str("NOT (");
                self.expr(inner);
                self.sql.push(')');
            }
            Predicate::And(parts) => self.joined(parts, " AND ", "TRUE"),
            Predicate::Or(parts) => self.joined(parts, " OR ", "FALSE"),
        }
    }

    fn joined(&mut self, parts: &[Predicate], sep: &str, empty: &str) {
        if parts.is_empty() {
            self.sql.push_str(empty);
            return;
        }
        self.sql.push('(');
        for (i, p) in parts.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(sep);
            }
            self.expr(p);
        }
        self.sql.push(')');
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::classification::ClassificationSet;
    use crate::test_helpers::user_id;

    #[test]
    fn constants_render_as_literals() {
        let schema = SqlSchema::default();
        assert_eq!(to_sql(&Predicate::True, &schema).sql, "TRUE");
        assert_eq!(to_sql(&Predicate::False, &schema).sql, "FALSE");
    }

    #[test]
    fn classification_set_binds_each_level() {
        let p = Predicate::ClassificationIn(ClassificationSet::at_most(Classification::Internal));
        let frag = to_sql(&p, &SqlSchema::default());
        assert_eq!(frag.sql, "documents.classification IN ($1, $2)");
        assert_eq!(
            frag.params,
            vec![
                SqlParam::Text("PUBLIC".to_owned()),
                SqlParam::Text("INTERNAL".to_owned())
            ]
        );
    }

    #[test]
    fn single_level_uses_equality() {
        let p = Predicate::classification_is(Classification::Public);
        let schema = SqlSchema {
            upper_case_classifications: false,
            ..SqlSchema::default()
        };
        let frag = to_sql(&p, &schema);
        assert_eq!(frag.sql, "documents.classification = $1");
        assert_eq!(frag.params, vec![SqlParam::Text("public".to_owned())]);
    }

    #[test]
    fn shared_with_is_exists_subselect() {
        let frag = to_sql(&Predicate::SharedWith(user_id("u7")), &SqlSchema::default());
        assert_eq!(
            frag.sql,
            "EXISTS (SELECT 1 FROM document_shares WHERE document_shares.document_id = documents.id AND document_shares.user_id = $1)"
        );
        assert_eq!(frag.params, vec![SqlParam::Text("u7".to_owned())]);
    }

    #[test]
    fn placeholders_number_in_order() {
        let p = Predicate::and([
            Predicate::not(Predicate::Archived),
            Predicate::or([
                Predicate::classification_is(Classification::Public),
                Predicate::OwnerIs(user_id("u1")),
                Predicate::SharedWith(user_id("u1")),
            ]),
        ]);
        let frag = to_sql(&p, &SqlSchema::default());
        assert_eq!(
            frag.sql,
            "(NOT (documents.is_archived) AND (documents.classification = $1 OR documents.owner_id = $2 OR EXISTS (SELECT 1 FROM document_shares WHERE document_shares.document_id = documents.id AND document_shares.user_id = $3)))"
        );
        assert_eq!(frag.params.len(), 3);
    }

    #[test]
    fn custom_schema_names_are_used() {
        let schema = SqlSchema {
            document_table: "d".to_owned(),
            owner_column: "owner".to_owned(),
            ..SqlSchema::default()
        };
        let frag = to_sql(&Predicate::OwnerIs(user_id("u1")), &schema);
        assert_eq!(frag.sql, "d.owner = $1");
    }

    #[test]
    fn fragment_serializes_params_as_strings() {
        let frag = to_sql(&Predicate::OwnerIs(user_id("u1")), &SqlSchema::default());
        let json = serde_json::to_string(&frag).expect("serialize");
        assert_eq!(json, r#"{"sql":"documents.owner_id = $1","params":["u1"]}"#);
    }
}
