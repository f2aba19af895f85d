use crate::photoexport_core::catalog::AssetRecord;
use rusqlite::types::Value;

/// Catalog fields a predicate can reference. Columns are rendered
/// against the master-table alias `m` used by every catalog query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Filename,
    TypeTag,
    GroupingId,
    BurstId,
    ImportBatchId,
    Width,
    Height,
}

impl Field {
    pub fn column(&self) -> &'static str {
        match self {
            Field::Filename => "m.fileName",
            Field::TypeTag => "m.UTI",
            Field::GroupingId => "m.mediaGroupId",
            Field::BurstId => "m.burstUuid",
            Field::ImportBatchId => "m.importGroupUuid",
            Field::Width => "m.width",
            Field::Height => "m.height",
        }
    }
}

/// A boolean expression over an asset record.
///
/// Every expression has two renderings that agree on all records: a
/// parameterized SQL fragment (`to_sql`) and an in-memory evaluation
/// (`matches`). Comparisons against unset fields are non-matching in
/// both renderings, so `Not` behaves as plain boolean negation and
/// never trips over SQL three-valued logic.
#[derive(Debug, Clone)]
pub enum Expr {
    All(Vec<Expr>),
    Any(Vec<Expr>),
    Not(Box<Expr>),
    Eq(Field, String),
    IsNull(Field),
    IsNotNull(Field),
    StartsWith(Field, String),
    /// Character at a 0-based offset equals the given character.
    CharAt(Field, usize, char),
    LengthIs(Field, usize),
    SameAs(Field, Field),
    DiffersFrom(Field, Field),
    InList(Field, Vec<String>),
}

impl Expr {
    pub fn not(expr: Expr) -> Expr {
        Expr::Not(Box::new(expr))
    }

    /// Render to a parameterized SQL fragment, appending bound values
    /// to `params` in rendering order.
    pub fn to_sql(&self, params: &mut Vec<Value>) -> String {
        match self {
            Expr::All(exprs) => {
                if exprs.is_empty() {
                    return "1".to_string();
                }
                let parts: Vec<String> = exprs.iter().map(|e| e.to_sql(params)).collect();
                format!("({})", parts.join(" AND "))
            }
            Expr::Any(exprs) => {
                if exprs.is_empty() {
                    return "0".to_string();
                }
                let parts: Vec<String> = exprs.iter().map(|e| e.to_sql(params)).collect();
                format!("({})", parts.join(" OR "))
            }
            Expr::Not(inner) => format!("NOT {}", inner.to_sql(params)),
            Expr::Eq(field, value) => {
                params.push(Value::Text(value.clone()));
                format!("({col} IS NOT NULL AND {col} = ?)", col = field.column())
            }
            Expr::IsNull(field) => format!("{} IS NULL", field.column()),
            Expr::IsNotNull(field) => format!("{} IS NOT NULL", field.column()),
            Expr::StartsWith(field, prefix) => {
                let escaped = prefix.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
                params.push(Value::Text(format!("{escaped}%")));
                format!(
                    "({col} IS NOT NULL AND {col} LIKE ? ESCAPE '\\')",
                    col = field.column()
                )
            }
            Expr::CharAt(field, index, ch) => {
                params.push(Value::Text(ch.to_string()));
                // SQL substr offsets are 1-based.
                format!(
                    "({col} IS NOT NULL AND substr({col}, {pos}, 1) = ?)",
                    col = field.column(),
                    pos = index + 1
                )
            }
            Expr::LengthIs(field, len) => format!(
                "({col} IS NOT NULL AND length({col}) = {len})",
                col = field.column()
            ),
            Expr::SameAs(a, b) => format!(
                "({a} IS NOT NULL AND {b} IS NOT NULL AND {a} = {b})",
                a = a.column(),
                b = b.column()
            ),
            Expr::DiffersFrom(a, b) => format!(
                "({a} IS NOT NULL AND {b} IS NOT NULL AND {a} <> {b})",
                a = a.column(),
                b = b.column()
            ),
            Expr::InList(field, values) => {
                if values.is_empty() {
                    return "0".to_string();
                }
                let placeholders: Vec<&str> = values.iter().map(|_| "?").collect();
                for v in values {
                    params.push(Value::Text(v.clone()));
                }
                format!("{} IN ({})", field.column(), placeholders.join(", "))
            }
        }
    }

    /// Evaluate against a record in memory. Pure and total: unset
    /// fields are non-matching for every comparison, never wildcards.
    pub fn matches(&self, record: &AssetRecord) -> bool {
        match self {
            Expr::All(exprs) => exprs.iter().all(|e| e.matches(record)),
            Expr::Any(exprs) => exprs.iter().any(|e| e.matches(record)),
            Expr::Not(inner) => !inner.matches(record),
            Expr::Eq(field, value) => record.text_field(*field) == Some(value.as_str()),
            Expr::IsNull(field) => record.field_is_null(*field),
            Expr::IsNotNull(field) => !record.field_is_null(*field),
            Expr::StartsWith(field, prefix) => record
                .text_field(*field)
                .is_some_and(|v| v.starts_with(prefix.as_str())),
            Expr::CharAt(field, index, ch) => record
                .text_field(*field)
                .and_then(|v| v.chars().nth(*index))
                .is_some_and(|c| c == *ch),
            Expr::LengthIs(field, len) => record
                .text_field(*field)
                .is_some_and(|v| v.chars().count() == *len),
            Expr::SameAs(a, b) => match (record.int_field(*a), record.int_field(*b)) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
            Expr::DiffersFrom(a, b) => match (record.int_field(*a), record.int_field(*b)) {
                (Some(x), Some(y)) => x != y,
                _ => false,
            },
            Expr::InList(field, values) => record
                .text_field(*field)
                .is_some_and(|v| values.iter().any(|c| c == v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photoexport_core::catalog::AssetRecord;

    fn record() -> AssetRecord {
        AssetRecord {
            id: 1,
            filename: "IMG_0042.HEIC".to_string(),
            relative_path: "2019/03/30/x/IMG_0042.HEIC".to_string(),
            creation_timestamp: 546_805_814,
            grouping_id: Some("CID1".to_string()),
            burst_id: None,
            type_tag: "public.heic".to_string(),
            import_batch_id: Some("batch-1".to_string()),
            width: Some(4032),
            height: Some(3024),
            has_companion: None,
            is_selfie: None,
            attachment_timestamp: None,
        }
    }

    #[test]
    fn test_eq_and_null_checks() {
        let r = record();
        assert!(Expr::Eq(Field::TypeTag, "public.heic".into()).matches(&r));
        assert!(!Expr::Eq(Field::TypeTag, "public.jpeg".into()).matches(&r));
        assert!(Expr::IsNull(Field::BurstId).matches(&r));
        assert!(Expr::IsNotNull(Field::GroupingId).matches(&r));
        // Unset field never matches an equality test.
        assert!(!Expr::Eq(Field::BurstId, "anything".into()).matches(&r));
    }

    #[test]
    fn test_dimension_comparisons_with_nulls() {
        let mut r = record();
        assert!(Expr::DiffersFrom(Field::Width, Field::Height).matches(&r));
        assert!(!Expr::SameAs(Field::Width, Field::Height).matches(&r));

        r.width = None;
        assert!(!Expr::DiffersFrom(Field::Width, Field::Height).matches(&r));
        assert!(!Expr::SameAs(Field::Width, Field::Height).matches(&r));
        // Negation of a null comparison is a plain boolean flip.
        assert!(Expr::not(Expr::SameAs(Field::Width, Field::Height)).matches(&r));
    }

    #[test]
    fn test_char_at_and_length() {
        let mut r = record();
        r.filename = "ABCDEFG1-2345-6789-0123-456789ABCDEF.jpg".to_string();
        assert!(Expr::CharAt(Field::Filename, 8, '-').matches(&r));
        assert!(Expr::CharAt(Field::Filename, 13, '-').matches(&r));
        assert!(Expr::LengthIs(Field::Filename, 40).matches(&r));
        assert!(!Expr::CharAt(Field::Filename, 9, '-').matches(&r));
    }

    #[test]
    fn test_sql_rendering_binds_params_in_order() {
        let expr = Expr::All(vec![
            Expr::Eq(Field::TypeTag, "public.heic".into()),
            Expr::IsNotNull(Field::GroupingId),
            Expr::InList(Field::ImportBatchId, vec!["a".into(), "b".into()]),
        ]);
        let mut params = Vec::new();
        let sql = expr.to_sql(&mut params);
        assert_eq!(
            sql,
            "((m.UTI IS NOT NULL AND m.UTI = ?) AND m.mediaGroupId IS NOT NULL \
             AND m.importGroupUuid IN (?, ?))"
        );
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_sql_rendering_of_empty_combinators() {
        let mut params = Vec::new();
        assert_eq!(Expr::All(vec![]).to_sql(&mut params), "1");
        assert_eq!(Expr::Any(vec![]).to_sql(&mut params), "0");
        assert_eq!(Expr::InList(Field::ImportBatchId, vec![]).to_sql(&mut params), "0");
        assert!(params.is_empty());
    }

    #[test]
    fn test_starts_with_escapes_like_metacharacters() {
        let mut params = Vec::new();
        let sql = Expr::StartsWith(Field::Filename, "IMG_".into()).to_sql(&mut params);
        assert!(sql.contains("LIKE ? ESCAPE"));
        assert_eq!(params, vec![Value::Text("IMG\\_%".to_string())]);
    }
}
