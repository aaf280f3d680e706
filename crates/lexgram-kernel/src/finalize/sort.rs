//! Canonical rule order.
//!
//! Rows are ordered by their serialized form, which covers every field, so
//! two rows compare equal exactly when they would serialize identically.
//! Symbols need no sorting: the document keys them in a `BTreeMap`.

use crate::error::GrammarError;
use crate::output::RuleRow;

pub(crate) fn canonicalize(rows: &mut Vec<RuleRow>) -> Result<(), GrammarError> {
    let mut keyed = rows
        .drain(..)
        .map(|row| serde_json::to_string(&row).map(|key| (key, row)))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| GrammarError::Serialize(e.to_string()))?;
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.dedup_by(|a, b| a.0 == b.0);
    rows.extend(keyed.into_iter().map(|(_, row)| row));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::RhsRow;

    fn row(rhs: RhsRow) -> RuleRow {
        RuleRow::new(rhs)
    }

    #[test]
    fn rows_are_sorted_and_deduplicated() {
        let mut rows = vec![
            row(RhsRow::Terminal("b".to_string())),
            row(RhsRow::Symbols(vec!["[x]".to_string()])),
            row(RhsRow::Terminal("a".to_string())),
            row(RhsRow::Terminal("b".to_string())),
        ];
        canonicalize(&mut rows).unwrap();
        assert_eq!(
            rows,
            vec![
                row(RhsRow::Symbols(vec!["[x]".to_string()])),
                row(RhsRow::Terminal("a".to_string())),
                row(RhsRow::Terminal("b".to_string())),
            ]
        );
    }
}
