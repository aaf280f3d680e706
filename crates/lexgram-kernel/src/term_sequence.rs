//! Term sequences: symbols whose every rule is lexical.
//!
//! Every builder here creates one symbol from a list of accepted surface
//! forms plus substitutions. Substituted forms are recognized but display as
//! the canonical text and are never suggested as insertions. A term that
//! appears twice keeps only its first occurrence.

use crate::error::GrammarError;
use crate::names;
use crate::registry::GrammarBuilder;
use crate::rule::{
    Features, GrammaticalCase, Inflections, PersonNumber, RuleSpec, SymbolId, Tense, TermText,
};
use crate::semantic::SemanticTree;
use std::collections::BTreeSet;

/// One accepted surface form.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedTerm {
    pub term: String,
    /// Finite when the term may be suggested for an omitted word.
    pub insertion_cost: Option<f64>,
}

impl AcceptedTerm {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            insertion_cost: None,
        }
    }

    pub fn insertable(term: impl Into<String>, cost: f64) -> Self {
        Self {
            term: term.into(),
            insertion_cost: Some(cost),
        }
    }
}

impl From<&str> for AcceptedTerm {
    fn from(term: &str) -> Self {
        Self::new(term)
    }
}

/// General input for [`GrammarBuilder::new_term_sequence`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermSequenceSpec {
    pub name: String,
    pub accepted: Vec<AcceptedTerm>,
    pub substituted: Vec<String>,
    /// Attached to every rule of the sequence.
    pub semantic: Option<SemanticTree>,
}

/// Forms of a verb. The first `one_sg` form is canonical.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerbSpec {
    pub name: String,
    pub one_sg: Vec<String>,
    pub three_sg: Vec<String>,
    pub pl: Vec<String>,
    pub past: Vec<String>,
    pub substituted: Vec<String>,
    pub insertion_cost: Option<f64>,
}

impl VerbSpec {
    /// A regular verb: `follow` -> follow / follows / follow / followed.
    pub fn regular(name: &str, base: &str, three_sg: &str, past: &str) -> Self {
        Self {
            name: name.to_string(),
            one_sg: vec![base.to_string()],
            three_sg: vec![three_sg.to_string()],
            pl: vec![base.to_string()],
            past: vec![past.to_string()],
            ..Self::default()
        }
    }
}

/// Nominative and objective forms of a pronoun. The first `nom` form is
/// canonical.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PronounSpec {
    pub name: String,
    pub nom: Vec<String>,
    pub obj: Vec<String>,
    pub substituted: Vec<String>,
    pub insertion_cost: Option<f64>,
    pub semantic: Option<SemanticTree>,
}

struct LexicalEntry {
    term: String,
    text: TermText,
    features: Features,
    insertion_cost: Option<f64>,
    accepted: bool,
}

impl GrammarBuilder {
    /// A term sequence from explicit accepted terms.
    ///
    /// Accepted terms display verbatim; substitutions display as the first
    /// accepted term.
    pub fn new_term_sequence(&mut self, spec: TermSequenceSpec) -> Result<SymbolId, GrammarError> {
        let canonical = spec
            .accepted
            .first()
            .map(|accepted| names::normalize_term(&accepted.term))
            .unwrap_or_default();
        let mut entries: Vec<LexicalEntry> = spec
            .accepted
            .into_iter()
            .map(|accepted| LexicalEntry {
                term: accepted.term,
                text: TermText::Verbatim,
                features: Features::default(),
                insertion_cost: accepted.insertion_cost,
                accepted: true,
            })
            .collect();
        entries.extend(substitutions(spec.substituted, TermText::Replace(canonical)));
        self.lexical_symbol(&spec.name, entries, spec.semantic)
    }

    /// A word: `accepted[0]` is canonical and carries `insertion_cost`.
    pub fn add_word<S: AsRef<str>>(
        &mut self,
        name: &str,
        accepted: &[S],
        substituted: &[S],
        insertion_cost: Option<f64>,
    ) -> Result<SymbolId, GrammarError> {
        let accepted = accepted
            .iter()
            .enumerate()
            .map(|(i, term)| AcceptedTerm {
                term: term.as_ref().to_string(),
                insertion_cost: if i == 0 { insertion_cost } else { None },
            })
            .collect();
        self.new_term_sequence(TermSequenceSpec {
            name: name.to_string(),
            accepted,
            substituted: substituted.iter().map(|s| s.as_ref().to_string()).collect(),
            semantic: None,
        })
    }

    /// A verb whose rules all carry the full conjugation table and the
    /// features of the form they matched.
    pub fn add_verb(&mut self, spec: VerbSpec) -> Result<SymbolId, GrammarError> {
        let table = TermText::Inflected(Inflections {
            one_sg: first_form(&spec.one_sg),
            three_sg: first_form(&spec.three_sg),
            pl: first_form(&spec.pl),
            past: first_form(&spec.past),
            ..Inflections::default()
        });
        let forms = [
            (&spec.one_sg, present(PersonNumber::OneSg)),
            (&spec.three_sg, present(PersonNumber::ThreeSg)),
            (&spec.pl, present(PersonNumber::Pl)),
            (&spec.past, Features::tense(Tense::Past)),
        ];
        let mut entries = Vec::new();
        for (terms, features) in forms {
            for term in terms {
                entries.push(LexicalEntry {
                    term: term.clone(),
                    text: table.clone(),
                    features,
                    insertion_cost: if entries.is_empty() {
                        spec.insertion_cost
                    } else {
                        None
                    },
                    accepted: true,
                });
            }
        }
        entries.extend(substitutions(spec.substituted, table));
        self.lexical_symbol(&spec.name, entries, None)
    }

    /// A pronoun with nominative and objective forms.
    pub fn add_pronoun(&mut self, spec: PronounSpec) -> Result<SymbolId, GrammarError> {
        let table = TermText::Inflected(Inflections {
            nom: first_form(&spec.nom),
            obj: first_form(&spec.obj),
            ..Inflections::default()
        });
        let forms = [
            (&spec.nom, Features::case(GrammaticalCase::Nom)),
            (&spec.obj, Features::case(GrammaticalCase::Obj)),
        ];
        let mut entries = Vec::new();
        for (terms, features) in forms {
            for term in terms {
                entries.push(LexicalEntry {
                    term: term.clone(),
                    text: table.clone(),
                    features,
                    insertion_cost: if entries.is_empty() {
                        spec.insertion_cost
                    } else {
                        None
                    },
                    accepted: true,
                });
            }
        }
        entries.extend(substitutions(spec.substituted, table));
        self.lexical_symbol(&spec.name, entries, spec.semantic)
    }

    /// A term sequence read as a fixed series of other term sequences,
    /// e.g. `[by] [1-sg]`.
    pub fn new_phrase(
        &mut self,
        name: &str,
        parts: &[SymbolId],
        text: TermText,
        semantic: Option<SemanticTree>,
    ) -> Result<SymbolId, GrammarError> {
        let symbol_name = names::symbol_name(&[name])?;
        if self.lookup(&symbol_name).is_some() {
            return Err(GrammarError::DuplicateSymbol(symbol_name));
        }
        for &part in parts {
            let target = self
                .get(part)
                .ok_or_else(|| GrammarError::UnknownSymbol(format!("#{}", part.0)))?;
            if !target.is_term_sequence() {
                return Err(GrammarError::NotATermSequence {
                    symbol: symbol_name,
                    target: target.name().to_string(),
                });
            }
        }
        if parts.is_empty() || parts.len() > 2 {
            return Err(GrammarError::RhsArity {
                symbol: symbol_name,
                len: parts.len(),
                expected: "1 or 2",
            });
        }
        self.check_semantic(semantic.as_ref())?;

        let id = self.new_term_sequence_symbol(&[name])?;
        let mut spec = RuleSpec::term_sequence(parts).text(text);
        if let Some(tree) = semantic {
            spec = spec.fixed(tree);
        }
        self.add_rule(id, spec)?;
        Ok(id)
    }

    fn lexical_symbol(
        &mut self,
        name: &str,
        entries: Vec<LexicalEntry>,
        semantic: Option<SemanticTree>,
    ) -> Result<SymbolId, GrammarError> {
        let symbol_name = names::symbol_name(&[name])?;
        if self.lookup(&symbol_name).is_some() {
            return Err(GrammarError::DuplicateSymbol(symbol_name));
        }

        let mut seen = BTreeSet::new();
        let mut checked = Vec::with_capacity(entries.len());
        for mut entry in entries {
            entry.term = names::checked_term(&entry.term)?;
            if !entry.term.is_empty() && seen.insert(entry.term.clone()) {
                checked.push(entry);
            }
        }
        let entries = checked;
        if !entries.iter().any(|entry| entry.accepted) {
            return Err(GrammarError::EmptyTermSequence(symbol_name));
        }
        for entry in &entries {
            if let Some(cost) = entry.insertion_cost
                && (!cost.is_finite() || cost < 0.0)
            {
                return Err(GrammarError::InvalidCost {
                    owner: format!("term `{}` of {symbol_name}", entry.term),
                    cost,
                });
            }
        }
        self.check_semantic(semantic.as_ref())?;

        let id = self.new_term_sequence_symbol(&[name])?;
        for entry in entries {
            let mut spec = RuleSpec::terminal(entry.term)
                .text(entry.text)
                .features(entry.features);
            if let Some(cost) = entry.insertion_cost {
                spec = spec.insertion_cost(cost);
            }
            if let Some(tree) = &semantic {
                spec = spec.fixed(tree.clone());
            }
            self.add_rule(id, spec)?;
        }
        tracing::debug!(symbol = %symbol_name, rules = self.rules(id).len(), "term sequence registered");
        Ok(id)
    }

    fn check_semantic(&self, semantic: Option<&SemanticTree>) -> Result<(), GrammarError> {
        let mut ids = BTreeSet::new();
        if let Some(tree) = semantic {
            tree.collect_ids(&mut ids);
        }
        for id in ids {
            self.semantics().definition(id)?;
        }
        Ok(())
    }
}

fn substitutions(terms: Vec<String>, text: TermText) -> impl Iterator<Item = LexicalEntry> {
    terms.into_iter().map(move |term| LexicalEntry {
        term,
        text: text.clone(),
        features: Features::default(),
        insertion_cost: None,
        accepted: false,
    })
}

fn first_form(forms: &[String]) -> Option<String> {
    forms.first().map(|form| names::normalize_term(form))
}

fn present(person_number: PersonNumber) -> Features {
    Features {
        person_number: Some(person_number),
        tense: Some(Tense::Present),
        ..Features::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{Rule, RuleKind};
    use crate::semantic::Semantic;

    fn terminal(rule: &Rule) -> (&str, &TermText) {
        match &rule.kind {
            RuleKind::Terminal { term, text } => (term.as_str(), text),
            other => panic!("expected terminal, got {other:?}"),
        }
    }

    #[test]
    fn word_substitutions_display_the_canonical_term() {
        let mut builder = GrammarBuilder::new();
        let id = builder
            .add_word("possessive-suffix", &["'s"], &["’s", "'S"], Some(1.0))
            .unwrap();
        let rules = builder.rules(id);
        assert_eq!(rules.len(), 2, "'S normalizes onto 's and is dropped");
        assert_eq!(terminal(&rules[0]), ("'s", &TermText::Verbatim));
        assert_eq!(rules[0].insertion_cost, Some(1.0));
        assert_eq!(
            terminal(&rules[1]),
            ("’s", &TermText::Replace("'s".to_string()))
        );
        assert_eq!(rules[1].insertion_cost, None);
        assert!(builder.is_term_sequence(id));
    }

    #[test]
    fn empty_sequences_are_rejected_before_registration() {
        let mut builder = GrammarBuilder::new();
        let err = builder
            .add_word("nothing", &["  "], &["x"], None)
            .expect_err("no accepted terms");
        assert_eq!(err, GrammarError::EmptyTermSequence("[nothing]".to_string()));
        assert!(builder.lookup("[nothing]").is_none());
    }

    #[test]
    fn verb_rules_carry_table_and_form_features() {
        let mut builder = GrammarBuilder::new();
        let id = builder
            .add_verb(VerbSpec::regular("follow", "follow", "follows", "followed"))
            .unwrap();
        let rules = builder.rules(id);
        // "follow" as 1-sg and pl collapses onto its first occurrence.
        let terms: Vec<&str> = rules.iter().map(|rule| terminal(rule).0).collect();
        assert_eq!(terms, vec!["follow", "follows", "followed"]);
        assert_eq!(rules[0].features, present(PersonNumber::OneSg));
        assert_eq!(rules[1].features.person_number, Some(PersonNumber::ThreeSg));
        assert_eq!(rules[2].features, Features::tense(Tense::Past));
        let TermText::Inflected(table) = terminal(&rules[2]).1 else {
            panic!("verb text must be a table");
        };
        assert_eq!(table.three_sg.as_deref(), Some("follows"));
        assert_eq!(table.past.as_deref(), Some("followed"));
    }

    #[test]
    fn pronoun_insertion_cost_sits_on_the_nominative_form() {
        let mut builder = GrammarBuilder::new();
        let me = builder.new_semantic(Semantic::argument("me")).unwrap();
        let me = builder.leaf_semantic(me).unwrap();
        let id = builder
            .add_pronoun(PronounSpec {
                name: "1-sg".to_string(),
                nom: vec!["I".to_string()],
                obj: vec!["me".to_string()],
                insertion_cost: Some(0.5),
                semantic: Some(me),
                ..PronounSpec::default()
            })
            .unwrap();
        let rules = builder.rules(id);
        assert_eq!(rules.len(), 2);
        assert_eq!(terminal(&rules[0]).0, "i");
        assert_eq!(rules[0].insertion_cost, Some(0.5));
        assert_eq!(rules[0].features, Features::case(GrammaticalCase::Nom));
        assert_eq!(rules[1].insertion_cost, None);
        assert!(rules.iter().all(|rule| rule.semantic.is_some()));
    }

    #[test]
    fn phrases_join_term_sequences_only() {
        let mut builder = GrammarBuilder::new();
        let by = builder.add_word("by", &["by"], &[], None).unwrap();
        let plain = builder.new_symbol(&["plain"]).unwrap();
        let phrase = builder
            .new_phrase("by-by", &[by, by], TermText::Verbatim, None)
            .unwrap();
        assert!(builder.is_term_sequence(phrase));
        let err = builder
            .new_phrase("by-plain", &[by, plain], TermText::Verbatim, None)
            .expect_err("plain symbol");
        assert!(matches!(err, GrammarError::NotATermSequence { .. }));
        assert!(builder.lookup("[by-plain]").is_none());
    }
}
