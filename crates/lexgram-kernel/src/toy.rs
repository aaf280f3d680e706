//! Toy content modules: a small social/code-hosting grammar.
//!
//! Enough to exercise every builder feature end to end:
//! categories with entities, verbs, pronouns with case, a negated verb,
//! a passive phrase, a possessive adjective and conjunctions.
//!
//! ```text
//! people I follow                 users-followed(me)
//! people I do not follow          not(users-followed(me))
//! people who follow me            followers(me)
//! people followed by me           users-followed(me)
//! repos I like                    repositories-liked(me)
//! John's repos                    repositories-created({user})
//! ```

use crate::build::{BuildContext, ContentModule};
use crate::category::{Category, CategorySpec};
use crate::error::GrammarError;
use crate::rule::{Features, GrammaticalCase, RuleSpec, SymbolId, TermText};
use crate::semantic::{Semantic, SemanticTree};
use crate::term_sequence::{PronounSpec, VerbSpec};

/// Symbols shared by every module that talks about the speaker.
#[derive(Debug, Clone)]
struct FirstPerson {
    pronoun: SymbolId,
    nom: SymbolId,
    obj: SymbolId,
}

fn users(ctx: &mut BuildContext) -> Result<Category, GrammarError> {
    ctx.category(
        CategorySpec::new("user", "users")
            .person()
            .entities(&["John", "Mary"]),
    )
}

fn me(ctx: &mut BuildContext) -> Result<SemanticTree, GrammarError> {
    let me = ctx.semantic(Semantic::argument("me"))?;
    ctx.grammar.leaf_semantic(me)
}

fn first_person(ctx: &mut BuildContext) -> Result<FirstPerson, GrammarError> {
    if let (Some(pronoun), Some(nom), Some(obj)) = (
        ctx.grammar.lookup("[1-sg]"),
        ctx.grammar.lookup("[nom-1-sg]"),
        ctx.grammar.lookup("[obj-1-sg]"),
    ) {
        return Ok(FirstPerson { pronoun, nom, obj });
    }
    let me = me(ctx)?;
    let pronoun = ctx.grammar.add_pronoun(PronounSpec {
        name: "1-sg".to_string(),
        nom: vec!["I".to_string()],
        obj: vec!["me".to_string()],
        insertion_cost: Some(0.5),
        ..PronounSpec::default()
    })?;
    let nom = ctx.grammar.new_symbol(&["nom-1-sg"])?;
    ctx.grammar.add_rule(
        nom,
        RuleSpec::unary(pronoun)
            .fixed(me.clone())
            .features(Features::case(GrammaticalCase::Nom)),
    )?;
    let obj = ctx.grammar.new_symbol(&["obj-1-sg"])?;
    ctx.grammar.add_rule(
        obj,
        RuleSpec::unary(pronoun)
            .fixed(me)
            .features(Features::case(GrammaticalCase::Obj)),
    )?;
    Ok(FirstPerson { pronoun, nom, obj })
}

/// Users, following, and the first-person pronoun.
#[derive(Debug, Default, Clone, Copy)]
pub struct UsersModule;

impl ContentModule for UsersModule {
    fn name(&self) -> &str {
        "users"
    }

    fn register(&self, ctx: &mut BuildContext) -> Result<(), GrammarError> {
        let users = users(ctx)?;
        let speaker = first_person(ctx)?;
        let me = me(ctx)?;

        let follow = ctx
            .grammar
            .add_verb(VerbSpec::regular("follow", "follow", "follows", "followed"))?;
        let followed = ctx.semantic(Semantic::function("users-followed", 1, 1))?;
        let followers = ctx.semantic(Semantic::function("followers", 1, 1))?;
        let not = ctx.semantic(Semantic::function("not", 1, 1).forbidding_multiple())?;

        let negation = ctx.negation(Some(follow))?;
        let follow_negated = ctx.grammar.new_symbol(&["follow-negated"])?;
        ctx.grammar.new_binary_rule(
            follow_negated,
            RuleSpec::binary(negation.symbol, follow).no_insertion(&[0]),
        )?;

        let users_followed = ctx.grammar.defer_semantic(&[followed])?;
        ctx.grammar.new_binary_rule(
            users.obj_filter,
            RuleSpec::binary(speaker.nom, follow).deferred(users_followed.clone()),
        )?;
        let not_followed = ctx.grammar.defer_semantic(&[not, followed])?;
        ctx.grammar.new_binary_rule(
            users.obj_filter,
            RuleSpec::binary(speaker.nom, follow_negated).deferred(not_followed),
        )?;

        let followers_of = ctx.grammar.defer_semantic(&[followers])?;
        ctx.grammar.new_binary_rule(
            users.subj_filter,
            RuleSpec::binary(follow, speaker.obj).deferred(followers_of),
        )?;

        let by = ctx.grammar.add_word("by", &["by"], &[], None)?;
        let by_me = ctx
            .grammar
            .new_phrase("by-1-sg", &[by, speaker.pronoun], TermText::Verbatim, Some(me))?;
        ctx.grammar.new_binary_rule(
            users.passive,
            RuleSpec::binary(follow, by_me).deferred(users_followed),
        )?;

        let start = ctx.grammar.start();
        ctx.grammar.add_rule(start, RuleSpec::unary(users.plural))?;
        Ok(())
    }
}

/// Repositories, liking, and ownership through a user's possessive.
#[derive(Debug, Default, Clone, Copy)]
pub struct RepositoriesModule;

impl ContentModule for RepositoriesModule {
    fn name(&self) -> &str {
        "repositories"
    }

    fn register(&self, ctx: &mut BuildContext) -> Result<(), GrammarError> {
        let repos = ctx.category(CategorySpec::new("repository", "repos"))?;
        let users = users(ctx)?;
        let speaker = first_person(ctx)?;

        let like = ctx
            .grammar
            .add_verb(VerbSpec::regular("like", "like", "likes", "liked"))?;
        let liked = ctx.semantic(Semantic::function("repositories-liked", 1, 1))?;
        let created = ctx.semantic(Semantic::function("repositories-created", 1, 1))?;

        let repositories_liked = ctx.grammar.defer_semantic(&[liked])?;
        ctx.grammar.new_binary_rule(
            repos.obj_filter,
            RuleSpec::binary(speaker.nom, like).deferred(repositories_liked),
        )?;

        let possessive = users
            .possessive
            .ok_or_else(|| GrammarError::UnknownSymbol("[user-possessive]".to_string()))?;
        let created_by = ctx.grammar.defer_semantic(&[created])?;
        ctx.grammar
            .add_rule(repos.adjective, RuleSpec::unary(possessive).deferred(created_by))?;

        let start = ctx.grammar.start();
        ctx.grammar.add_rule(start, RuleSpec::unary(repos.plural))?;
        Ok(())
    }
}

/// Both toy modules, in registration order.
pub fn toy_modules() -> [&'static dyn ContentModule; 2] {
    [&UsersModule, &RepositoriesModule]
}
