//! End-to-end attack scenarios against scripted oracles.

mod common;

use codeflip::prelude::*;
use common::{example, init_tracing, ScriptedClassifier, ScriptedSuggestions};

// ============================================================================
// Greedy engine
// ============================================================================

#[test]
fn test_single_identifier_flip() {
    init_tracing();
    let classifier = ScriptedClassifier::new(0.9).flip_on(&["y"]);
    let suggestions = ScriptedSuggestions::new().on("x", &["y"]);
    let ex = example("x = 1 ; x = x + 2 ;", &["x"], 0);

    let attacker = Attacker::new(&classifier, &suggestions, AttackConfig::new()).expect("config");
    let result = attacker.attack(&ex).expect("attack");

    assert_eq!(result.outcome.code(), 1);
    assert_eq!(result.nb_changed_var, 1);
    assert_eq!(result.nb_changed_pos, 3);
    assert_eq!(result.substitutions.len(), 1);
    assert_eq!(result.substitutions.get("x").map(String::as_str), Some("y"));
    assert_eq!(result.adversarial_code, "y = 1 ; y = y + 2 ;");
    assert_eq!(result.final_label, Some(1));
    // init, importance (1 + 3 masked), candidates
    assert_eq!(classifier.batch_sizes(), vec![1, 4, 1]);
}

#[test]
fn test_already_misclassified_stops_after_init() {
    let classifier = ScriptedClassifier::new(0.3);
    let suggestions = ScriptedSuggestions::new().on("x", &["y"]);
    let ex = example("x = 1 ;", &["x"], 0);

    let attacker = Attacker::new(&classifier, &suggestions, AttackConfig::new()).expect("config");
    let result = attacker.attack(&ex).expect("attack");

    assert_eq!(result.outcome, AttackOutcome::AlreadyMisclassified);
    assert_eq!(result.outcome.code(), -4);
    assert!(result.substitutions.is_empty());
    assert!(result.adversarial_code.is_empty());
    assert_eq!(result.original_label, 1);
    assert_eq!(result.final_label, None);
    assert_eq!(classifier.batch_sizes(), vec![1]);
    assert!(suggestions.calls().is_empty());
    assert_eq!(result.usage.classifier_calls, 1);
}

#[test]
fn test_empty_candidate_set_skipped_without_queries() {
    let classifier = ScriptedClassifier::new(0.9).drop_on("c", 0.1);
    let suggestions = ScriptedSuggestions::new()
        .on("a", &["a", " a ", "<unk>", "while", "2fast"])
        .on("b", &["c"]);
    let ex = example("a = b ;", &["a", "b"], 0);
    let config = AttackConfig::new()
        .with_eval_batch_size(16)
        .with_genetic_fallback(false);

    let attacker = Attacker::new(&classifier, &suggestions, config).expect("config");
    let result = attacker.attack(&ex).expect("attack");

    // init, importance (1 + 2 masked), b's candidates; nothing for a
    assert_eq!(classifier.batch_sizes(), vec![1, 3, 1]);
    assert_eq!(suggestions.calls(), vec![0, 2]);
    assert_eq!(result.outcome, AttackOutcome::Exhausted);
    assert!(!result.substitutions.contains_key("a"));
    assert_eq!(result.substitutions.get("b").map(String::as_str), Some("c"));
    assert_eq!(result.adversarial_code, "a = c ;");
}

#[test]
fn test_no_identifiers() {
    let classifier = ScriptedClassifier::new(0.9);
    let suggestions = ScriptedSuggestions::new();
    let ex = example("return 0 ;", &[], 0);

    let attacker = Attacker::new(&classifier, &suggestions, AttackConfig::new()).expect("config");
    let result = attacker.attack(&ex).expect("attack");

    assert_eq!(result.outcome.code(), -3);
    assert_eq!(classifier.batch_sizes(), vec![1]);
    assert!(result.names.is_empty());
}

#[test]
fn test_commits_accumulate_across_identifiers() {
    let classifier = ScriptedClassifier::new(0.9)
        .drop_on("p", 0.2)
        .drop_on("q", 0.25);
    let suggestions = ScriptedSuggestions::new().on("a", &["p"]).on("b", &["q"]);
    let ex = example("a = b ;", &["a", "b"], 0);

    let attacker = Attacker::new(&classifier, &suggestions, AttackConfig::new()).expect("config");
    let result = attacker.attack(&ex).expect("attack");

    assert!(result.outcome.is_success());
    assert_eq!(result.adversarial_code, "p = q ;");
    assert_eq!(result.nb_changed_var, 2);
    // b's candidate was evaluated on top of a's committed rename
    assert_eq!(classifier.programs().last().map(String::as_str), Some("p = q ;"));
}

#[test]
fn test_log_probability_suggestions_under_default_config() {
    let classifier = ScriptedClassifier::new(0.9).flip_on(&["total"]);
    let suggestions = |_: &TokenizedProgram, _: usize, _: usize| -> codeflip::Result<Vec<Vec<Suggestion>>> {
        Ok(vec![vec![Suggestion::new("total", -0.2), Suggestion::new("sum", -1.5)]])
    };
    let ex = example("n = n + 1 ;", &["n"], 0);

    let attacker = Attacker::new(&classifier, &suggestions, AttackConfig::new()).expect("config");
    let result = attacker.attack(&ex).expect("attack");

    assert_eq!(result.outcome, AttackOutcome::Success);
    assert_eq!(result.substitutions.get("n").map(String::as_str), Some("total"));
}

#[test]
fn test_first_flipping_candidate_wins() {
    let classifier = ScriptedClassifier::new(0.9).flip_on(&["u"]).flip_on(&["v"]);
    let suggestions = ScriptedSuggestions::new().on("a", &["w", "u", "v"]);
    let ex = example("a ;", &["a"], 0);

    let attacker = Attacker::new(&classifier, &suggestions, AttackConfig::new()).expect("config");
    let result = attacker.attack(&ex).expect("attack");

    assert_eq!(result.substitutions.get("a").map(String::as_str), Some("u"));
}

#[test]
fn test_identity_recorded_when_nothing_helps() {
    let classifier = ScriptedClassifier::new(0.9);
    let suggestions = ScriptedSuggestions::new().on("a", &["u"]);
    let ex = example("a ;", &["a"], 0);
    let config = AttackConfig::new().with_genetic_fallback(false);

    let attacker = Attacker::new(&classifier, &suggestions, config).expect("config");
    let result = attacker.attack(&ex).expect("attack");

    assert_eq!(result.outcome.code(), -1);
    assert_eq!(result.substitutions.get("a").map(String::as_str), Some("a"));
    assert_eq!(result.nb_changed_var, 0);
    assert!(result.adversarial_code.is_empty());
    assert_eq!(result.final_label, Some(0));
}

#[test]
fn test_batches_never_exceed_limit() {
    let classifier = ScriptedClassifier::new(0.9);
    let words = ["c0", "c1", "c2", "c3", "c4", "c5", "c6", "c7", "c8", "c9"];
    let suggestions = ScriptedSuggestions::new().on("a", &words).on("b", &words);
    let ex = example("a = b + a * b - a ;", &["a", "b"], 0);
    let config = AttackConfig::new().with_eval_batch_size(3).with_seed(5);

    let attacker = Attacker::new(&classifier, &suggestions, config).expect("config");
    attacker.attack(&ex).expect("attack");

    let sizes = classifier.batch_sizes();
    assert!(!sizes.is_empty());
    assert!(sizes.iter().all(|&n| n <= 3), "{sizes:?}");
}

// ============================================================================
// Genetic fallback
// ============================================================================

#[test]
fn test_genetic_child_flips_after_greedy_exhausts() {
    init_tracing();
    // greedy commits the decoy for `a`, which blocks the left + right flip
    let classifier = ScriptedClassifier::new(0.9)
        .drop_on("decoy", 0.3)
        .drop_on("left", 0.1)
        .drop_on("right", 0.1)
        .with_floor(0.55)
        .flip_on(&["left", "right"]);
    let suggestions = ScriptedSuggestions::new()
        .on("a", &["decoy", "left"])
        .on("b", &["right"]);
    let ex = example("a = b + a ;", &["a", "b"], 0);
    let config = AttackConfig::new().with_seed(11).with_max_iterations(200);

    let attacker = Attacker::new(&classifier, &suggestions, config).expect("config");
    let result = attacker.attack(&ex).expect("attack");

    assert_eq!(result.outcome, AttackOutcome::Success);
    assert!(result.genetic_iterations >= 1);
    assert_eq!(result.substitutions.get("a").map(String::as_str), Some("left"));
    assert_eq!(result.substitutions.get("b").map(String::as_str), Some("right"));
    assert_eq!(
        result.adversarial_code,
        ex.program.apply(&result.substitutions).join(" ")
    );
    assert_eq!(result.adversarial_code, "left = right + left ;");
    assert_eq!(result.final_label, Some(1));
    assert_eq!(result.nb_changed_var, 2);
    assert_eq!(result.nb_changed_pos, 3);
    // greedy importance scores survive the fallback
    assert_eq!(result.importance_scores.len(), 2);
}

#[test]
fn test_no_valid_candidates_after_exhaustion() {
    let classifier = ScriptedClassifier::new(0.9);
    let suggestions = ScriptedSuggestions::new().on("a", &["a", "for"]);
    let ex = example("a ;", &["a"], 0);

    let attacker = Attacker::new(&classifier, &suggestions, AttackConfig::new()).expect("config");
    let result = attacker.attack(&ex).expect("attack");

    assert_eq!(result.outcome, AttackOutcome::NoValidCandidates);
    assert!(result.outcome.is_attempted());
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_suggestion_failure_is_an_error() {
    let classifier = ScriptedClassifier::new(0.9);
    let failing = |_: &TokenizedProgram, _: usize, _: usize| -> codeflip::Result<Vec<Vec<Suggestion>>> {
        Err(CodeflipError::oracle(
            codeflip::error::OracleKind::Suggestion,
            "model unavailable",
        ))
    };
    let ex = example("a ;", &["a"], 0);

    let attacker = Attacker::new(&classifier, &failing, AttackConfig::new()).expect("config");
    let err = attacker.attack(&ex).unwrap_err();
    assert!(err.is_oracle_failure());
    assert!(err.to_string().contains("model unavailable"));
}

#[test]
fn test_short_classifier_answer_is_an_error() {
    let classifier = |programs: &[String]| -> codeflip::Result<Vec<Prediction>> {
        Ok(programs
            .iter()
            .take(1)
            .map(|_| Prediction::from_probs(vec![0.9, 0.1]))
            .collect())
    };
    let suggestions = ScriptedSuggestions::new().on("a", &["u"]);
    let ex = example("a = a ;", &["a"], 0);

    let attacker = Attacker::new(&classifier, &suggestions, AttackConfig::new()).expect("config");
    let err = attacker.attack(&ex).unwrap_err();
    assert!(err.is_oracle_failure());
}

// ============================================================================
// Driver over many examples
// ============================================================================

#[test]
fn test_attack_all_with_lexical_extractor() {
    let classifier = ScriptedClassifier::new(0.9).flip_on(&["count"]);
    let suggestions = ScriptedSuggestions::new().on("n", &["count"]).on("k", &["m"]);
    let extractor = LexicalExtractor::new();
    let examples = vec![
        Example::extract(&extractor, "int f(int n) { return n + 1; }", Language::C, 0)
            .expect("extract"),
        Example::extract(&extractor, "int g(int k) { return k; }", Language::C, 0)
            .expect("extract"),
        Example::extract(&extractor, "int h() { return 0; }", Language::C, 1).expect("extract"),
    ];
    let config = AttackConfig::new().with_seed(2).with_max_iterations(3);

    let attacker = Attacker::new(&classifier, &suggestions, config).expect("config");
    let (results, stats) = attacker.attack_all(&examples);

    let codes: Vec<i8> = results.iter().map(|r| r.outcome.code()).collect();
    assert_eq!(codes, vec![1, -1, -4]);
    assert_eq!(stats.examples, 3);
    assert_eq!(stats.attempted, 2);
    assert!((stats.success_rate() - 0.5).abs() < 1e-12);
    assert_eq!(
        results[0].adversarial_code,
        "int f ( int count ) { return count + 1 ; }"
    );
}
