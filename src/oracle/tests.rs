use super::*;
use std::cell::RefCell;

/// Records the size of every physical call.
struct Recording {
    calls: RefCell<Vec<usize>>,
}

impl Recording {
    fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl Classifier for Recording {
    fn classify(&self, programs: &[String]) -> Result<Vec<Prediction>> {
        self.calls.borrow_mut().push(programs.len());
        Ok(programs
            .iter()
            .map(|p| {
                if p.contains("flip") {
                    Prediction::new(vec![0.2, 0.8], 1)
                } else {
                    Prediction::new(vec![0.9, 0.1], 0)
                }
            })
            .collect())
    }
}

fn programs(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("p{i}")).collect()
}

#[test]
fn test_prediction_from_probs_argmax() {
    let pred = Prediction::from_probs(vec![0.1, 0.7, 0.2]);
    assert_eq!(pred.label, 1);
    assert!((pred.confidence() - 0.7).abs() < 1e-6);
    assert!((pred.prob(2) - 0.2).abs() < 1e-6);
    assert_eq!(pred.prob(9), 0.0);
}

#[test]
fn test_batches_never_exceed_limit() {
    let inner = Recording::new();
    let mut clf = BatchClassifier::new(&inner, 4);
    let preds = clf.classify(&programs(10)).expect("classify");

    assert_eq!(preds.len(), 10);
    assert_eq!(*inner.calls.borrow(), vec![4, 4, 2]);
    assert_eq!(clf.usage().classifier_calls, 3);
    assert_eq!(clf.usage().programs_classified, 10);
}

#[test]
fn test_order_preserved_across_chunks() {
    let inner = Recording::new();
    let mut clf = BatchClassifier::new(&inner, 2);
    let input = vec!["a".into(), "flip".into(), "b".into()];
    let preds = clf.classify(&input).expect("classify");
    let labels: Vec<usize> = preds.iter().map(|p| p.label).collect();
    assert_eq!(labels, vec![0, 1, 0]);
}

#[test]
fn test_empty_request_makes_no_call() {
    let inner = Recording::new();
    let mut clf = BatchClassifier::new(&inner, 4);
    assert!(clf.classify(&[]).expect("classify").is_empty());
    assert!(inner.calls.borrow().is_empty());
    assert_eq!(clf.usage(), OracleUsage::default());
}

#[test]
fn test_zero_batch_limit_clamped() {
    let inner = Recording::new();
    let clf = BatchClassifier::new(&inner, 0);
    assert_eq!(clf.max_batch(), 1);
}

#[test]
fn test_wrong_length_is_oracle_failure() {
    let short = |programs: &[String]| -> Result<Vec<Prediction>> {
        Ok(programs
            .iter()
            .skip(1)
            .map(|_| Prediction::new(vec![1.0, 0.0], 0))
            .collect())
    };
    let mut clf = BatchClassifier::new(&short, 8);
    let err = clf.classify(&programs(3)).unwrap_err();
    assert!(err.is_oracle_failure());
    assert!(err.to_string().contains("expected 3 predictions, got 2"));
}

#[test]
fn test_label_out_of_range_is_oracle_failure() {
    let bad = |programs: &[String]| -> Result<Vec<Prediction>> {
        Ok(programs
            .iter()
            .map(|_| Prediction::new(vec![0.5, 0.5], 2))
            .collect())
    };
    let mut clf = BatchClassifier::new(&bad, 8);
    assert!(clf.classify_one("x").unwrap_err().is_oracle_failure());
}

#[test]
fn test_non_finite_probability_is_oracle_failure() {
    let bad = |programs: &[String]| -> Result<Vec<Prediction>> {
        Ok(programs
            .iter()
            .map(|_| Prediction::new(vec![f32::NAN, 0.5], 1))
            .collect())
    };
    let mut clf = BatchClassifier::new(&bad, 8);
    assert!(clf.classify_one("x").unwrap_err().is_oracle_failure());
}

#[test]
fn test_label_space_change_is_oracle_failure() {
    let shifting = |programs: &[String]| -> Result<Vec<Prediction>> {
        Ok(programs
            .iter()
            .map(|p| {
                if p == "three" {
                    Prediction::new(vec![0.2, 0.3, 0.5], 2)
                } else {
                    Prediction::new(vec![0.6, 0.4], 0)
                }
            })
            .collect())
    };
    let mut clf = BatchClassifier::new(&shifting, 8);
    clf.classify_one("two").expect("first answer fixes label space");
    let err = clf.classify_one("three").unwrap_err();
    assert!(err.to_string().contains("label space changed"));
}

#[test]
fn test_pinned_label_space() {
    let inner = Recording::new();
    let mut clf = BatchClassifier::new(&inner, 8).with_num_labels(3);
    assert!(clf.classify_one("x").unwrap_err().is_oracle_failure());
}

#[test]
fn test_inner_error_propagates() {
    let failing = |_: &[String]| -> Result<Vec<Prediction>> {
        Err(CodeflipError::oracle(OracleKind::Classifier, "device lost"))
    };
    let mut clf = BatchClassifier::new(&failing, 8);
    let err = clf.classify_one("x").unwrap_err();
    assert!(err.to_string().contains("device lost"));
}

#[test]
fn test_classify_tokens_joins_with_spaces() {
    let echo = |programs: &[String]| -> Result<Vec<Prediction>> {
        Ok(programs
            .iter()
            .map(|p| Prediction::new(vec![p.len() as f32, 0.0], 0))
            .collect())
    };
    let mut clf = BatchClassifier::new(&echo, 8);
    let preds = clf
        .classify_tokens(&[vec!["ab".into(), "c".into()]])
        .expect("classify");
    assert_eq!(preds[0].probs[0], 4.0);
}

#[test]
fn test_usage_add_assign() {
    let mut total = OracleUsage {
        classifier_calls: 1,
        programs_classified: 4,
        suggestion_calls: 2,
    };
    total += OracleUsage {
        classifier_calls: 2,
        programs_classified: 5,
        suggestion_calls: 1,
    };
    assert_eq!(total.classifier_calls, 3);
    assert_eq!(total.programs_classified, 9);
    assert_eq!(total.suggestion_calls, 3);
}
