use pretty_assertions::assert_eq;

use super::*;

#[test]
fn representation_follows_element_kind() {
    let ints = Sequence::from(vec![1_i64, 2]);
    let floats = Sequence::from(vec![0.5_f64]);
    let nested = Sequence::from(vec![Value::seq(vec![1_i64])]);
    assert_eq!(ints.kind(), ElementKind::Int);
    assert_eq!(floats.kind(), ElementKind::Float);
    assert_eq!(nested.kind(), ElementKind::Object);
}

#[test]
fn random_access() {
    let seq = Sequence::from(vec![10_i64, 20, 30]);
    assert_eq!(seq.len(), 3);
    assert_eq!(seq.get(1), Some(Value::Int(20)));
    assert_eq!(seq.get(3), None);
    assert_eq!(seq.value_as(2, ElementKind::Float), Value::Float(30.0));
}

#[test]
fn short_sequences_print_fully() {
    let seq = Sequence::from(vec![1_i64, 4, 9]);
    assert_eq!(seq.to_string(), "[1, 4, 9]");
    assert_eq!(Sequence::from(Vec::<i64>::new()).to_string(), "[]");
    assert_eq!(Sequence::from(vec![0.5_f64, 2.0]).to_string(), "[0.5, 2.0]");
}

#[test]
fn exactly_twenty_elements_are_not_elided() {
    let seq = Sequence::from((0..20).collect::<Vec<i64>>());
    assert!(!seq.to_string().contains("more"));
}

#[test]
fn long_sequences_are_elided() {
    let seq = Sequence::from((0..100).collect::<Vec<i64>>());
    assert_eq!(
        seq.to_string(),
        "[0, 1, 2, 3, 4, ... (90 more) ..., 95, 96, 97, 98, 99]"
    );
}

#[test]
fn nested_sequences_print_recursively() {
    let seq = Sequence::from(vec![
        Value::seq(vec![1_i64]),
        Value::seq(vec![1_i64, 2]),
    ]);
    assert_eq!(seq.to_string(), "[[1], [1, 2]]");
}
