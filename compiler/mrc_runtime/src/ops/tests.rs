use pretty_assertions::assert_eq;

use super::*;
use crate::arith::int_add;

fn add_values(a: Value, b: Value) -> Result<Value, RuntimeError> {
    Ok(Value::Int(int_add(a.as_int()?, b.as_int()?)))
}

fn contexts() -> [RuntimeContext; 2] {
    [
        RuntimeContext::sequential(),
        RuntimeContext::parallel_with_threshold(0),
    ]
}

#[test]
fn range_is_half_open() {
    let seq = range(0, 5).unwrap();
    assert_eq!(seq.values(), &[0, 1, 2, 3, 4]);
}

#[test]
fn empty_and_inverted_ranges() {
    assert!(range(3, 3).unwrap().values().is_empty());
    assert!(range(5, -5).unwrap().values().is_empty());
    assert!(range(i64::MAX, i64::MIN).unwrap().values().is_empty());
}

#[test]
fn oversized_range_overflows() {
    let err = range(i64::MIN, i64::MAX).unwrap_err();
    assert!(matches!(err, RuntimeError::RangeOverflow { .. }));
    assert!(range(0, i64::from(i32::MAX) + 1).is_err());
}

#[test]
fn inclusive_range_keeps_its_upper_bound() {
    assert_eq!(range_inclusive(1, 4).unwrap().values(), &[1, 2, 3, 4]);
    assert_eq!(range_inclusive(-1, -1).unwrap().values(), &[-1]);
    assert!(range_inclusive(2, 1).unwrap().values().is_empty());
    assert_eq!(range_inclusive(i64::MAX, i64::MAX).unwrap().values(), &[i64::MAX]);
}

#[test]
fn inclusive_range_to_max_overflows() {
    assert_eq!(
        range_inclusive(0, i64::MAX).unwrap_err(),
        RuntimeError::RangeOverflow {
            start: 0,
            last: i64::MAX,
            max: MAX_SEQUENCE_LEN,
        }
    );
    assert!(matches!(
        range_inclusive(i64::MIN, i64::MAX),
        Err(RuntimeError::RangeOverflow { .. })
    ));
    assert!(range_inclusive(0, i64::from(i32::MAX)).is_err());
}

#[test]
fn map_squares_in_order() {
    let seq = Sequence::from(range(1, 4).unwrap());
    for ctx in contexts() {
        let squared = map(&ctx, &seq, ElementKind::Int, |v| {
            let x = v.as_int()?;
            Ok(Value::Int(x * x))
        })
        .unwrap();
        assert_eq!(squared, Sequence::from(vec![1_i64, 4, 9]));
    }
}

#[test]
fn map_can_build_nested_sequences() {
    let seq = Sequence::from(range(1, 3).unwrap());
    let nested = map(&RuntimeContext::sequential(), &seq, ElementKind::Object, |v| {
        Ok(Value::seq(range(0, v.as_int()?)?))
    })
    .unwrap();
    assert_eq!(nested.to_string(), "[[0], [0, 1]]");
}

#[test]
fn map_propagates_errors() {
    let seq = Sequence::from(range(0, 3).unwrap());
    for ctx in contexts() {
        let err = map(&ctx, &seq, ElementKind::Int, |v| {
            Ok(Value::Int(crate::arith::int_div(1, v.as_int()?)?))
        })
        .unwrap_err();
        assert_eq!(err, RuntimeError::DivisionByZero);
    }
}

#[test]
fn reduce_sums_to_ten_in_both_modes() {
    let seq = Sequence::from(range(1, 5).unwrap());
    for ctx in contexts() {
        let total = reduce(&ctx, &seq, Value::Int(0), add_values).unwrap();
        assert_eq!(total, Value::Int(10));
    }
}

#[test]
fn reduce_of_empty_sequence_is_neutral() {
    let seq = Sequence::from(range(0, 0).unwrap());
    for ctx in contexts() {
        assert_eq!(reduce(&ctx, &seq, Value::Int(42), add_values).unwrap(), Value::Int(42));
    }
}

#[test]
fn reduce_widens_elements_to_float_accumulator() {
    let seq = Sequence::from(range(1, 4).unwrap());
    let total = reduce(&RuntimeContext::sequential(), &seq, Value::Float(0.5), |a, b| {
        Ok(Value::Float(a.as_float()? + b.as_float()?))
    })
    .unwrap();
    assert_eq!(total, Value::Float(6.5));
}

#[test]
fn sequential_reduce_is_a_left_fold() {
    // Subtraction is not associative, so only a strict left fold gives this.
    let seq = Sequence::from(range(1, 4).unwrap());
    let total = reduce(&RuntimeContext::sequential(), &seq, Value::Int(10), |a, b| {
        Ok(Value::Int(a.as_int()? - b.as_int()?))
    })
    .unwrap();
    assert_eq!(total, Value::Int(4));
}

#[test]
fn typed_cores_work_on_unboxed_lanes() {
    let ctx = RuntimeContext::parallel_with_threshold(0);
    let seq = range(0, 1000).unwrap();
    let doubled = map_by(&ctx, seq.values().len(), |i| Ok(seq.values()[i] * 2)).unwrap();
    assert_eq!(doubled[999], 1998);
    let sum = reduce_by(&ctx, doubled.len(), |i| doubled[i], 0, |a, b| Ok(a + b)).unwrap();
    assert_eq!(sum, 999_000);
}
