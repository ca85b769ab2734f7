use pretty_assertions::assert_eq;

use super::*;

fn ctx() -> RuntimeContext {
    RuntimeContext::sequential()
}

#[test]
fn params_and_arithmetic() {
    let backend = InterpBackend;
    let mut asm = backend
        .assembler(Type::FLOAT, &[Type::INTEGER, Type::FLOAT])
        .unwrap();
    let x = asm.param(0).unwrap();
    let x = asm.cast(x, Primitive::Integer, Primitive::Float).unwrap();
    let y = asm.param(1).unwrap();
    let body = asm.arithmetic(Primitive::Float).unwrap().add(x, y).unwrap();
    let f = backend.finish(asm.assemble(body).unwrap()).unwrap();

    let result = f.eval(&ctx(), &[Value::Int(2), Value::Float(1.5)]).unwrap();
    assert_eq!(result, Value::Float(3.5));
}

#[test]
fn unknown_representation_is_rejected() {
    let asm = InterpBackend.assembler(Type::UNKNOWN, &[]).unwrap();
    assert!(matches!(
        asm.arithmetic(Primitive::Unknown),
        Err(BackendError::UnsupportedRepresentation { .. })
    ));
}

#[test]
fn out_of_range_param_is_rejected() {
    let mut asm = InterpBackend.assembler(Type::INTEGER, &[]).unwrap();
    assert!(asm.param(0).is_err());
}

#[test]
fn integer_division_by_zero_is_a_runtime_error() {
    let mut asm = InterpBackend.assembler(Type::INTEGER, &[]).unwrap();
    let one = asm.constant(Constant::Int(1)).unwrap();
    let zero = asm.constant(Constant::Int(0)).unwrap();
    let body = asm.arithmetic(Primitive::Integer).unwrap().div(one, zero).unwrap();
    let f = asm.assemble(body).unwrap();
    assert_eq!(f.eval(&ctx(), &[]), Err(RuntimeError::DivisionByZero));
}

#[test]
fn map_and_reduce_call_lambdas() {
    // reduce(map(range(1, 4), x -> x * x), 0, (a, b) -> a + b)
    let mut asm = InterpBackend
        .assembler(Type::INTEGER, &[])
        .unwrap();

    let mut square = asm.nested(Type::INTEGER, &[Type::INTEGER]).unwrap();
    let (x1, x2) = (square.param(0).unwrap(), square.param(0).unwrap());
    let sq_body = square.arithmetic(Primitive::Integer).unwrap().mul(x1, x2).unwrap();
    let square = square.assemble(sq_body).unwrap();

    let mut sum = asm
        .nested(Type::INTEGER, &[Type::INTEGER, Type::INTEGER])
        .unwrap();
    let (a, b) = (sum.param(0).unwrap(), sum.param(1).unwrap());
    let sum_body = sum.arithmetic(Primitive::Integer).unwrap().add(a, b).unwrap();
    let sum = sum.assemble(sum_body).unwrap();

    let lo = asm.constant(Constant::Int(1)).unwrap();
    let hi = asm.constant(Constant::Int(4)).unwrap();
    let seq = asm.range(lo, hi).unwrap();
    let square = asm.lambda(&square).unwrap();
    let mapped = asm
        .map(seq, square, Type::INTEGER, Type::INTEGER)
        .unwrap();
    let zero = asm.constant(Constant::Int(0)).unwrap();
    let sum = asm.lambda(&sum).unwrap();
    let body = asm
        .reduce(mapped, zero, sum, Primitive::Integer, Primitive::Integer)
        .unwrap();
    let f = asm.assemble(body).unwrap();

    assert_eq!(f.eval(&ctx(), &[]).unwrap(), Value::Int(14));
    assert_eq!(
        f.eval(&RuntimeContext::parallel_with_threshold(0), &[]).unwrap(),
        Value::Int(14)
    );
}
