use jojograd::{GradError, OpTag, Tape};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn add() {
    init();
    let tape = Tape::new();
    let a = tape.term("a", 3.);
    let b = tape.term("b", -7.);
    let c = a + b;
    c.backward(2.5).unwrap();
    assert_eq!(c.grad(), 2.5);
    assert_eq!(a.grad(), 2.5);
    assert_eq!(b.grad(), 2.5);
}

#[test]
fn mul() {
    let tape = Tape::new();
    let a = tape.term("a", 3.);
    let b = tape.term("b", -7.);
    let c = a * b;
    c.backward(2.).unwrap();
    assert_eq!(a.grad(), 2. * -7.);
    assert_eq!(b.grad(), 2. * 3.);
}

#[test]
fn sub() {
    let tape = Tape::new();
    let a = tape.term("a", 3.);
    let b = tape.term("b", -7.);
    let c = a - b;
    assert_eq!(c.value(), 10.);
    c.backward(1.5).unwrap();
    assert_eq!(a.grad(), 1.5);
    assert_eq!(b.grad(), -1.5);
}

#[test]
fn div() {
    let tape = Tape::new();
    let a = tape.term("a", 3.);
    let b = tape.term("b", 7.);
    let c = a / b;
    let g = 2.;
    c.backward(g).unwrap();
    assert_eq!(a.grad(), g / 7.);
    assert_eq!(b.grad(), -g * 3. / (7. * 7.));
}

#[test]
fn div_by_zero_fails_only_on_backward() {
    init();
    let tape = Tape::new();
    let a = tape.term("a", 3.);
    let b = tape.term("b", 0.);
    let c = a / b;
    assert_eq!(c.value(), f64::INFINITY);
    assert_eq!(c.op_tag(), OpTag::Divide);
    assert!(matches!(
        c.backward(1.),
        Err(GradError::DivisionByZero { .. })
    ));
}

#[test]
fn div_by_zero_deep_in_graph() {
    let tape = Tape::new();
    let a = tape.term("a", 3.);
    let zero = tape.term("zero", 0.);
    let one = tape.term("one", 1.);
    let q = a / zero;
    let out = one + q;
    let err = out.backward(1.).unwrap_err();
    assert_eq!(err, GradError::division_by_zero(q.name()));
    // Propagation stops at the failing node.
    assert_eq!(out.grad(), 1.);
    assert_eq!(one.grad(), 1.);
    assert_eq!(q.grad(), 1.);
    assert_eq!(a.grad(), 0.);
}

#[test]
fn unused_leaf_stays_zero() {
    let tape = Tape::new();
    let a = tape.term("a", 1.);
    let b = tape.term("b", 2.);
    let unused = tape.term("unused", 4.);
    let c = (a + b) * b - a / b;
    c.backward(1.).unwrap();
    assert_eq!(unused.grad(), 0.);
}

#[test]
fn reference_scenario() {
    init();
    let tape = Tape::new();
    let a = tape.term("a", 10.);
    let b = tape.term("b", 2.);
    let c = a * b;
    let d = c / b;
    assert_eq!(c.value(), 20.);
    assert_eq!(d.value(), 10.);

    d.backward(1.).unwrap();
    assert_eq!(d.grad(), 1.);
    assert_eq!(c.grad(), 0.5);
    // d == a, so nothing depends on b in the end
    assert_eq!(b.grad(), 0.);
    assert_eq!(a.grad(), 1.);
}

#[test]
fn negation_scenario() {
    let tape = Tape::new();
    let x = tape.term("x", 5.);
    let y = -x;
    y.backward(1.).unwrap();
    assert_eq!(x.grad(), -1.);
}

#[test]
fn repeated_backward_accumulates() {
    let tape = Tape::new();
    let a = tape.term("a", 1.5);
    let b = tape.term("b", 4.);
    let c = tape.term("c", -2.);
    let out = (a * b + c) / b - (-c);

    out.backward(1.).unwrap();
    let once = [a.grad(), b.grad(), c.grad()];
    out.backward(1.).unwrap();
    let twice = [a.grad(), b.grad(), c.grad()];
    for (once, twice) in once.iter().zip(twice.iter()) {
        assert_eq!(*twice, 2. * once);
    }
}

#[test]
fn zero_grad_resets_between_passes() {
    let tape = Tape::new();
    let a = tape.term("a", 2.);
    let b = tape.term("b", 5.);
    let out = a * b - a;

    out.backward(1.).unwrap();
    let first = (a.grad(), b.grad());
    assert_eq!(first, (4., 2.));

    tape.zero_grad();
    assert_eq!(a.grad(), 0.);
    out.backward(1.).unwrap();
    assert_eq!((a.grad(), b.grad()), first);
}

#[test]
fn combine_with_legacy_codes() {
    let tape = Tape::new();
    let a = tape.term("a", 8.);
    let b = tape.term("b", 2.);
    let tags: Vec<OpTag> = (0..4).map(|code| OpTag::try_from(code).unwrap()).collect();
    let values: Vec<f64> = tags
        .iter()
        .map(|tag| a.combine(b, *tag).unwrap().value())
        .collect();
    assert_eq!(values, [10., 16., 6., 4.]);
    assert!(a.combine(b, OpTag::try_from(-1).unwrap()).is_err());
    assert!(OpTag::try_from(7).is_err());
}
