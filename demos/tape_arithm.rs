use jojograd::Tape;

fn main() -> Result<(), jojograd::GradError> {
    env_logger::init();

    let tape = Tape::new();
    let a = tape.term("a", 10.);
    let b = tape.term("b", 2.);
    let c = a * b;
    let d = c / b;

    d.backward(1.)?;

    for (label, term) in [("d", d), ("c", c), ("b", b), ("a", a)] {
        println!("{label} = {}, grad: {}", term.value(), term.grad());
    }

    let x = tape.term("x", 5.);
    let y = -x;
    y.backward(1.)?;
    println!("d(-x) / dx = {}", x.grad());

    let zero = tape.term("zero", 0.);
    let q = a / zero;
    println!("a / 0 = {}", q.value());
    if let Err(e) = q.backward(1.) {
        println!("backward: {e}");
    }
    Ok(())
}
