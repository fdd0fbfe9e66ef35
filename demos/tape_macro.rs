use jojograd::Tape;
use jojograd_macro::jojograd;

fn main() -> Result<(), jojograd::GradError> {
    let tape = Tape::new();
    jojograd!(tape, {
        let x = 123.;
        let result = 2. * x + 321.;
    });
    println!("f(x): {}", result.value());
    result.backward(1.)?;
    println!("df/dx: {}", x.grad());
    println!("{result:#?}");
    Ok(())
}
