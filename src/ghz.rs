use chp_sim::{ circuit::StabCircuit, error::StabResult };
use tracing::{ info, warn };
use tracing_subscriber::EnvFilter;

const N: usize = 3; // number of qubits

// an unparseable seed falls back to OS entropy, with a warning
fn parse_seed(arg: Option<&str>) -> Option<u64> {
    let arg = arg?;
    match arg.parse::<u64>() {
        Ok(seed) => Some(seed),
        Err(err) => {
            warn!(arg, %err, "ignoring invalid seed; seeding from OS entropy");
            None
        },
    }
}

fn main() -> StabResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let arg: Option<String> = std::env::args().nth(1);
    let seed: Option<u64> = parse_seed(arg.as_deref());
    let mut circuit = StabCircuit::new(N, seed);
    circuit.hadamard(2).cnot(2, 1).cnot(2, 0);

    println!("stabilizers:\n{}", circuit.state);
    let s = circuit.entanglement_entropy(0, 2)?;
    println!("region [0, 2) entanglement entropy: {}", s);

    let bits = circuit.measure_all();
    info!(?bits, "measured all qubits");
    println!("outcomes: {:?}", bits);

    println!("stabilizers:\n{}", circuit.state);
    let s = circuit.entanglement_entropy(0, 2)?;
    println!("region [0, 2) entanglement entropy: {}", s);
    Ok(())
}
