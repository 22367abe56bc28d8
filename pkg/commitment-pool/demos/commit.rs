//! Commit a few random deposits and print the resulting records
//!
//! Set `RUST_LOG=debug` to see tree events, and `POOL_SNAPSHOT_PATH` to persist the pool between
//! runs.

use commitment_pool::{CommitmentPool, PoolConfig, ProofVerifier, VerifierError};
use rand::SeedableRng;
use rand_chacha::ChaChaRng;
use tracing_subscriber::EnvFilter;
use zk_primitives::Element;

/// Accepts any non-empty proof
struct NonEmpty;

impl ProofVerifier for NonEmpty {
    fn verify(&self, proof: &[u8], _: &[Element]) -> Result<bool, VerifierError> {
        Ok(!proof.is_empty())
    }
}

fn main() -> Result<(), commitment_pool::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = PoolConfig::from_env()?;
    let mut pool = CommitmentPool::<imt::SimpleHashCache>::open(&config)?;
    pool.set_verifier(NonEmpty);

    let mut rng = ChaChaRng::from_entropy();

    for amount in 1..=3 {
        if pool.registry().tree().remaining_capacity() < 2 {
            println!("the tree is full, remove the snapshot to start a new pool");
            break;
        }

        let inputs = [
            Element::new(0xdead),
            Element::new(amount),
            Element::secure_random(&mut rng),
            Element::secure_random(&mut rng),
            Element::secure_random(&mut rng),
            Element::secure_random(&mut rng),
            Element::secure_random(&mut rng),
        ];

        let record = pool.commit_entry(b"proof", &inputs, Element::new(amount))?;
        println!("{}", serde_json::to_string_pretty(&record).unwrap_or_default());
    }

    if let Some(path) = &config.snapshot_path {
        pool.save(path)?;
    }

    Ok(())
}
