//! Times bulk insertion of random keys into an ordered set and checks the
//! resulting iteration order against a sorted, deduplicated copy of the input.

mod logger;

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use anyhow::bail;
use avlset::AvlSet;
use clap::{ArgAction, Parser, ValueEnum};
use log::{debug, info, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Default seed of the standard Mersenne Twister.
const DEFAULT_SEED: u64 = 5489;

#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Number of random keys to insert
    num_elements: usize,
    /// Seed for the key generator
    #[arg(long, env = "AVL_BENCH_SEED", default_value_t = DEFAULT_SEED)]
    seed: u64,
    /// Set implementation to measure
    #[arg(long, value_enum, default_value_t = SetKind::Avl)]
    set: SetKind,
    /// Accept inputs that contain the same key more than once
    #[arg(long)]
    allow_duplicates: bool,
    /// Enables verbose logging
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SetKind {
    Avl,
    Btree,
}

/// The slice of set behaviour the measurement needs.
trait KeySet: Default {
    fn insert_key(&mut self, key: u64);
    fn keys(&self) -> Box<dyn Iterator<Item = u64> + '_>;
}

impl KeySet for AvlSet<u64> {
    fn insert_key(&mut self, key: u64) {
        self.insert(key);
    }

    fn keys(&self) -> Box<dyn Iterator<Item = u64> + '_> {
        Box::new(self.iter().copied())
    }
}

impl KeySet for BTreeSet<u64> {
    fn insert_key(&mut self, key: u64) {
        self.insert(key);
    }

    fn keys(&self) -> Box<dyn Iterator<Item = u64> + '_> {
        Box::new(self.iter().copied())
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init(args.verbose);

    debug!("generating {} keys with seed {}", args.num_elements, args.seed);
    let input = generate(args.num_elements, args.seed);

    let elapsed = match args.set {
        SetKind::Avl => measure::<AvlSet<u64>>(&input, args.allow_duplicates)?,
        SetKind::Btree => measure::<BTreeSet<u64>>(&input, args.allow_duplicates)?,
    };
    info!("{:?} set verified against sorted input", args.set);

    println!("{}ms", elapsed.as_nanos() as f64 / 1_000_000.0);
    Ok(())
}

fn generate(num_elements: usize, seed: u64) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..num_elements).map(|_| rng.gen()).collect()
}

/// Inserts `input` into a fresh set, returning the time spent inserting once
/// the set's contents have been verified.
fn measure<S: KeySet>(input: &[u64], allow_duplicates: bool) -> anyhow::Result<Duration> {
    let start = Instant::now();
    let mut set = S::default();
    for &key in input {
        set.insert_key(key);
    }
    let elapsed = start.elapsed();
    debug!("inserted {} keys in {:?}", input.len(), elapsed);

    let mut reference = input.to_vec();
    reference.sort_unstable();
    reference.dedup();
    if reference.len() != input.len() {
        let repeats = input.len() - reference.len();
        if !allow_duplicates {
            bail!("dup detected: {repeats} of {} keys are repeats", input.len());
        }
        warn!("input contains {repeats} repeated keys");
    }

    if let Some(position) = first_mismatch(set.keys(), &reference) {
        bail!("set failure: iteration diverges from sorted input at position {position}");
    }

    Ok(elapsed)
}

/// Position of the first element where `keys` differs from `expected`,
/// including one running out before the other.
fn first_mismatch(mut keys: impl Iterator<Item = u64>, expected: &[u64]) -> Option<usize> {
    for (position, expected) in expected.iter().enumerate() {
        match keys.next() {
            Some(key) if key == *expected => {}
            _ => return Some(position),
        }
    }
    keys.next().map(|_| expected.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_positions() {
        assert_eq!(first_mismatch([1, 2, 3].into_iter(), &[1, 2, 3]), None);
        assert_eq!(first_mismatch([1, 5, 3].into_iter(), &[1, 2, 3]), Some(1));
        assert_eq!(first_mismatch([1, 2].into_iter(), &[1, 2, 3]), Some(2));
        assert_eq!(first_mismatch([1, 2, 3, 4].into_iter(), &[1, 2, 3]), Some(3));
    }

    #[test]
    fn avl_matches_reference() {
        let input = generate(10_000, DEFAULT_SEED);
        assert!(measure::<AvlSet<u64>>(&input, false).is_ok());
        assert!(measure::<BTreeSet<u64>>(&input, false).is_ok());
    }

    #[test]
    fn duplicates_need_opt_in() {
        let input = vec![3, 1, 3, 2];
        let err = measure::<AvlSet<u64>>(&input, false).unwrap_err();
        assert!(err.to_string().starts_with("dup detected"));
        assert!(measure::<AvlSet<u64>>(&input, true).is_ok());
    }

    #[test]
    fn parses_arguments() {
        let args = Args::try_parse_from(["avl-bench", "100", "--set", "btree", "-vv"]).unwrap();
        assert_eq!(args.num_elements, 100);
        assert_eq!(args.set, SetKind::Btree);
        assert_eq!(args.verbose, 2);
        assert!(!args.allow_duplicates);
    }
}
