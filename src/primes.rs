// MIT License - Copyright (c) 2026 hekit authors

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::home_dir;
use crate::error::{KitError, Result};

/// Largest prime stored in the default table.
pub const DEFAULT_PRIME_LIMIT: u64 = 180_000;

/// Primes in `[start, stop]` inclusive, by sieve of Eratosthenes.
pub fn gen_primes(start: u64, stop: u64) -> Vec<u64> {
    if stop < 2 || start > stop {
        return Vec::new();
    }
    let stop_idx = stop as usize;
    let mut is_composite = vec![false; stop_idx + 1];
    let mut primes = Vec::new();
    for n in 2..=stop_idx {
        if !is_composite[n] {
            if n as u64 >= start {
                primes.push(n as u64);
            }
            let mut multiple = n * n;
            while multiple <= stop_idx {
                is_composite[multiple] = true;
                multiple += n;
            }
        }
    }
    primes
}

/// Sorted prime factorization with multiplicity, by trial division.
///
/// Returns an empty list for 0 and 1.
pub fn prime_factors(mut n: u64) -> Vec<u64> {
    let mut factors = Vec::new();
    if n < 2 {
        return factors;
    }
    while n % 2 == 0 {
        factors.push(2);
        n /= 2;
    }
    let mut p: u64 = 3;
    while p.saturating_mul(p) <= n {
        while n % p == 0 {
            factors.push(p);
            n /= p;
        }
        p += 2;
    }
    if n > 1 {
        factors.push(n);
    }
    factors
}

/// Primes loaded from a text file, one per line.
///
/// Primality queries are only valid up to the largest prime in the table.
#[derive(Debug, Clone)]
pub struct PrimeTable {
    primes: Vec<u64>,
    max: u64,
}

impl PrimeTable {
    /// Load a prime table from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let mut primes = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let p: u64 = line.parse().map_err(|_| KitError::PrimeTableParse {
                path: path.display().to_string(),
                line: line.to_string(),
            })?;
            primes.push(p);
        }
        primes.sort_unstable();
        primes.dedup();
        let max = primes.last().copied().unwrap_or(0);
        Ok(Self { primes, max })
    }

    /// Load the table at `path`, generating it up to
    /// [`DEFAULT_PRIME_LIMIT`] first if the file does not exist.
    pub fn ensure_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("Generating prime table at {}", path.display());
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut file = fs::File::create(path)?;
            for p in gen_primes(2, DEFAULT_PRIME_LIMIT) {
                writeln!(file, "{p}")?;
            }
        }
        Self::load(path)
    }

    /// Default table location, `~/.hekit/primes.txt`.
    pub fn default_path() -> Result<PathBuf> {
        Ok(home_dir()?.join(".hekit").join("primes.txt"))
    }

    /// Whether `n` is prime. Errors for numbers above the table maximum.
    pub fn is_prime(&self, n: u64) -> Result<bool> {
        if n > self.max {
            return Err(KitError::PrimeTableExceeded { max: self.max });
        }
        Ok(self.primes.binary_search(&n).is_ok())
    }

    /// Largest prime in the table.
    pub fn max(&self) -> u64 {
        self.max
    }

    /// All primes in the table, ascending.
    pub fn primes(&self) -> &[u64] {
        &self.primes
    }
}

/// Factorize `n` by dividing out table primes first, finishing any
/// remainder by trial division.
///
/// `m_max` caps the table primes tried, which skips pointless divisions
/// when the caller will discard factor products above that bound anyway.
/// The result is always the full factorization of `n`, sorted with
/// multiplicity.
pub fn prime_factors_with_table(
    n: u64,
    table: &PrimeTable,
    m_max: Option<u64>,
) -> Vec<u64> {
    if n < 2 {
        return Vec::new();
    }
    let mut rem = n;
    let mut factors = Vec::new();
    for &p in table.primes() {
        if let Some(bound) = m_max {
            if p > bound {
                break;
            }
        }
        if p > rem {
            break;
        }
        while rem % p == 0 {
            factors.push(p);
            rem /= p;
        }
    }
    if rem > 1 {
        debug!("Table did not cover {rem}, finishing by trial division");
        factors.extend(prime_factors(rem));
    }
    factors.sort_unstable();
    factors
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_gen_primes_small() {
        assert_eq!(gen_primes(2, 13), vec![2, 3, 5, 7, 11, 13]);
        assert_eq!(gen_primes(14, 16), Vec::<u64>::new());
        assert_eq!(gen_primes(10, 20), vec![11, 13, 17, 19]);
    }

    #[test]
    fn test_gen_primes_empty_ranges() {
        assert_eq!(gen_primes(5, 4), Vec::<u64>::new());
        assert_eq!(gen_primes(0, 1), Vec::<u64>::new());
    }

    #[test]
    fn test_prime_factors() {
        assert_eq!(prime_factors(360), vec![2, 2, 2, 3, 3, 5]);
        assert_eq!(prime_factors(97), vec![97]);
        assert_eq!(prime_factors(1), Vec::<u64>::new());
        assert_eq!(prime_factors(0), Vec::<u64>::new());
        // 2^4 - 1
        assert_eq!(prime_factors(15), vec![3, 5]);
    }

    fn table_from(primes: &[u64]) -> PrimeTable {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for p in primes {
            writeln!(file, "{p}").unwrap();
        }
        PrimeTable::load(file.path()).unwrap()
    }

    #[test]
    fn test_prime_table_load_and_query() {
        let table = table_from(&[2, 3, 5, 7, 11, 13]);
        assert_eq!(table.max(), 13);
        assert!(table.is_prime(7).unwrap());
        assert!(!table.is_prime(9).unwrap());
        assert!(matches!(
            table.is_prime(14),
            Err(KitError::PrimeTableExceeded { max: 13 })
        ));
    }

    #[test]
    fn test_prime_table_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "2\nthree\n5").unwrap();
        assert!(matches!(
            PrimeTable::load(file.path()),
            Err(KitError::PrimeTableParse { .. })
        ));
    }

    #[test]
    fn test_ensure_default_creates_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("primes.txt");
        let table = PrimeTable::ensure_default(&path).unwrap();
        assert!(path.exists());
        assert!(table.is_prime(2).unwrap());
        assert!(table.is_prime(179_999).unwrap());
        assert_eq!(table.max(), 179_999);
    }

    #[test]
    fn test_table_factorization_matches_trial_division() {
        let table = table_from(&gen_primes(2, 100));
        for n in [2u64, 15, 360, 1023, 65_535, 97 * 101] {
            assert_eq!(prime_factors_with_table(n, &table, None), prime_factors(n));
        }
    }

    #[test]
    fn test_table_factorization_with_bound() {
        let table = table_from(&gen_primes(2, 100));
        // Bound only limits which table primes are tried; the result is
        // still the full factorization.
        assert_eq!(prime_factors_with_table(15, &table, Some(3)), vec![3, 5]);
    }
}
