// MIT License - Copyright (c) 2026 hekit authors
//
// Searches for HE algebras ZZ_p[x]/Phi_m(x): given plaintext primes p and
// slot degrees d, every divisor m of p^d - 1 gives an algebra where p has
// multiplicative order dividing d modulo m.

use std::collections::{HashMap, HashSet};

use crate::error::{KitError, Result};

/// One algebra solution `(p, d, m)` with its derived quantities.
///
/// `d` is the true multiplicative order of `p` modulo `m`, which can be
/// smaller than the degree the search started from; `corrected` marks
/// those solutions. `nslots = phi(m) / d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Algebra {
    pub p: u64,
    pub d: u64,
    pub m: u64,
    pub phi_m: u64,
    pub nslots: u64,
    pub corrected: bool,
}

/// All non-empty subsets of `items`.
///
/// Callers pass prime factor multisets, so duplicate subsets can occur;
/// deduplication happens on the resulting solutions.
///
/// # Panics
///
/// Panics if `items` has 64 or more elements. Prime factor multisets of
/// `u64` values never do (2^63 has the most factors, 63 of them).
pub fn powerset<T: Copy>(items: &[T]) -> Vec<Vec<T>> {
    assert!(items.len() < 64, "powerset input too large");
    let mut subsets = Vec::new();
    for mask in 1u64..(1u64 << items.len()) {
        let subset: Vec<T> = items
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, &item)| item)
            .collect();
        subsets.push(subset);
    }
    subsets
}

/// Euler's totient from a prime factor multiset.
pub fn phi(prime_factors: &[u64]) -> u64 {
    let mut counts: HashMap<u64, u32> = HashMap::new();
    for &p in prime_factors {
        *counts.entry(p).or_insert(0) += 1;
    }
    counts
        .iter()
        .map(|(&p, &k)| (p - 1) * p.pow(k - 1))
        .product()
}

fn mod_pow(base: u64, exp: u64, modulus: u64) -> u64 {
    let modulus = modulus as u128;
    let mut result: u128 = 1 % modulus;
    let mut base = base as u128 % modulus;
    let mut exp = exp;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result * base % modulus;
        }
        base = base * base % modulus;
        exp >>= 1;
    }
    result as u64
}

/// Minimum `e <= d` with `p^e = 1 (mod m)`, and whether it differs from
/// `d`. Starting from `p^d` can overstate the order, since any divisor of
/// `d` may already satisfy the congruence.
pub fn correct_for_d(p: u64, d: u64, m: u64) -> (u64, bool) {
    for e in 1..=d {
        if mod_pow(p, e, m) == 1 {
            return (e, e != d);
        }
    }
    (d, false)
}

/// Find all algebras for the given primes and degrees.
///
/// For each `(p, d)`, `p^d - 1` is factorized with `factorize` and every
/// subset product `m` (capped by `m_max` when given) is a candidate. The
/// order is corrected per candidate and duplicate `(p, d, m)` solutions
/// are dropped, keeping the first found. Entries with `p < 2` or `d == 0`
/// have no algebras and are skipped.
pub fn find_algebras<F>(
    ps: &[u64],
    ds: &[u64],
    m_max: Option<u64>,
    mut factorize: F,
) -> Result<Vec<Algebra>>
where
    F: FnMut(u64) -> Vec<u64>,
{
    let mut seen = HashSet::new();
    let mut algebras = Vec::new();

    for &p in ps {
        if p < 2 {
            continue;
        }
        for &d in ds {
            if d == 0 {
                continue;
            }
            let power = (p as u128)
                .checked_pow(u32::try_from(d).map_err(|_| KitError::PowerOverflow { p, d })?)
                .ok_or(KitError::PowerOverflow { p, d })?;
            let n = power - 1;
            if n > u64::MAX as u128 {
                return Err(KitError::PowerOverflow { p, d });
            }
            let n = n as u64;
            if n < 2 {
                continue;
            }

            let factors = factorize(n);
            for subset in powerset(&factors) {
                let m = subset.iter().try_fold(1u64, |acc, &f| acc.checked_mul(f));
                let m = match m {
                    Some(m) => m,
                    None => continue,
                };
                if m_max.is_some_and(|bound| m > bound) {
                    continue;
                }
                let (e, corrected) = correct_for_d(p, d, m);
                if seen.insert((p, e, m)) {
                    let phi_m = phi(&subset);
                    algebras.push(Algebra {
                        p,
                        d: e,
                        m,
                        phi_m,
                        nslots: phi_m / e,
                        corrected,
                    });
                }
            }
        }
    }

    Ok(algebras)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primes::prime_factors;

    #[test]
    fn test_powerset_counts() {
        assert_eq!(powerset(&[3u64, 5]).len(), 3);
        assert_eq!(powerset(&[2u64, 3, 5]).len(), 7);
        assert!(powerset::<u64>(&[]).is_empty());
    }

    #[test]
    fn test_phi() {
        assert_eq!(phi(&[3, 5]), 8); // phi(15)
        assert_eq!(phi(&[2, 2, 2]), 4); // phi(8)
        assert_eq!(phi(&[7]), 6);
        assert_eq!(phi(&[]), 1);
    }

    #[test]
    fn test_correct_for_d() {
        // ord_15(2) = 4
        assert_eq!(correct_for_d(2, 4, 15), (4, false));
        // ord_3(2) = 2, so starting from d=4 gets corrected
        assert_eq!(correct_for_d(2, 4, 3), (2, true));
        // ord_5(2) = 4
        assert_eq!(correct_for_d(2, 4, 5), (4, false));
    }

    #[test]
    fn test_find_algebras_p2_d4() {
        // 2^4 - 1 = 15 = 3 * 5, so m in {3, 5, 15}
        let algebras = find_algebras(&[2], &[4], None, prime_factors).unwrap();
        assert_eq!(algebras.len(), 3);

        let m15 = algebras.iter().find(|a| a.m == 15).unwrap();
        assert_eq!(m15.d, 4);
        assert_eq!(m15.phi_m, 8);
        assert_eq!(m15.nslots, 2);
        assert!(!m15.corrected);

        let m3 = algebras.iter().find(|a| a.m == 3).unwrap();
        assert_eq!(m3.d, 2);
        assert!(m3.corrected);
    }

    #[test]
    fn test_find_algebras_m_max() {
        let algebras = find_algebras(&[2], &[4], Some(5), prime_factors).unwrap();
        assert!(algebras.iter().all(|a| a.m <= 5));
        assert_eq!(algebras.len(), 2);
    }

    #[test]
    fn test_find_algebras_dedupes_solutions() {
        // d=2 and d=4 both produce m=3 with order 2; only one survives.
        let algebras = find_algebras(&[2], &[2, 4], None, prime_factors).unwrap();
        let m3_count = algebras.iter().filter(|a| a.m == 3).count();
        assert_eq!(m3_count, 1);
    }

    #[test]
    fn test_find_algebras_skips_degenerate() {
        // 2^1 - 1 = 1 has no factors, d=0 is skipped outright
        let algebras = find_algebras(&[2], &[0, 1], None, prime_factors).unwrap();
        assert!(algebras.is_empty());
    }

    #[test]
    fn test_find_algebras_skips_p_below_two() {
        let algebras = find_algebras(&[0, 1], &[1, 4], None, prime_factors).unwrap();
        assert!(algebras.is_empty());

        // Degenerate entries do not poison valid ones alongside them.
        let algebras = find_algebras(&[0, 2], &[4], None, prime_factors).unwrap();
        assert_eq!(algebras.len(), 3);
    }

    #[test]
    fn test_find_algebras_overflow() {
        let result = find_algebras(&[2], &[128], None, prime_factors);
        assert!(matches!(result, Err(KitError::PowerOverflow { p: 2, d: 128 })));
    }
}
