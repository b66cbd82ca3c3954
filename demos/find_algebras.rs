//! Example: search HE algebras for small plaintext primes.
//!
//! Run with `cargo run --example find_algebras`.

use hekit::{find_algebras, prime_factors};

fn main() -> anyhow::Result<()> {
    let ps = [2, 3, 5];
    let ds: Vec<u64> = (1..=8).collect();

    let algebras = find_algebras(&ps, &ds, Some(10_000), prime_factors)?;

    println!("{:>6} {:>4} {:>8} {:>8} {:>8}", "p", "d", "m", "phim", "nslots");
    for a in &algebras {
        println!(
            "{:>6} {:>4} {:>8} {:>8} {:>8}{}",
            a.p,
            a.d,
            a.m,
            a.phi_m,
            a.nslots,
            if a.corrected { "  (corrected)" } else { "" }
        );
    }
    Ok(())
}
