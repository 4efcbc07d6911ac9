//! Largest-remainder apportionment.
//!
//! Distributes a fixed number of draws across classes in proportion to
//! their populations so that the integer allocations sum exactly to the
//! requested total.
//!
//! # Example
//!
//! ```
//! use molsplit::apportion::apportion;
//!
//! let counts = apportion(&[5, 3, 2], 4).unwrap();
//! assert_eq!(counts.iter().sum::<usize>(), 4);
//! assert_eq!(counts, vec![2, 1, 1]);
//! ```

use crate::error::{Error, Result};

/// Splits `n_draws` across classes proportionally to `class_counts`.
///
/// Each class first receives the floor of its exact share
/// `class_counts[i] * n_draws / total`. The units still missing are handed
/// out one each to the classes with the largest fractional remainders.
/// Equal remainders keep their original class order, so the lower class
/// index wins the tie.
///
/// Shares are computed with integer quotient and remainder, so the ranking
/// is exact. Every entry is at most its class count and differs from the
/// exact share by less than one.
///
/// # Errors
///
/// Returns [`Error::Precondition`] if `n_draws` exceeds the total
/// population.
pub fn apportion(class_counts: &[usize], n_draws: usize) -> Result<Vec<usize>> {
    let total: usize = class_counts.iter().sum();
    if n_draws > total {
        return Err(Error::precondition(format!(
            "cannot draw {n_draws} samples from a population of {total}"
        )));
    }
    if n_draws == 0 {
        return Ok(vec![0; class_counts.len()]);
    }

    let total_wide = total as u128;
    let draws_wide = n_draws as u128;

    let mut allocation = Vec::with_capacity(class_counts.len());
    let mut remainders = Vec::with_capacity(class_counts.len());
    for &count in class_counts {
        let scaled = count as u128 * draws_wide;
        // floor(share) <= count because n_draws <= total
        allocation.push((scaled / total_wide) as usize);
        remainders.push(scaled % total_wide);
    }

    let floored: usize = allocation.iter().sum();
    let shortfall = n_draws - floored;

    let mut order: Vec<usize> = (0..class_counts.len()).collect();
    // sort_by is stable: equal remainders keep ascending class order
    order.sort_by(|&a, &b| remainders[b].cmp(&remainders[a]));
    for &class in order.iter().take(shortfall) {
        allocation[class] += 1;
    }

    let assigned: usize = allocation.iter().sum();
    if assigned != n_draws {
        return Err(Error::internal(format!(
            "apportionment assigned {assigned} draws, expected {n_draws}"
        )));
    }

    Ok(allocation)
}
