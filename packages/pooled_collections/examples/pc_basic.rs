//! Basic usage of the `pooled_collections` crate:
//!
//! * Building a vector on a dedicated pool.
//! * Growing, inserting and removing elements.
//! * Freezing the vector into a fixed-length array.
//! * Observing buffer reuse through the pool statistics.

use pooled_collections::{BucketedPool, Error, PooledVec};

fn main() -> Result<(), Error> {
    let pool = BucketedPool::<String>::new();

    for round in 0..3 {
        let mut names = PooledVec::with_capacity_in(4, &pool)?;

        names.append("Alice".to_string())?;
        names.append("Charlie".to_string())?;
        names.insert(1, "Bob".to_string())?;

        // Appending past the capacity rents a larger buffer and returns the old one.
        names.append_range((0..20).map(|n| format!("Guest {n}")))?;

        names.remove(&"Charlie".to_string())?;

        println!(
            "Round {round}: {} names, capacity {}",
            names.len(),
            names.capacity()?
        );

        // The array keeps using the same buffer, so no copy is made.
        let names = names.into_array();
        println!("First name: {}", names.get(0)?);

        // Dropping the array returns its buffer to the pool for the next round.
    }

    println!(
        "Pool rented {} buffers and got {} back, {} are idle",
        pool.rent_count(),
        pool.return_count(),
        pool.idle_count()
    );

    Ok(())
}
