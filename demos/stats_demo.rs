use std::collections::hash_map::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;

use clap::Parser;
use open_hash_set::HashTable;
use open_hash_set::hash_table::Entry;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "capacity", default_value_t = 1024)]
    capacity: usize,

    #[arg(short = 'l', long = "load_factor", default_value_t = 0.75)]
    load_factor: f32,

    /// Percentage of the inserted values to remove again before reporting.
    #[arg(short = 'r', long = "remove_percent", default_value_t = 0)]
    remove_percent: u64,
}

fn hash_u64(value: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn main() {
    let args = Args::parse();

    println!(
        "Creating HashTable with capacity {} and load factor {}",
        args.capacity, args.load_factor
    );

    let mut table: HashTable<u64> =
        HashTable::with_capacity_and_load_factor(args.capacity, args.load_factor);

    println!(
        "Actual capacity: {} slots, grows at {} elements",
        table.capacity(),
        table.growth_threshold()
    );
    println!("Filling table up to its growth threshold...");

    let num_values = table.growth_threshold().saturating_sub(1) as u64;
    for value in 0..num_values {
        match table.entry(hash_u64(value), |&v| v == value, |&v| hash_u64(v)) {
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
            Entry::Occupied(_) => {
                panic!("Value already exists in table: {}", value);
            }
        }
    }

    let mut removed = 0;
    for value in (0..num_values).filter(|v| v % 100 < args.remove_percent) {
        if table
            .remove(hash_u64(value), |&v| v == value, |&v| hash_u64(v))
            .is_some()
        {
            removed += 1;
        }
    }

    println!(
        "Inserted {} values, removed {}, {} remain",
        num_values,
        removed,
        table.len()
    );
    println!(
        "Final occupancy: {:.2}%",
        (table.len() as f64 / table.capacity() as f64) * 100.0
    );

    table.probe_histogram(|&v| hash_u64(v)).print();
    table.debug_stats(|&v| hash_u64(v)).print();
}
