use anyhow::Result;
use clap::{Parser, Subcommand};
use fingerprint::SimilarityDigest;
use geo::Geohash;
use log::info;
use sketch::{BloomFilter, Nilsimsa, Simhash};

#[derive(Parser, Debug)]
#[command(version, about = "Fingerprint toolkit demo", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a coordinate pair and report the cell center it decodes to.
    Geohash {
        latitude: f64,
        longitude: f64,
        #[arg(short, long, default_value_t = 12)]
        precision: usize,
    },
    /// Compare two strings with Simhash and Nilsimsa digests.
    Similarity { left: String, right: String },
    /// Build a Bloom filter over items and query it.
    Bloom {
        /// Items to insert.
        items: Vec<String>,
        #[arg(short, long)]
        query: String,
        #[arg(short, long, default_value_t = 3000)]
        capacity: usize,
        #[arg(short, long, default_value_t = 0.01)]
        rate: f64,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    match args.command {
        Command::Geohash {
            latitude,
            longitude,
            precision,
        } => {
            let hash = Geohash::encode(latitude, longitude, precision)?;
            let cell = Geohash::from_code(hash.code())?;
            info!(
                "cell center ({}, {}), {:.3} km from the input",
                cell.latitude(),
                cell.longitude(),
                hash.distance_in_km(&cell)
            );
            println!("{}", hash.code());
        }
        Command::Similarity { left, right } => {
            let simhash_left = Simhash::new(left.split_whitespace());
            let simhash_right = Simhash::new(right.split_whitespace());
            println!("simhash:  {:.4}", simhash_left.similarity(&simhash_right)?);

            let nilsimsa_left = Nilsimsa::from_bytes(left.as_bytes());
            let nilsimsa_right = Nilsimsa::from_bytes(right.as_bytes());
            println!("nilsimsa: {:.4}", nilsimsa_left.similarity(&nilsimsa_right)?);
        }
        Command::Bloom {
            items,
            query,
            capacity,
            rate,
        } => {
            let filter =
                BloomFilter::with_items(items.iter().map(|item| item.as_bytes()), capacity, rate)?;
            info!(
                "{} bits, {} hash functions over {} items",
                filter.num_bits(),
                filter.num_hashes(),
                items.len()
            );
            println!(
                "{}",
                if filter.contains(query.as_bytes()) {
                    "maybe present"
                } else {
                    "definitely absent"
                }
            );
        }
    }
    Ok(())
}
