//! Chain-length statistics.
//!
//! A well-behaved hash keeps chain lengths clustered around the ideal
//! average, `live entries / buckets`.

use crate::hash_table::HashTable;
use crate::key::TableKey;
use crate::LOG_TARGET;
use core::fmt;
use tracing::info;

/// Chains of this length or longer are counted together as overflow.
pub const MAX_CHAIN_LEN: usize = 32;

#[derive(Clone, Debug, PartialEq)]
pub struct TableStats {
    pub name: String,
    pub bucket_count: usize,
    pub max_entries: usize,
    pub live_entries: usize,
    pub growth_increment: usize,
    /// `chain_lengths[n]` buckets have exactly `n` entries.
    pub chain_lengths: [usize; MAX_CHAIN_LEN],
    /// Buckets with `MAX_CHAIN_LEN` entries or more.
    pub overflow_chains: usize,
    pub longest_chain: usize,
    pub ideal_chain_len: f64,
}

impl TableStats {
    pub fn empty_buckets(&self) -> usize {
        self.chain_lengths[0]
    }
}

impl fmt::Display for TableStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TABLE \"{}\"", self.name)?;
        writeln!(
            f,
            "BUCKETS: {}, MAX_ENTRIES {}, CUR_ENTRIES {}, INCREMENT {}",
            self.bucket_count, self.max_entries, self.live_entries, self.growth_increment
        )?;
        writeln!(f, "CHAIN  CHAIN")?;
        writeln!(f, "LENGTH COUNT")?;
        for (len, &count) in self.chain_lengths.iter().enumerate() {
            if count != 0 {
                writeln!(f, "{len:6}: {count}")?;
            }
        }
        writeln!(f, "Ideal average chain length: {:7.2}", self.ideal_chain_len)?;
        writeln!(f, "Longest chain {}", self.longest_chain)?;
        writeln!(f, "CHAINS OVER {}: {}", MAX_CHAIN_LEN, self.overflow_chains)?;
        write!(f, "EMPTY BUCKETS: {}", self.empty_buckets())
    }
}

impl<K, V> HashTable<K, V>
where
    K: TableKey,
{
    /// Walk every bucket and summarize chain lengths. Read-only.
    pub fn stats(&self) -> TableStats {
        let mut chain_lengths = [0; MAX_CHAIN_LEN];
        let mut overflow_chains = 0;
        let mut longest_chain = 0;
        for bucket in 0..self.bucket_count() {
            let len = self.chain_len(bucket);
            longest_chain = longest_chain.max(len);
            match chain_lengths.get_mut(len) {
                Some(count) => *count += 1,
                None => overflow_chains += 1,
            }
        }
        TableStats {
            name: self.name().to_owned(),
            bucket_count: self.bucket_count(),
            max_entries: self.max_entries(),
            live_entries: self.len(),
            growth_increment: self.growth_increment(),
            chain_lengths,
            overflow_chains,
            longest_chain,
            ideal_chain_len: self.len() as f64 / self.bucket_count() as f64,
        }
    }

    /// Emit the statistics report, one log line per report line.
    pub fn print_stats(&self) {
        let report = self.stats().to_string();
        for line in report.lines() {
            info!(target: LOG_TARGET, table = self.name(), "{line}");
        }
    }
}
