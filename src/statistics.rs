//! Bucket distribution and footprint statistics.

use crate::block_arena::BlockArena;
use crate::entry::Bucket;
use crate::hashtable::Hashtable;
use core::fmt;
use std::time::Instant;

/// Running summary of a sequence of samples.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Summary {
    num: usize,
    sum: f64,
    sum_of_squares: f64,
    minimum: f64,
    maximum: f64,
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: f64) {
        if self.num == 0 {
            self.minimum = value;
            self.maximum = value;
        } else {
            self.minimum = self.minimum.min(value);
            self.maximum = self.maximum.max(value);
        }
        self.num += 1;
        self.sum += value;
        self.sum_of_squares += value * value;
    }

    pub fn num(&self) -> usize {
        self.num
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn avg(&self) -> f64 {
        if self.num == 0 {
            0.0
        } else {
            self.sum / self.num as f64
        }
    }

    /// Population variance, `E[x^2] - E[x]^2`, clamped at zero against
    /// rounding.
    pub fn variance(&self) -> f64 {
        if self.num == 0 {
            return 0.0;
        }
        let avg = self.avg();
        (self.sum_of_squares / self.num as f64 - avg * avg).max(0.0)
    }

    pub fn sd(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn minimum(&self) -> f64 {
        self.minimum
    }

    pub fn maximum(&self) -> f64 {
        self.maximum
    }
}

/// Counts of entries added to and freed from a table since it was created.
#[derive(Copy, Clone, Debug)]
pub struct TableRateStatistics {
    added: u64,
    removed: u64,
    since: Instant,
}

impl TableRateStatistics {
    pub fn new() -> Self {
        Self {
            added: 0,
            removed: 0,
            since: Instant::now(),
        }
    }

    #[inline]
    pub fn add(&mut self) {
        self.added += 1;
    }

    #[inline]
    pub fn remove(&mut self) {
        self.removed += 1;
    }

    pub fn added(&self) -> u64 {
        self.added
    }

    pub fn removed(&self) -> u64 {
        self.removed
    }

    /// Adds and removes per second over the table's lifetime so far.
    pub fn rates(&self) -> (f64, f64) {
        let secs = self.since.elapsed().as_secs_f64();
        if secs <= 0.0 {
            return (0.0, 0.0);
        }
        (self.added as f64 / secs, self.removed as f64 / secs)
    }
}

impl Default for TableRateStatistics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time snapshot produced by `Hashtable::statistics_calculate`.
#[derive(Clone, Debug, PartialEq)]
pub struct TableStatistics {
    /// Chain lengths, one sample per bucket.
    pub summary: Summary,
    pub literal_bytes: usize,
    pub number_of_buckets: usize,
    pub number_of_entries: usize,
    pub bucket_size: usize,
    pub bucket_bytes: usize,
    pub entry_size: usize,
    pub entry_bytes: usize,
    pub total_footprint: usize,
    pub added_items: u64,
    pub removed_items: u64,
    pub add_rate: f64,
    pub remove_rate: f64,
}

impl TableStatistics {
    fn new(
        summary: Summary,
        literal_bytes: usize,
        rate: &TableRateStatistics,
        bucket_size: usize,
        entry_size: usize,
    ) -> Self {
        let number_of_buckets = summary.num();
        let number_of_entries = summary.sum() as usize;
        let bucket_bytes = number_of_buckets * bucket_size;
        let entry_bytes = number_of_entries * entry_size;
        let (add_rate, remove_rate) = rate.rates();
        Self {
            summary,
            literal_bytes,
            number_of_buckets,
            number_of_entries,
            bucket_size,
            bucket_bytes,
            entry_size,
            entry_bytes,
            total_footprint: literal_bytes + bucket_bytes + entry_bytes,
            added_items: rate.added(),
            removed_items: rate.removed(),
            add_rate,
            remove_rate,
        }
    }

    /// Writes the summary under a `"<table_name> statistics:"` heading.
    pub fn print<W: fmt::Write>(&self, sink: &mut W, table_name: &str) -> fmt::Result {
        writeln!(sink, "{table_name} statistics:")?;
        write!(sink, "{self}")
    }
}

impl fmt::Display for TableStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Number of buckets       : {:9} = {:9} bytes, each {}",
            self.number_of_buckets, self.bucket_bytes, self.bucket_size
        )?;
        writeln!(
            f,
            "Number of entries       : {:9} = {:9} bytes, each {}",
            self.number_of_entries, self.entry_bytes, self.entry_size
        )?;
        if self.literal_bytes != 0 {
            let avg = if self.number_of_entries == 0 {
                0.0
            } else {
                self.literal_bytes as f64 / self.number_of_entries as f64
            };
            writeln!(
                f,
                "Number of literals      : {:9} = {:9} bytes, avg {:7.3}",
                self.number_of_entries, self.literal_bytes, avg
            )?;
        }
        writeln!(
            f,
            "Total footprint         : {:9} = {:9} bytes",
            "", self.total_footprint
        )?;
        writeln!(f, "Average bucket size     : {:9.3}", self.summary.avg())?;
        writeln!(f, "Variance of bucket size : {:9.3}", self.summary.variance())?;
        writeln!(f, "Std. dev. of bucket size: {:9.3}", self.summary.sd())?;
        writeln!(f, "Maximum bucket size     : {:9}", self.summary.maximum() as usize)?;
        if self.added_items != 0 || self.removed_items != 0 {
            writeln!(
                f,
                "Entries added/removed   : {:9} / {:9}",
                self.added_items, self.removed_items
            )?;
            writeln!(
                f,
                "Add/remove rate         : {:9.3} / {:9.3} per second",
                self.add_rate, self.remove_rate
            )?;
        }
        Ok(())
    }
}

impl<T> Hashtable<T> {
    /// Walks every chain once, sampling its length and summing
    /// `literal_size` over the literals it holds.
    pub fn statistics_calculate<F>(&self, mut literal_size: F) -> TableStatistics
    where
        F: FnMut(&T) -> usize,
    {
        let mut summary = Summary::new();
        let mut literal_bytes = 0;
        for i in 0..self.table_size() {
            let mut count = 0usize;
            for (_, e) in self.chain(i) {
                count += 1;
                literal_bytes += literal_size(e.literal());
            }
            summary.add(count as f64);
        }
        TableStatistics::new(
            summary,
            literal_bytes,
            &self.rate,
            core::mem::size_of::<Bucket>(),
            BlockArena::<T>::entry_size(),
        )
    }

    /// Footprint and chain-length summary for `table_name`, written to `sink`.
    pub fn print_table_statistics<W, F>(
        &self,
        sink: &mut W,
        table_name: &str,
        literal_size: F,
    ) -> fmt::Result
    where
        W: fmt::Write,
        F: FnMut(&T) -> usize,
    {
        self.statistics_calculate(literal_size).print(sink, table_name)
    }
}
