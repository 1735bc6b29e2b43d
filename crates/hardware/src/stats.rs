//! Cache statistics collection and reporting.
//!
//! This module tracks the activity of one cache instance. It provides:
//! 1. **Initiator side:** Acknowledged reads and writes, split into first-try hits and retries.
//! 2. **Line resolution:** Misses, evictions, refills, and read-port re-reads.
//! 3. **Backing-store traffic:** Bytes written back and fetched.
//! 4. **Time:** Total cycles and cycles stalled in EVICT or REFILL.

use std::time::Instant;

use serde::Serialize;

/// Counters for one cache instance.
#[derive(Clone, Debug, Serialize)]
pub struct CacheStats {
    #[serde(skip)]
    start_time: Instant,
    /// Clock edges simulated.
    pub cycles: u64,
    /// Reads acknowledged without a preceding miss.
    pub read_hits: u64,
    /// Writes acknowledged without a preceding miss.
    pub write_hits: u64,
    /// Reads acknowledged after a miss was resolved.
    pub read_retries: u64,
    /// Writes acknowledged after a miss was resolved.
    pub write_retries: u64,
    /// Miss decisions taken in CHECK.
    pub misses: u64,
    /// Dirty lines written back.
    pub evictions: u64,
    /// Lines fetched from the backing store.
    pub refills: u64,
    /// Cycles spent in EVICT or REFILL.
    pub stall_cycles: u64,
    /// CHECK cycles spent reloading a read port that was stale or held another line.
    pub rereads: u64,
    /// Bytes sent on the write channel.
    pub bytes_written: u64,
    /// Bytes received on the read channel.
    pub bytes_read: u64,
}

impl Default for CacheStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            read_hits: 0,
            write_hits: 0,
            read_retries: 0,
            write_retries: 0,
            misses: 0,
            evictions: 0,
            refills: 0,
            stall_cycles: 0,
            rereads: 0,
            bytes_written: 0,
            bytes_read: 0,
        }
    }
}

/// Section names for selective stats output.
///
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "accesses", "backing"];

impl CacheStats {
    /// Beats acknowledged on the initiator bus.
    pub fn acks(&self) -> u64 {
        self.read_hits + self.write_hits + self.read_retries + self.write_retries
    }

    /// First-try hits.
    pub fn hits(&self) -> u64 {
        self.read_hits + self.write_hits
    }

    /// Fraction of line lookups that hit, in `[0, 1]`; zero before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits() + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits() as f64 / lookups as f64
        }
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// # Arguments
    ///
    /// * `sections` - Names from [`STATS_SECTIONS`], or empty for all.
    pub fn print_sections(&self, sections: &[String]) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let seconds = self.start_time.elapsed().as_secs_f64();
        let cyc = self.cycles.max(1);

        if want("summary") {
            let khz = (self.cycles as f64 / seconds) / 1000.0;
            println!("\n==========================================================");
            println!("WRITE-BACK CACHE SIMULATION STATISTICS");
            println!("==========================================================");
            println!("host_seconds             {seconds:.4} s");
            println!("sim_cycles               {}", self.cycles);
            println!("sim_freq                 {khz:.2} kHz");
            println!("bus.acks                 {}", self.acks());
            println!(
                "bus.acks_per_cycle       {:.4}",
                self.acks() as f64 / cyc as f64
            );
            println!("----------------------------------------------------------");
        }
        if want("accesses") {
            println!("ACCESSES");
            println!("  read.hits              {}", self.read_hits);
            println!("  read.retries           {}", self.read_retries);
            println!("  write.hits             {}", self.write_hits);
            println!("  write.retries          {}", self.write_retries);
            println!("  misses                 {}", self.misses);
            println!("  hit_rate               {:.2}%", self.hit_rate() * 100.0);
            println!("  rereads                {}", self.rereads);
            println!("----------------------------------------------------------");
        }
        if want("backing") {
            println!("BACKING STORE");
            println!("  evictions              {}", self.evictions);
            println!("  refills                {}", self.refills);
            println!("  bytes.written          {}", self.bytes_written);
            println!("  bytes.read             {}", self.bytes_read);
            println!(
                "  stalls                 {} ({:.2}%)",
                self.stall_cycles,
                (self.stall_cycles as f64 / cyc as f64) * 100.0
            );
        }
        println!("==========================================================");
    }

    /// Prints all statistics sections to stdout.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
