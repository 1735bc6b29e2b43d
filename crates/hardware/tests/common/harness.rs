use tracing_subscriber::EnvFilter;
use wbcache_core::Simulator;
use wbcache_core::bus::BurstType;
use wbcache_core::cache::store::CacheLine;
use wbcache_core::common::SimError;
use wbcache_core::config::{BackingStoreConfig, CacheConfig, Config, Controller, GeneralConfig};
use wbcache_core::port::memory::MemoryStore;
use wbcache_core::port::monitor::CompletedOp;
use wbcache_core::sim::Initiator;

/// Installs a test log subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Eight 32-bit lines behind a 16-bit bus with byte selects (two words per line).
pub fn scenario_config() -> Config {
    Config {
        general: GeneralConfig::default(),
        cache: CacheConfig {
            size_bytes: 32,
            data_width: 16,
            granularity: 8,
            dirty_init: false,
        },
        backing: BackingStoreConfig {
            addr_width: 23,
            data_width: 32,
            controller: Controller::Simple,
            latency: 2,
            ..BackingStoreConfig::default()
        },
    }
}

pub struct TestContext {
    pub sim: Simulator,
    pub initiator: Initiator,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new(&scenario_config())
    }
}

impl TestContext {
    pub fn new(config: &Config) -> Self {
        init_tracing();
        let sim = Simulator::from_config(config).unwrap();
        let initiator = Initiator::new(sim.cache().geometry(), sim.timeout_cycles());
        Self { sim, initiator }
    }

    pub fn read(&mut self, adr: u64) -> u64 {
        self.initiator.read(&mut self.sim, adr).unwrap()
    }

    pub fn write(&mut self, adr: u64, data: u64) {
        let sel = self.sim.cache().geometry().full_sel();
        self.initiator.write(&mut self.sim, adr, data, sel).unwrap();
    }

    pub fn write_sel(&mut self, adr: u64, data: u64, sel: u8) {
        self.initiator.write(&mut self.sim, adr, data, sel).unwrap();
    }

    pub fn burst_read(&mut self, adr: u64, bte: BurstType, beats: usize) -> Vec<u64> {
        self.initiator
            .burst_read(&mut self.sim, adr, bte, beats)
            .unwrap()
    }

    pub fn burst_write(&mut self, adr: u64, bte: BurstType, data: &[u64]) {
        self.initiator
            .burst_write(&mut self.sim, adr, bte, data)
            .unwrap();
    }

    pub fn try_read(&mut self, adr: u64) -> Result<u64, SimError> {
        self.initiator.read(&mut self.sim, adr)
    }

    pub fn line(&self, line: usize) -> CacheLine {
        self.sim.cache().line(line).unwrap()
    }

    pub fn store(&mut self) -> &mut MemoryStore {
        self.sim.store_mut()
    }

    pub fn ops(&self) -> Vec<CompletedOp> {
        self.sim.monitor().log().to_vec()
    }

    /// Backing-store block address `{line, tag}` of a bus word address.
    pub fn block_of(&self, adr: u64) -> u64 {
        let layout = *self.sim.cache().geometry().layout();
        let d = layout.decompose(adr);
        layout.backing_addr(d.line, d.tag)
    }
}
