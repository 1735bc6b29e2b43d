use mockall::mock;
use wbcache_core::port::{BackingStore, PortResponse, Transfers};

mock! {
    pub Store {}
    impl BackingStore for Store {
        fn respond(&mut self) -> PortResponse;
        fn clock(&mut self, transfers: &Transfers);
    }
}

/// A store that never raises a ready or valid.
#[derive(Debug, Default)]
pub struct DeadStore {
    pub clocks: u64,
}

impl BackingStore for DeadStore {
    fn respond(&mut self) -> PortResponse {
        PortResponse::IDLE
    }

    fn clock(&mut self, _transfers: &Transfers) {
        self.clocks += 1;
    }
}
