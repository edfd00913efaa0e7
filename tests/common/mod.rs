// Common test utilities for terminal integration tests
//
// This module provides a stand-in emulation core that records the cache
// invalidations it receives, and helpers for driving a headless terminal.

#![allow(dead_code)]

use pro_term::input::ScriptedInput;
use pro_term::{
    BitPlanes, HeadlessSurface, MenuHost, SharedKeyQueue, Terminal, VideoCache, VideoMemory,
    VirtualKey,
};
use std::collections::BTreeSet;
use std::time::Instant;

/// Emulation core backed by plain bit-planes
#[derive(Default)]
pub struct RecordingCore {
    pub planes: BitPlanes,
    pub invalidated: BTreeSet<usize>,
    pub full_invalidations: usize,
}

impl RecordingCore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A core whose whole screen shows one palette index
    pub fn filled(index: u8) -> Self {
        let mut core = Self::default();
        core.planes.fill(index);
        core
    }
}

impl VideoMemory for RecordingCore {
    fn plane_word(&self, plane: usize, address: usize) -> u16 {
        self.planes.plane_word(plane, address)
    }
}

impl VideoCache for RecordingCore {
    fn invalidate(&mut self, address: usize) {
        self.invalidated.insert(address);
    }

    fn invalidate_all(&mut self) {
        self.full_invalidations += 1;
        self.invalidated.clear();
    }
}

/// Everything currently queued for the machine
pub fn drain(queue: &SharedKeyQueue) -> Vec<VirtualKey> {
    std::iter::from_fn(|| queue.get_key()).collect()
}

/// Run one poll cycle at `now` and return the codes it queued
pub fn poll<M: MenuHost>(
    terminal: &mut Terminal<HeadlessSurface, M>,
    input: &mut ScriptedInput,
    now: Instant,
) -> Vec<VirtualKey> {
    terminal.service_events(input, now);
    drain(&terminal.key_queue())
}
