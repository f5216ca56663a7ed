use std::collections::VecDeque;

use tessera_chunk::{Channel, ChunkMap};

use crate::engine::{LightEngine, LightNode};

/// Resumable spread pass. Keeps its queue between steps so a large flood
/// fill can be spread over several ticks; the finished colors match a
/// single [`LightEngine::propagate`] call over the same seeds.
#[derive(Clone, Debug)]
pub struct LightTask {
    seeds: Vec<LightNode>,
    queue: VecDeque<LightNode>,
    channel: usize,
}

impl LightTask {
    pub fn new(seeds: Vec<LightNode>) -> Self {
        let queue = seeds.iter().copied().collect();
        Self { seeds, queue, channel: 0 }
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.channel >= Channel::ALL.len()
    }

    /// Runs at most `budget` dequeues. Returns the number used; the task
    /// is finished once [`is_done`](Self::is_done) reports true.
    pub fn step(&mut self, engine: &LightEngine, chunks: &mut ChunkMap, budget: usize) -> usize {
        let mut used = 0;
        while used < budget && !self.is_done() {
            let c = Channel::ALL[self.channel];
            if engine.spread_step(chunks, &mut self.queue, c) {
                used += 1;
                continue;
            }
            self.channel += 1;
            if !self.is_done() {
                self.queue.extend(self.seeds.iter().copied());
            }
        }
        used
    }

    /// Runs the task to completion in `iteration_limit` slices.
    pub fn finish(&mut self, engine: &LightEngine, chunks: &mut ChunkMap) {
        let limit = engine.config().iteration_limit.max(1);
        while !self.is_done() {
            self.step(engine, chunks, limit);
        }
    }
}
