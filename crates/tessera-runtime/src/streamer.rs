use std::collections::VecDeque;
use std::ops::Range;

use hashbrown::{HashMap, HashSet};
use tessera_chunk::{Chunk, ChunkMap, ChunkState, ChunkStore, Layer, LightId, WorldGenerator};
use tessera_lighting::{LightEngine, LightKind, LightSource, LightTask};
use tessera_world::{ChunkCoord, TilePos, WorldGeometry};

use crate::config::StreamingConfig;
use crate::workers::{GenJob, GenOut, GenWorkers};

/// Load/unload notifications for the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamEvent {
    /// Generated and lit.
    ChunkLoaded(ChunkCoord),
    ChunkUnloaded(ChunkCoord),
}

/// Half-open chunk rectangle around the view. `x` is unwrapped; `y` is
/// clamped to the world's chunk rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadBounds {
    pub x: Range<i32>,
    pub y: Range<i32>,
}

impl LoadBounds {
    pub fn around(view: TilePos, horizontal: i32, vertical: i32, g: WorldGeometry) -> Self {
        let cs = g.chunk_size;
        let mut start_x = view.x - horizontal;
        if start_x < 0 {
            start_x -= cs;
        }
        // integer division truncates toward zero, as in the load scan it replaces
        let x0 = start_x / cs;
        let y0 = (view.y - vertical) / cs;
        let x1 = (view.x + horizontal + cs) / cs;
        let y1 = (view.y + vertical + cs) / cs;
        let rows = g.chunks_y();
        Self { x: x0..x1, y: y0.clamp(0, rows)..y1.clamp(0, rows) }
    }

    /// Whether a wrapped chunk coordinate falls inside.
    pub fn contains(&self, c: ChunkCoord, g: WorldGeometry) -> bool {
        if !self.y.contains(&c.cy) {
            return false;
        }
        let n = g.chunks_x();
        let span = self.x.end - self.x.start;
        span >= n || (span > 0 && (c.cx - self.x.start).rem_euclid(n) < span)
    }

    /// Chunks to load, scanned from the top-right corner. Yields the wrapped
    /// coordinate with the unwrapped world origin, once per coordinate.
    pub fn scan(&self, g: WorldGeometry) -> Vec<(ChunkCoord, TilePos)> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for h in self.x.clone().rev() {
            for v in self.y.clone().rev() {
                let coord = g.wrap_chunk(ChunkCoord::new(h, v));
                if seen.insert(coord) {
                    out.push((coord, TilePos::new(h * g.chunk_size, v * g.chunk_size)));
                }
            }
        }
        out
    }
}

/// Mutable world state the streamer works on.
pub struct StreamCtx<'a> {
    pub chunks: &'a mut ChunkMap,
    pub store: &'a mut ChunkStore,
    pub lights: &'a mut LightEngine,
    pub generator: &'a WorldGenerator,
}

#[derive(Clone, Copy, Debug)]
struct BatchEntry {
    coord: ChunkCoord,
    /// Unwrapped origin, for distance ordering and spread direction.
    origin: TilePos,
}

/// Lighting bootstrap of one chunk: its source spreads, then the seam ring.
struct Bootstrap {
    coord: ChunkCoord,
    tasks: VecDeque<LightTask>,
    stitched: bool,
}

enum Phase {
    Idle,
    /// Waiting for every chunk of the batch to finish generating.
    Waiting(Vec<BatchEntry>),
    Lighting { order: VecDeque<BatchEntry>, current: Option<Bootstrap> },
}

/// Keeps the chunks around the view live.
///
/// A load scan instantiates every missing chunk in the load rectangle and
/// hands it to the generation workers. Once the whole batch has generated,
/// chunks are lit one at a time, nearest first, a bounded number of light
/// steps per tick. An unload scan on the same interval evicts chunks that
/// left the rectangle, detaching their lights without touching colors.
pub struct ChunkStreamer {
    config: StreamingConfig,
    workers: GenWorkers,
    next_ticket: u64,
    /// Outstanding generation per chunk; results with any other ticket are stale.
    tickets: HashMap<ChunkCoord, u64>,
    phase: Phase,
    load_timer: f32,
    unload_timer: f32,
    view: TilePos,
    events: Vec<StreamEvent>,
}

impl ChunkStreamer {
    pub fn new(config: StreamingConfig, workers: GenWorkers) -> Self {
        let interval = config.scan_interval_secs;
        Self {
            config,
            workers,
            next_ticket: 1,
            tickets: HashMap::new(),
            phase: Phase::Idle,
            load_timer: interval,
            unload_timer: interval,
            view: TilePos::default(),
            events: Vec::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    pub fn bounds(&self, view: TilePos, g: WorldGeometry) -> LoadBounds {
        LoadBounds::around(view, self.config.horizontal_radius, self.config.vertical_radius, g)
    }

    /// True when no batch is being generated or lit.
    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    pub fn pending_generation(&self) -> usize {
        self.tickets.len()
    }

    pub fn drain_events(&mut self) -> Vec<StreamEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advances streaming by `dt` seconds around `view`.
    pub fn tick(&mut self, ctx: &mut StreamCtx<'_>, view: TilePos, dt: f32) {
        self.view = view;
        self.collect(ctx);

        self.unload_timer += dt;
        if self.unload_timer >= self.config.scan_interval_secs {
            self.unload_timer = 0.0;
            self.unload_outside(ctx);
        }

        let phase = std::mem::replace(&mut self.phase, Phase::Idle);
        self.phase = match phase {
            Phase::Idle => {
                self.load_timer += dt;
                if self.load_timer >= self.config.scan_interval_secs {
                    self.load_timer = 0.0;
                    self.schedule_batch(ctx)
                } else {
                    Phase::Idle
                }
            }
            Phase::Waiting(batch) => {
                if self.batch_generated(ctx.chunks, &batch) {
                    log::debug!("batch of {} chunks generated, lighting", batch.len());
                    Phase::Lighting { order: batch.into(), current: None }
                } else {
                    Phase::Waiting(batch)
                }
            }
            Phase::Lighting { order, current } => {
                let budget = ctx.lights.config().iteration_limit.max(1);
                self.light_batch(ctx, order, current, budget)
            }
        };
        let (queued, inflight) = self.workers.queue_debug_counts();
        log::trace!(
            target: "stream",
            "tick: {} live, {} generating ({} queued, {} in flight), idle={}",
            ctx.chunks.len(),
            self.tickets.len(),
            queued,
            inflight,
            self.is_idle()
        );
    }

    /// Runs scans and lighting until the area around `view` is fully loaded.
    pub fn settle(&mut self, ctx: &mut StreamCtx<'_>, view: TilePos) {
        self.load_timer = self.config.scan_interval_secs;
        self.unload_timer = self.config.scan_interval_secs;
        self.tick(ctx, view, 0.0);
        while !self.is_idle() {
            if matches!(self.phase, Phase::Waiting(_)) && !self.tickets.is_empty() {
                if let Some(out) = self.workers.wait_result() {
                    self.accept(ctx, out);
                }
            }
            self.tick(ctx, view, 0.0);
        }
    }

    /// Stops all work, unloads every chunk, and rescans on the next tick.
    pub fn clear_all_chunks(&mut self, ctx: &mut StreamCtx<'_>) {
        self.phase = Phase::Idle;
        self.tickets.clear();
        let chunks = ctx.chunks.clear();
        log::debug!("clearing all {} chunks", chunks.len());
        for mut chunk in chunks {
            ctx.lights.detach(chunk.take_lights());
            self.events.push(StreamEvent::ChunkUnloaded(chunk.coord));
        }
        self.load_timer = self.config.scan_interval_secs;
        self.unload_timer = self.config.scan_interval_secs;
    }

    fn collect(&mut self, ctx: &mut StreamCtx<'_>) {
        for out in self.workers.drain_results() {
            self.accept(ctx, out);
        }
    }

    fn accept(&mut self, ctx: &mut StreamCtx<'_>, out: GenOut) {
        if self.tickets.get(&out.coord) != Some(&out.ticket) {
            log::debug!("dropping stale fill for {:?}", out.coord);
            return;
        }
        self.tickets.remove(&out.coord);
        let Some(chunk) = ctx.chunks.get_mut(out.coord) else { return };
        if chunk.state != ChunkState::Generating {
            return;
        }
        log::debug!(
            "chunk {:?} {} in {}ms",
            out.coord,
            if out.restored { "restored" } else { "generated" },
            out.t_gen_ms
        );
        ctx.generator.commit(chunk, out.fill, ctx.store);
    }

    fn rng_seed(&self, coord: ChunkCoord) -> u64 {
        match self.config.generation_seed {
            Some(s) => {
                s ^ (coord.cx as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
                    ^ (coord.cy as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
            }
            None => rand::random(),
        }
    }

    fn schedule_batch(&mut self, ctx: &mut StreamCtx<'_>) -> Phase {
        let g = ctx.chunks.geometry();
        let bounds = self.bounds(self.view, g);
        let size = g.chunk_size as usize;
        let mut batch = Vec::new();
        for (coord, origin) in bounds.scan(g) {
            if ctx.chunks.contains(coord) {
                continue;
            }
            ctx.chunks.insert(Chunk::new(coord, g.chunk_origin(coord), size));
            let ticket = self.next_ticket;
            self.next_ticket += 1;
            self.tickets.insert(coord, ticket);
            let stored = ctx.store.get(coord).cloned();
            self.workers.submit(GenJob { coord, ticket, stored, rng_seed: self.rng_seed(coord) });
            batch.push(BatchEntry { coord, origin });
        }
        if batch.is_empty() {
            return Phase::Idle;
        }
        let (vx, vy) = (self.view.x as f32, self.view.y as f32);
        let dist = |e: &BatchEntry| (e.origin.x as f32 - vx).hypot(e.origin.y as f32 - vy);
        batch.sort_by(|a, b| dist(a).total_cmp(&dist(b)));
        log::debug!("scheduled {} chunks around ({}, {})", batch.len(), self.view.x, self.view.y);
        Phase::Waiting(batch)
    }

    // Chunks that were unloaded, or whose fill was lost, no longer hold the barrier.
    fn batch_generated(&self, chunks: &ChunkMap, batch: &[BatchEntry]) -> bool {
        batch.iter().all(|e| {
            chunks.get(e.coord).is_none_or(|c| c.is_generated()) || !self.tickets.contains_key(&e.coord)
        })
    }

    fn light_batch(
        &mut self,
        ctx: &mut StreamCtx<'_>,
        mut order: VecDeque<BatchEntry>,
        mut current: Option<Bootstrap>,
        budget: usize,
    ) -> Phase {
        let mut used = 0;
        while used < budget {
            let boot = match current.as_mut() {
                Some(b) => b,
                None => match order.pop_front() {
                    Some(entry) => {
                        current = self.begin_bootstrap(ctx, entry);
                        continue;
                    }
                    None => return Phase::Idle,
                },
            };
            if let Some(task) = boot.tasks.front_mut() {
                used += task.step(ctx.lights, ctx.chunks, budget - used);
                if task.is_done() {
                    boot.tasks.pop_front();
                }
                continue;
            }
            if !boot.stitched {
                boot.stitched = true;
                let ring = ctx.lights.seam_ring(ctx.chunks, boot.coord);
                boot.tasks.push_back(LightTask::new(ring));
                continue;
            }
            let coord = boot.coord;
            current = None;
            if let Some(chunk) = ctx.chunks.get_mut(coord) {
                chunk.state = ChunkState::Ready;
                self.events.push(StreamEvent::ChunkLoaded(coord));
                log::debug!("chunk {:?} ready", coord);
            }
        }
        Phase::Lighting { order, current }
    }

    /// Creates a chunk's light sources and queues their spreads. `None` when
    /// the chunk went away or never generated.
    fn begin_bootstrap(&mut self, ctx: &mut StreamCtx<'_>, entry: BatchEntry) -> Option<Bootstrap> {
        let coord = entry.coord;
        match ctx.chunks.get(coord) {
            Some(c) if c.state == ChunkState::Lighting => {}
            Some(c) => {
                log::warn!("chunk {:?} skipped lighting in state {:?}", coord, c.state);
                return None;
            }
            None => return None,
        }

        let mut ids = ctx.lights.create_ambient_light_sources(ctx.chunks, &ctx.generator.profile, coord);
        ids.extend(ctx.lights.create_structure_lights(ctx.chunks, &ctx.generator.profile, &ctx.generator.plan, coord));
        if entry.origin.x < self.view.x {
            ids.reverse();
        }
        ids.extend(self.relight_placed(ctx, coord));

        let mut tasks = VecDeque::with_capacity(ids.len() + 1);
        for id in ids {
            if let Some(task) = ctx.lights.update_light_smooth(ctx.chunks, id) {
                tasks.push_back(task);
            }
        }
        Some(Bootstrap { coord, tasks, stitched: false })
    }

    /// Placed lights are not stored; light-emitting tiles get theirs back on load.
    fn relight_placed(&mut self, ctx: &mut StreamCtx<'_>, coord: ChunkCoord) -> Vec<LightId> {
        let catalog = &ctx.generator.catalog;
        let Some(chunk) = ctx.chunks.get(coord) else { return Vec::new() };
        let size = chunk.size();
        let origin = chunk.origin;
        let emitters: Vec<TilePos> = (0..size)
            .flat_map(|y| (0..size).map(move |x| (x, y)))
            .filter(|&(x, y)| catalog.is_light_source(chunk.tile(Layer::Front, x, y)))
            .map(|(x, y)| TilePos::new(origin.x + x as i32, origin.y + y as i32))
            .collect();
        let color = ctx.lights.config().placed();
        let mut out = Vec::with_capacity(emitters.len());
        for pos in emitters {
            if ctx.lights.light_at(ctx.chunks, pos).is_some() {
                continue;
            }
            let source = LightSource::new(pos, color, 1.0, LightKind::Placed).owned_by(coord);
            out.push(ctx.lights.create_light_source(ctx.chunks, source, false));
        }
        out
    }

    fn unload_outside(&mut self, ctx: &mut StreamCtx<'_>) {
        let g = ctx.chunks.geometry();
        let bounds = self.bounds(self.view, g);
        let outside: Vec<ChunkCoord> = ctx.chunks.coords().filter(|&c| !bounds.contains(c, g)).collect();
        for coord in outside {
            self.unload(ctx, coord);
        }
    }

    fn unload(&mut self, ctx: &mut StreamCtx<'_>, coord: ChunkCoord) {
        let Some(mut chunk) = ctx.chunks.remove(coord) else { return };
        self.tickets.remove(&coord);
        ctx.lights.detach(chunk.take_lights());
        self.events.push(StreamEvent::ChunkUnloaded(coord));
        log::debug!("unloaded chunk {:?}", coord);
    }
}
