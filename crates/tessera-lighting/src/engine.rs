use std::collections::{HashSet, VecDeque};

use tessera_chunk::{Channel, ChunkHandle, ChunkMap, Layer, LightId, Rgb};
use tessera_structures::StructurePlan;
use tessera_world::{ChunkCoord, TilePos, WorldProfile};

use crate::ambient::{ambient_positions, structure_light_slots};
use crate::config::LightingConfig;
use crate::registry::{LightKind, LightRegistry, LightSource};
use crate::task::LightTask;

/// BFS payload: a tile, the color it carries, and its owning chunk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightNode {
    pub pos: TilePos,
    pub color: Rgb,
    pub chunk: ChunkHandle,
}

/// Owns every light source and runs propagation over a [`ChunkMap`].
///
/// Tile colors hold the channel-wise maximum of all contributions that
/// reach them. Spreading only ever raises a channel; removal zeroes a
/// footprint and then refills it from the stronger light around its edge.
#[derive(Debug)]
pub struct LightEngine {
    config: LightingConfig,
    falloff: f32,
    falloff_back: f32,
    registry: LightRegistry,
}

impl LightEngine {
    pub fn new(config: LightingConfig) -> Self {
        Self {
            falloff: config.falloff(),
            falloff_back: config.falloff_back(),
            config,
            registry: LightRegistry::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &LightingConfig {
        &self.config
    }

    /// Applies to light work started after the call. Existing colors stay.
    pub fn set_config(&mut self, config: LightingConfig) {
        self.falloff = config.falloff();
        self.falloff_back = config.falloff_back();
        self.config = config;
    }

    #[inline]
    pub fn registry(&self) -> &LightRegistry {
        &self.registry
    }

    #[inline]
    pub fn falloff(&self) -> f32 {
        self.falloff
    }

    #[inline]
    pub fn falloff_back(&self) -> f32 {
        self.falloff_back
    }

    pub fn light_at(&self, chunks: &ChunkMap, pos: TilePos) -> Option<LightId> {
        self.registry.at(chunks.geometry().globalize(pos))
    }

    /// Registers a source, records it in its owner's light list, and
    /// optionally spreads it right away.
    pub fn create_light_source(&mut self, chunks: &mut ChunkMap, source: LightSource, spread: bool) -> LightId {
        let mut source = source;
        source.pos = chunks.geometry().globalize(source.pos);
        let id = self.registry.insert(source);
        if let Some(chunk) = source.owner.and_then(|c| chunks.get_mut(c)) {
            match source.kind {
                LightKind::Ambient => chunk.ambient_lights.push(id),
                LightKind::Placed => chunk.placed_lights.push(id),
            }
        }
        if spread {
            self.update_light(chunks, id);
        }
        id
    }

    /// Drops a source. With `remove_light` its light is taken out of the
    /// world first; otherwise the colors it left behind stay.
    pub fn remove_light_source(&mut self, chunks: &mut ChunkMap, id: LightId, remove_light: bool) {
        if remove_light {
            self.remove_light(chunks, id);
        }
        let Some(source) = self.registry.remove(id) else { return };
        if let Some(chunk) = source.owner.and_then(|c| chunks.get_mut(c)) {
            chunk.ambient_lights.retain(|&l| l != id);
            chunk.placed_lights.retain(|&l| l != id);
        }
    }

    /// Forgets sources without touching any colors. Used when their chunk
    /// is going away.
    pub fn detach(&mut self, ids: impl IntoIterator<Item = LightId>) {
        let mut n = 0usize;
        for id in ids {
            if self.registry.remove(id).is_some() {
                n += 1;
            }
        }
        log::trace!(target: "stream", "detached {} lights", n);
    }

    pub fn clear(&mut self) {
        self.registry.clear();
    }

    /// Seeds the source tile with `max(current, contribution)` and returns
    /// the seed node, or `None` when the tile has no live chunk.
    fn seed(&mut self, chunks: &mut ChunkMap, id: LightId) -> Option<LightNode> {
        let source = self.registry.get_mut(id)?;
        source.initialized = true;
        let source = *source;
        let g = chunks.geometry();
        if !g.contains_y(source.pos.y) {
            return None;
        }
        let handle = chunks.handle_at(source.pos)?;
        let chunk = chunks.resolve_mut(handle)?;
        let (x, y) = g.local(source.pos);
        let contribution = source.contribution();
        chunk.set_color(x, y, chunk.color_or_black(x, y).max(contribution));
        Some(LightNode { pos: source.pos, color: contribution, chunk: handle })
    }

    /// Spreads a source fully in one call.
    pub fn update_light(&mut self, chunks: &mut ChunkMap, id: LightId) {
        if let Some(seed) = self.seed(chunks, id) {
            self.propagate(chunks, &[seed]);
        }
    }

    /// Same as [`update_light`](Self::update_light) but returns a task that
    /// does the work in bounded steps.
    pub fn update_light_smooth(&mut self, chunks: &mut ChunkMap, id: LightId) -> Option<LightTask> {
        self.seed(chunks, id).map(|seed| LightTask::new(vec![seed]))
    }

    /// Runs the spread pass for already-colored seed nodes, red then green then blue.
    pub fn propagate(&self, chunks: &mut ChunkMap, seeds: &[LightNode]) {
        for c in Channel::ALL {
            self.propagate_channel(chunks, seeds.iter().copied(), c);
        }
    }

    pub(crate) fn propagate_channel(&self, chunks: &mut ChunkMap, seeds: impl IntoIterator<Item = LightNode>, c: Channel) {
        let mut queue: VecDeque<LightNode> = seeds.into_iter().collect();
        while self.spread_step(chunks, &mut queue, c) {}
    }

    /// Resolves the neighbor's chunk, only looking it up when the step
    /// crosses into another chunk.
    #[inline]
    fn neighbor(chunks: &ChunkMap, node: &LightNode, n: TilePos) -> Option<(TilePos, ChunkHandle)> {
        let g = chunks.geometry();
        if !g.contains_y(n.y) {
            return None;
        }
        let n = g.globalize(n);
        let coord = g.chunk_of(n);
        if coord == g.chunk_of(node.pos) {
            Some((n, node.chunk))
        } else {
            chunks.handle(coord).map(|h| (n, h))
        }
    }

    /// Dequeues one node and tries its neighbors left, down, right, up.
    /// Returns false once the queue is empty.
    pub(crate) fn spread_step(&self, chunks: &mut ChunkMap, queue: &mut VecDeque<LightNode>, c: Channel) -> bool {
        let Some(node) = queue.pop_front() else { return false };
        let value = node.color.get(c);
        if value <= 0.0 {
            return true;
        }
        let g = chunks.geometry();
        for n in node.pos.neighbors() {
            let Some((n, handle)) = Self::neighbor(chunks, &node, n) else { continue };
            let Some(chunk) = chunks.resolve_mut(handle) else { continue };
            let (x, y) = g.local(n);
            let falloff = if !chunk.tile(Layer::Front, x, y).is_air() {
                self.falloff
            } else if !chunk.tile(Layer::Back, x, y).is_air() {
                self.falloff_back
            } else {
                continue;
            };
            let mut current = chunk.color_or_black(x, y);
            if current.get(c) + falloff + self.config.pass_threshold < value {
                current.set(c, (value - falloff).clamp(0.0, 1.0));
                chunk.set_color(x, y, current);
                queue.push_back(LightNode { pos: n, color: current, chunk: handle });
            }
        }
        true
    }

    /// Takes a source's light out of the world and refills the hole from
    /// whatever stronger light borders it.
    ///
    /// Per channel: zero every tile whose value is below the node it was
    /// reached from, queue brighter or equal neighbors for refill, then
    /// spread the refill queue minus anything zeroed. Lights passed over
    /// on the way are re-spread at the end so their footprints are whole.
    pub fn remove_light(&mut self, chunks: &mut ChunkMap, id: LightId) {
        let Some(source) = self.registry.get(id).copied() else { return };
        let g = chunks.geometry();
        if !g.contains_y(source.pos.y) {
            return;
        }
        let Some(handle) = chunks.handle_at(source.pos) else { return };
        let Some(chunk) = chunks.resolve_mut(handle) else { return };
        let (x, y) = g.local(source.pos);
        let color = chunk.color_or_black(x, y).max(source.contribution());
        chunk.set_color(x, y, Rgb::BLACK);
        let seed = LightNode { pos: source.pos, color, chunk: handle };

        let mut touched: Vec<LightId> = Vec::new();
        for c in Channel::ALL {
            let mut removal = VecDeque::from([seed]);
            let mut refill: Vec<LightNode> = Vec::new();
            let mut removed: HashSet<TilePos> = HashSet::new();
            while let Some(node) = removal.pop_front() {
                for &other in self.registry.all_at(node.pos) {
                    if !touched.contains(&other) {
                        touched.push(other);
                    }
                }
                removed.insert(node.pos);
                let value = node.color.get(c);
                if value <= 0.0 {
                    continue;
                }
                for n in node.pos.neighbors() {
                    let Some((n, h)) = Self::neighbor(chunks, &node, n) else { continue };
                    let Some(chunk) = chunks.resolve_mut(h) else { continue };
                    let (x, y) = g.local(n);
                    let current = chunk.color_or_black(x, y);
                    let nv = current.get(c);
                    if nv <= 0.0 {
                        continue;
                    }
                    let next = LightNode { pos: n, color: current, chunk: h };
                    if nv < value {
                        let mut dark = current;
                        dark.set(c, 0.0);
                        chunk.set_color(x, y, dark);
                        removal.push_back(next);
                    } else {
                        refill.push(next);
                    }
                }
            }
            let refill = refill.into_iter().filter(|n| !removed.contains(&n.pos));
            self.propagate_channel(chunks, refill, c);
        }

        for other in touched {
            if other != id {
                self.update_light(chunks, other);
            }
        }
    }

    /// Creates unspread ambient sources for one chunk's surface band.
    pub fn create_ambient_light_sources(&mut self, chunks: &mut ChunkMap, profile: &WorldProfile, coord: ChunkCoord) -> Vec<LightId> {
        let ambient = self.config.ambient();
        let strength = self.config.ambient_strength;
        let mut out = Vec::new();
        for pos in ambient_positions(profile, chunks, coord) {
            let pos = chunks.geometry().globalize(pos);
            if self.registry.has_light(pos) {
                continue;
            }
            let source = LightSource::new(pos, ambient, strength, LightKind::Ambient).owned_by(coord);
            out.push(self.create_light_source(chunks, source, false));
        }
        out
    }

    /// Unspread ambient sources at the structure's reserved light slots in this chunk.
    pub fn create_structure_lights(
        &mut self,
        chunks: &mut ChunkMap,
        profile: &WorldProfile,
        plan: &StructurePlan,
        coord: ChunkCoord,
    ) -> Vec<LightId> {
        let ambient = self.config.ambient();
        let strength = self.config.ambient_strength;
        let mut out = Vec::new();
        for pos in structure_light_slots(profile, plan, coord) {
            if self.registry.has_light(pos) {
                continue;
            }
            let source = LightSource::new(pos, ambient, strength, LightKind::Ambient).owned_by(coord);
            out.push(self.create_light_source(chunks, source, false));
        }
        out
    }

    /// Seed nodes for the ring of tiles one step outside a chunk, carrying
    /// the colors already there.
    pub fn seam_ring(&self, chunks: &ChunkMap, coord: ChunkCoord) -> Vec<LightNode> {
        let g = chunks.geometry();
        let size = g.chunk_size;
        let origin = g.chunk_origin(coord);
        let mut out = Vec::with_capacity(4 * (size as usize + 1));
        let mut cached: Option<(ChunkCoord, ChunkHandle)> = chunks.handle(coord).map(|h| (g.wrap_chunk(coord), h));
        for i in -1..=size {
            for j in -1..=size {
                if (0..size).contains(&i) && (0..size).contains(&j) {
                    continue;
                }
                let pos = TilePos::new(origin.x + i, origin.y + j);
                if !g.contains_y(pos.y) {
                    continue;
                }
                let pos = g.globalize(pos);
                let owner = g.chunk_of(pos);
                let handle = match cached {
                    Some((c, h)) if c == owner => h,
                    _ => match chunks.handle(owner) {
                        Some(h) => {
                            cached = Some((owner, h));
                            h
                        }
                        None => continue,
                    },
                };
                let Some(chunk) = chunks.resolve(handle) else { continue };
                let (x, y) = g.local(pos);
                out.push(LightNode { pos, color: chunk.color_or_black(x, y), chunk: handle });
            }
        }
        out
    }

    /// Color to present for a tile on a layer: back tiles are shaded, and
    /// everything is white while lighting is switched off.
    pub fn display_color(&self, color: Option<Rgb>, layer: Layer) -> Option<Rgb> {
        let color = if self.config.enabled { color? } else { Rgb::WHITE };
        Some(match layer {
            Layer::Front => color,
            Layer::Back => color.scale(self.config.back_shadow_factor),
        })
    }
}
