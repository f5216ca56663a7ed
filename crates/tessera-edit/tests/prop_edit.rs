use proptest::prelude::*;
use tessera_blocks::{BlockCatalog, TileType};
use tessera_chunk::{Chunk, ChunkMap, ChunkStore, Layer, Rgb, StoredChunk};
use tessera_edit::{EditError, WorldEdit};
use tessera_lighting::{LightEngine, LightKind, LightingConfig};
use tessera_structures::StructurePlan;
use tessera_world::{ChunkCoord, TilePos, WorldGenConfig, WorldGenParams, WorldProfile};

struct Fixture {
    chunks: ChunkMap,
    store: ChunkStore,
    lights: LightEngine,
    catalog: BlockCatalog,
    profile: WorldProfile,
}

impl Fixture {
    /// 64x64 world, all four chunks live, every back tile dirt.
    fn new() -> Self {
        let mut c = WorldGenConfig::default();
        c.world.width = 64;
        c.world.height = 64;
        c.world.seed = Some(1);
        let plan = StructurePlan::spaceship();
        let params = WorldGenParams::from_config(&c, plan.width() as i32).unwrap();
        let profile = WorldProfile::generate(params, &plan);
        let g = profile.geometry();
        let mut chunks = ChunkMap::new(g);
        let mut store = ChunkStore::new(32);
        for cy in 0..2 {
            for cx in 0..2 {
                let coord = ChunkCoord::new(cx, cy);
                let mut chunk = Chunk::new(coord, g.chunk_origin(coord), 32);
                chunk.tiles.back.tiles.fill(TileType::Dirt);
                chunk.settle_colors();
                store.insert(coord, StoredChunk { front: chunk.tiles.front.clone(), back: chunk.tiles.back.clone() });
                chunks.insert(chunk);
            }
        }
        Self {
            chunks,
            store,
            lights: LightEngine::new(LightingConfig::default()),
            catalog: BlockCatalog::builtin().unwrap(),
            profile,
        }
    }

    fn edit(&mut self) -> WorldEdit<'_> {
        WorldEdit {
            chunks: &mut self.chunks,
            store: &mut self.store,
            lights: &mut self.lights,
            catalog: &self.catalog,
            profile: &self.profile,
        }
    }

    fn stored(&self, pos: TilePos, layer: Layer) -> TileType {
        let g = self.profile.geometry();
        let (x, y) = g.local(pos);
        self.store.get(g.chunk_of(pos)).map_or(TileType::Air, |s| s.layer(layer).get(x, y))
    }
}

fn close(a: Rgb, b: Rgb) -> bool {
    (a.r - b.r).abs() < 1e-5 && (a.g - b.g).abs() < 1e-5 && (a.b - b.b).abs() < 1e-5
}

#[test]
fn bedrock_cannot_be_broken() {
    let mut f = Fixture::new();
    let p = TilePos::new(3, 1);
    f.edit().set_tile(p, Layer::Front, TileType::Bedrock);
    assert_eq!(f.edit().break_block(p, Layer::Front), Err(EditError::Unbreakable(TileType::Bedrock)));
    assert_eq!(f.chunks.tile_type(p, Layer::Front), TileType::Bedrock);
}

#[test]
fn breaking_air_or_unloaded_is_rejected() {
    let mut f = Fixture::new();
    let p = TilePos::new(3, 3);
    assert_eq!(f.edit().break_block(p, Layer::Front), Err(EditError::Empty(p)));
    let off = TilePos::new(3, 99);
    assert_eq!(f.edit().break_block(off, Layer::Front), Err(EditError::NoChunk(off)));
    f.chunks.remove(ChunkCoord::new(1, 1));
    let gone = TilePos::new(40, 40);
    assert_eq!(f.edit().place_block(gone, Layer::Front, TileType::Stone), Err(EditError::NoChunk(gone)));
}

#[test]
fn torch_places_and_breaks_its_light() {
    let mut f = Fixture::new();
    let p = TilePos::new(10, 10);
    f.edit().place_block(p, Layer::Back, TileType::Torch).unwrap();
    // light emitters go on the front layer
    assert_eq!(f.chunks.tile_type(p, Layer::Front), TileType::Torch);
    assert_eq!(f.stored(p, Layer::Front), TileType::Torch);
    let id = f.lights.light_at(&f.chunks, p).expect("placed light");
    assert_eq!(f.lights.registry().get(id).map(|s| s.kind), Some(LightKind::Placed));
    assert!(f.chunks.get(ChunkCoord::new(0, 0)).is_some_and(|c| c.placed_lights.contains(&id)));
    assert_eq!(f.chunks.tile_color(p), Some(Rgb::splat(0.99)));

    assert_eq!(f.edit().break_block(p, Layer::Front), Ok(TileType::Torch));
    assert!(f.lights.registry().is_empty());
    assert_eq!(f.chunks.tile_color(p), Some(Rgb::BLACK));
    assert_eq!(f.chunks.tile_color(TilePos::new(11, 10)), Some(Rgb::BLACK));
}

#[test]
fn placement_needs_support_and_space() {
    let mut f = Fixture::new();
    let p = TilePos::new(20, 20);
    f.edit().set_tile(p, Layer::Front, TileType::Stone);
    assert_eq!(f.edit().place_block(p, Layer::Front, TileType::Dirt), Err(EditError::Occupied(TileType::Stone)));
    assert_eq!(f.edit().place_block(p, Layer::Front, TileType::Air), Err(EditError::AirBlock));

    // clear a pocket so nothing touches the target
    let q = TilePos::new(5, 20);
    for n in std::iter::once(q).chain(q.neighbors()) {
        f.edit().set_tile(n, Layer::Back, TileType::Air);
    }
    assert_eq!(f.edit().place_block(q, Layer::Front, TileType::Stone), Err(EditError::Unsupported(q)));
}

#[test]
fn placing_a_block_darkens_behind_it() {
    let mut f = Fixture::new();
    let torch = TilePos::new(8, 8);
    f.edit().place_block(torch, Layer::Front, TileType::Torch).unwrap();
    let p = TilePos::new(9, 8);
    f.edit().place_block(p, Layer::Front, TileType::Stone).unwrap();
    // only the torch remains; the spot is relit through stone
    assert_eq!(f.lights.registry().len(), 1);
    let expect = (0.99f32 - 0.25).clamp(0.0, 1.0);
    assert!(close(f.chunks.tile_color(p).unwrap_or(Rgb::BLACK), Rgb::splat(expect)));
    assert_eq!(f.stored(p, Layer::Front), TileType::Stone);
}

#[test]
fn back_block_behind_a_torch_keeps_its_light() {
    let mut f = Fixture::new();
    let p = TilePos::new(10, 10);
    f.edit().set_tile(p, Layer::Back, TileType::Air);
    f.edit().place_block(p, Layer::Front, TileType::Torch).unwrap();
    let id = f.lights.light_at(&f.chunks, p).expect("placed light");

    f.edit().place_block(p, Layer::Back, TileType::Dirt).unwrap();
    assert_eq!(f.chunks.tile_type(p, Layer::Front), TileType::Torch);
    assert_eq!(f.chunks.tile_type(p, Layer::Back), TileType::Dirt);
    assert_eq!(f.lights.light_at(&f.chunks, p), Some(id));
    assert_eq!(f.lights.registry().len(), 1);
    assert!(close(f.chunks.tile_color(p).unwrap_or(Rgb::BLACK), Rgb::splat(0.99)));
    // the neighbor only has a back tile
    let n = TilePos::new(11, 10);
    assert!(close(f.chunks.tile_color(n).unwrap_or(Rgb::BLACK), Rgb::splat(0.99 - 0.125)));
}

#[test]
fn breaking_near_the_surface_opens_ambient_light() {
    let mut f = Fixture::new();
    let x = 10;
    let p = TilePos::new(x, f.profile.surface_height(x));
    f.edit().set_tile(p, Layer::Back, TileType::Air);
    f.edit().set_tile(p, Layer::Front, TileType::Stone);
    assert_eq!(f.edit().break_block(p, Layer::Front), Ok(f.catalog.drop_for(TileType::Stone)));
    let id = f.lights.light_at(&f.chunks, p).expect("ambient light");
    assert_eq!(f.lights.registry().get(id).map(|s| s.kind), Some(LightKind::Ambient));
    assert_eq!(f.chunks.tile_color(p), Some(Rgb::WHITE));
    let owner = f.profile.geometry().chunk_of(p);
    assert!(f.chunks.get(owner).is_some_and(|c| c.ambient_lights.contains(&id)));
}

#[test]
fn breaking_deep_brightens_by_the_falloff_gap() {
    let mut f = Fixture::new();
    let p = TilePos::new(12, 2);
    f.edit().set_tile(p, Layer::Front, TileType::Stone);
    f.chunks.set_tile_color(p, Rgb::splat(0.5));
    assert_eq!(f.edit().break_block(p, Layer::Front), Ok(f.catalog.drop_for(TileType::Stone)));
    assert_eq!(f.chunks.tile_color(p), Some(Rgb::splat(0.625)));
    assert_eq!(f.chunks.tile_color(TilePos::new(13, 2)), Some(Rgb::splat(0.5)));
    assert!(f.lights.registry().is_empty());
}

fn breakable() -> impl Strategy<Value = TileType> {
    prop::sample::select(
        TileType::ALL.iter().copied().filter(|t| !t.is_air() && *t != TileType::Bedrock && *t != TileType::Torch).collect::<Vec<_>>(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    // One break, one drop: the catalog's drop mapping of the broken tile.
    #[test]
    fn break_yields_the_mapped_drop(tile in breakable(), x in 0i32..64, y in 0i32..16) {
        let mut f = Fixture::new();
        let p = TilePos::new(x, y);
        f.edit().set_tile(p, Layer::Front, tile);
        let dropped = f.edit().break_block(p, Layer::Front);
        prop_assert_eq!(dropped, Ok(f.catalog.drop_for(tile)));
        prop_assert_eq!(f.chunks.tile_type(p, Layer::Front), TileType::Air);
        prop_assert_eq!(f.stored(p, Layer::Front), TileType::Air);
    }
}
