use tessera_chunk::ChunkMap;
use tessera_structures::StructurePlan;
use tessera_world::profile::footprint;
use tessera_world::{ChunkCoord, TilePos, WorldProfile};

/// Air tiles along the surface band of one chunk that touch something solid.
///
/// Columns run one past each side of the chunk so neighboring chunks meet
/// without gaps. For each column pair the span between their surface
/// tiles is a candidate strip, kept only if one of its corners falls in
/// the chunk rectangle grown by one tile on the low sides.
pub fn ambient_positions(profile: &WorldProfile, chunks: &ChunkMap, coord: ChunkCoord) -> Vec<TilePos> {
    let g = chunks.geometry();
    let size = g.chunk_size;
    let origin = g.chunk_origin(coord);
    let inside = |x: i32, y: i32| (origin.x - 1..origin.x + size).contains(&x) && (origin.y - 1..origin.y + size).contains(&y);
    let mut out: Vec<TilePos> = Vec::new();
    for h in -1..size {
        let x = origin.x + h;
        let y0 = profile.surface_height(x) + 1;
        let y1 = profile.surface_height(x + 1) + 1;
        if !inside(x, y1) && !inside(x + 1, y0) {
            continue;
        }
        for px in x..=x + 1 {
            for py in y0.min(y1)..=y0.max(y1) {
                let pos = TilePos::new(px, py);
                if !chunks.is_air_block(pos) || !chunks.has_adjacent_tiles(pos) {
                    continue;
                }
                let pos = g.globalize(pos);
                if !out.contains(&pos) {
                    out.push(pos);
                }
            }
        }
    }
    out
}

/// Reserved light slots of the structure that fall inside this chunk.
pub fn structure_light_slots(profile: &WorldProfile, plan: &StructurePlan, coord: ChunkCoord) -> Vec<TilePos> {
    let g = profile.geometry();
    let coord = g.wrap_chunk(coord);
    if profile.structure_home() != Some(coord.cx) {
        return Vec::new();
    }
    let Some(ground) = profile.structure_ground(plan) else { return Vec::new() };
    let size = g.chunk_size;
    let origin = g.chunk_origin(coord);
    let (lo, _) = footprint(size, plan);
    let rows = plan.height() as i32;
    plan.light_slots()
        .filter_map(|(r, c)| {
            let v = ground + (rows - r as i32) - origin.y;
            (0..size).contains(&v).then(|| TilePos::new(origin.x + lo + c as i32, origin.y + v))
        })
        .collect()
}
