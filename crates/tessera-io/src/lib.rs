//! Flat text saves of the chunk store.
//!
//! A save directory holds three files. `front.txt` and `back.txt` each list
//! every stored chunk as a `"cx cy"` line followed by one line of
//! `chunk_size²` tile codes in x-major order. `seed.txt` holds the world seed.
//! Tile codes are catalog-independent, but the catalog's order still decides
//! generation for chunks that were never saved.
#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tessera_blocks::TileType;
use tessera_chunk::{ChunkStore, Layer, StoredChunk, TileGrid};
use tessera_world::ChunkCoord;

pub const FRONT_FILE: &str = "front.txt";
pub const BACK_FILE: &str = "back.txt";
pub const SEED_FILE: &str = "seed.txt";

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("save I/O: {0}")]
    Io(#[from] io::Error),
    #[error("{file}:{line}: expected a \"cx cy\" header")]
    BadHeader { file: &'static str, line: usize },
    #[error("{file}:{line}: bad tile code {token:?}")]
    BadCode { file: &'static str, line: usize, token: String },
    #[error("{file}: chunk ({cx}, {cy}) has {found} codes, expected {expected}")]
    WrongLength { file: &'static str, cx: i32, cy: i32, expected: usize, found: usize },
    #[error("chunk ({0}, {1}) is missing one of its layers")]
    MissingLayer(i32, i32),
    #[error("bad seed {0:?}")]
    BadSeed(String),
}

/// A loaded save: the seed to regenerate unsaved chunks with, and every stored chunk.
#[derive(Clone, Debug)]
pub struct WorldSave {
    pub seed: i64,
    pub store: ChunkStore,
}

fn layer_file(layer: Layer) -> &'static str {
    match layer {
        Layer::Front => FRONT_FILE,
        Layer::Back => BACK_FILE,
    }
}

/// Writes one layer of every stored chunk.
pub fn write_layer<W: Write>(store: &ChunkStore, layer: Layer, mut w: W) -> io::Result<()> {
    let size = store.chunk_size();
    let mut codes = String::with_capacity(size * size * 3);
    for (coord, stored) in store.iter() {
        let grid = stored.layer(layer);
        codes.clear();
        for x in 0..size {
            for y in 0..size {
                if !codes.is_empty() {
                    codes.push(' ');
                }
                codes.push_str(&grid.get(x, y).code().to_string());
            }
        }
        writeln!(w, "{} {}", coord.cx, coord.cy)?;
        writeln!(w, "{codes}")?;
    }
    w.flush()
}

/// Parses one layer file into per-chunk grids.
pub fn read_layer(src: &str, chunk_size: usize, layer: Layer) -> Result<BTreeMap<ChunkCoord, TileGrid>, SaveError> {
    let file = layer_file(layer);
    let mut out = BTreeMap::new();
    let mut lines = src.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());
    while let Some((i, header)) = lines.next() {
        let line = i + 1;
        let mut parts = header.split_whitespace().map(str::parse::<i32>);
        let coord = match (parts.next(), parts.next(), parts.next()) {
            (Some(Ok(cx)), Some(Ok(cy)), None) => ChunkCoord::new(cx, cy),
            _ => return Err(SaveError::BadHeader { file, line }),
        };
        let (i, body) = lines.next().unwrap_or((i + 1, ""));
        let codes = body
            .split_whitespace()
            .map(|t| {
                t.parse::<u8>()
                    .ok()
                    .and_then(TileType::from_code)
                    .ok_or_else(|| SaveError::BadCode { file, line: i + 1, token: t.to_string() })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let expected = chunk_size * chunk_size;
        if codes.len() != expected {
            return Err(SaveError::WrongLength { file, cx: coord.cx, cy: coord.cy, expected, found: codes.len() });
        }
        let mut grid = TileGrid::new(chunk_size);
        for (k, t) in codes.into_iter().enumerate() {
            grid.set(k / chunk_size, k % chunk_size, t);
        }
        out.insert(coord, grid);
    }
    Ok(out)
}

/// Writes the seed and both layers into `dir`, creating it if needed.
pub fn save_world(dir: &Path, seed: i64, store: &ChunkStore) -> Result<(), SaveError> {
    fs::create_dir_all(dir)?;
    for layer in [Layer::Front, Layer::Back] {
        let f = fs::File::create(dir.join(layer_file(layer)))?;
        write_layer(store, layer, BufWriter::new(f))?;
    }
    fs::write(dir.join(SEED_FILE), format!("{seed}\n"))?;
    log::info!("saved {} chunks to {}", store.len(), dir.display());
    Ok(())
}

/// Reads a save written by [`save_world`].
pub fn load_world(dir: &Path, chunk_size: usize) -> Result<WorldSave, SaveError> {
    let raw_seed = fs::read_to_string(dir.join(SEED_FILE))?;
    let seed = raw_seed.trim().parse::<i64>().map_err(|_| SaveError::BadSeed(raw_seed.trim().to_string()))?;

    let read = |layer| -> Result<_, SaveError> {
        let path = dir.join(layer_file(layer));
        read_layer(&fs::read_to_string(path)?, chunk_size, layer)
    };
    let front = read(Layer::Front)?;
    let mut back = read(Layer::Back)?;

    let mut store = ChunkStore::new(chunk_size);
    for (coord, f) in front {
        let b = back.remove(&coord).ok_or(SaveError::MissingLayer(coord.cx, coord.cy))?;
        store.insert(coord, StoredChunk { front: f, back: b });
    }
    if let Some(c) = back.keys().next() {
        return Err(SaveError::MissingLayer(c.cx, c.cy));
    }
    log::info!("loaded {} chunks from {}", store.len(), dir.display());
    Ok(WorldSave { seed, store })
}

/// [`load_world`], with any failure treated as "no existing save".
pub fn try_load_world(dir: &Path, chunk_size: usize) -> Option<WorldSave> {
    match load_world(dir, chunk_size) {
        Ok(save) => Some(save),
        Err(SaveError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("no save at {}", dir.display());
            None
        }
        Err(e) => {
            log::warn!("ignoring unreadable save at {}: {e}", dir.display());
            None
        }
    }
}
