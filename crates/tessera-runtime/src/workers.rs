use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, unbounded};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tessera_chunk::{StoredChunk, WorldGenerator};
use tessera_world::{ChunkCoord, ChunkFill};

#[derive(Clone, Debug)]
pub struct GenJob {
    pub coord: ChunkCoord,
    pub ticket: u64,
    /// Stored tiles to replay instead of generating.
    pub stored: Option<StoredChunk>,
    pub rng_seed: u64,
}

pub struct GenOut {
    pub coord: ChunkCoord,
    pub ticket: u64,
    pub fill: ChunkFill,
    pub restored: bool,
    pub t_gen_ms: u32,
}

fn process_gen_job(job: GenJob, generator: &WorldGenerator, tx: &Sender<GenOut>) {
    let GenJob { coord, ticket, stored, rng_seed } = job;
    let t0 = Instant::now();
    let restored = stored.is_some();
    let fill = match stored {
        Some(s) => generator.restore(coord, &s),
        None => generator.fill_fresh(coord, &mut StdRng::seed_from_u64(rng_seed)),
    };
    let t_gen_ms = t0.elapsed().as_millis().min(u128::from(u32::MAX)) as u32;
    let _ = tx.send(GenOut { coord, ticket, fill, restored, t_gen_ms });
}

/// Chunk fill workers. Jobs go out over one channel and finished fills come
/// back over another; nothing here touches live chunks.
pub struct GenWorkers {
    job_tx: Sender<GenJob>,
    res_tx: Sender<GenOut>,
    res_rx: Receiver<GenOut>,
    pool: Option<Arc<ThreadPool>>,
    generator: WorldGenerator,
    queued: Arc<AtomicUsize>,
    inflight: Arc<AtomicUsize>,
}

impl GenWorkers {
    /// Starts `workers` threads, or none when zero: jobs then run inside
    /// [`submit`](Self::submit).
    pub fn new(generator: WorldGenerator, workers: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        let (job_tx, job_rx) = unbounded::<GenJob>();
        let (res_tx, res_rx) = unbounded::<GenOut>();
        let queued = Arc::new(AtomicUsize::new(0));
        let inflight = Arc::new(AtomicUsize::new(0));

        let pool = if workers > 0 {
            let pool = Arc::new(
                ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .thread_name(|i| format!("tessera-gen-{i}"))
                    .build()?,
            );
            for _ in 0..workers {
                let rx = job_rx.clone();
                let tx = res_tx.clone();
                let generator = generator.clone();
                let queued = queued.clone();
                let inflight = inflight.clone();
                pool.spawn(move || {
                    while let Ok(job) = rx.recv() {
                        queued.fetch_sub(1, Ordering::Relaxed);
                        inflight.fetch_add(1, Ordering::Relaxed);
                        process_gen_job(job, &generator, &tx);
                        inflight.fetch_sub(1, Ordering::Relaxed);
                    }
                });
            }
            Some(pool)
        } else {
            None
        };

        Ok(Self { job_tx, res_tx, res_rx, pool, generator, queued, inflight })
    }

    pub fn submit(&self, job: GenJob) {
        if self.pool.is_none() {
            process_gen_job(job, &self.generator, &self.res_tx);
            return;
        }
        self.queued.fetch_add(1, Ordering::Relaxed);
        if self.job_tx.send(job).is_err() {
            self.queued.fetch_sub(1, Ordering::Relaxed);
        }
    }

    pub fn drain_results(&self) -> Vec<GenOut> {
        self.res_rx.try_iter().collect()
    }

    /// Blocks for the next finished fill.
    pub fn wait_result(&self) -> Option<GenOut> {
        self.res_rx.recv().ok()
    }

    pub fn queue_debug_counts(&self) -> (usize, usize) {
        (self.queued.load(Ordering::Relaxed), self.inflight.load(Ordering::Relaxed))
    }
}
