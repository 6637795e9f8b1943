use super::{Backprop, BatchBackprop, BatchGradient, Gradient};
use crate::{
    matrix::Matrices,
    neural::{cost::Cost, Example, Network},
    prelude::*,
};
use log::debug;
use rayon::{prelude::*, ThreadPool, ThreadPoolBuilder};

/// [`BatchBackprop`] with the batch split into contiguous shards that are
/// computed on a dedicated pool of worker threads.
///
/// The pool is started by the constructor and shut down when the value is
/// dropped. Workers only share immutable data: the network, the cost and the
/// weights. Activations of every forward pass stay local to the worker.
///
/// Every shard mean is weighted by the number of examples in the shard and the
/// sum is divided by the size of the whole batch, so the result is the batch
/// mean for any number of workers, up to floating point summation order.
#[derive(Debug)]
pub struct ParallelBackprop<G> {
    batch: BatchBackprop<G>,
    pool: ThreadPool,
    workers: usize,
}

impl<'a> ParallelBackprop<Backprop<'a>> {
    pub fn new(network: &'a Network, cost: &'a dyn Cost, workers: usize) -> Result<Self> {
        Self::with_gradient(Backprop::new(network, cost), workers)
    }
}

impl<G: Gradient + Sync> ParallelBackprop<G> {
    pub fn with_gradient(gradient: G, workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(Error::InvalidConfig(
                "parallel backprop needs at least one worker".to_string(),
            ));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("backprop-worker-{index}"))
            .build()
            .map_err(|e| Error::WorkerPool(e.to_string()))?;

        Ok(Self {
            batch: BatchBackprop::with_gradient(gradient),
            pool,
            workers,
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl<G: Gradient + Sync> BatchGradient for ParallelBackprop<G> {
    fn compute(&self, weights: &Matrices, examples: &[Example]) -> Result<Matrices> {
        if examples.is_empty() {
            return Err(Error::EmptyBatch);
        }

        let shard_size = examples.len().div_ceil(self.workers);
        debug!(
            "Splitting {} examples into shards of {} across {} workers",
            examples.len(),
            shard_size,
            self.workers
        );

        // A panicking worker is resumed here, on the calling thread.
        let shards = self.pool.install(|| {
            examples
                .par_chunks(shard_size)
                .map(|shard| {
                    self.batch
                        .compute(weights, shard)
                        .map(|mean| (mean, shard.len()))
                })
                .collect::<Result<Vec<_>>>()
        })?;

        let mut gradient = Matrices::new(&weights.shapes());
        for (mean, len) in &shards {
            gradient = (&gradient + &(mean * *len as f64))?;
        }
        Ok(gradient / examples.len() as f64)
    }
}
