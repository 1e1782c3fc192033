//! Off-thread color-set generation.
//!
//! Requests go over an mpsc channel and each carries a oneshot for its reply.
//! Generation itself runs under `spawn_blocking` so a slow search never stalls
//! the async side.

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::difficulty::RoundParameters;
use crate::generator::{ColorSet, ColorSetGenerator};

const QUEUE_DEPTH: usize = 16;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkerError {
    #[error("Generation worker has stopped")]
    Stopped,
}

struct Request {
    params: RoundParameters,
    reply: oneshot::Sender<ColorSet>,
}

/// Handle to a background generation task. Clones share the same task; it
/// exits once every handle is dropped.
#[derive(Clone)]
pub struct GenerationWorker {
    tx: mpsc::Sender<Request>,
}

impl GenerationWorker {
    /// Spawn on the current tokio runtime.
    pub fn spawn(generator: ColorSetGenerator) -> Self {
        Self::spawn_with_rng(generator, StdRng::from_entropy())
    }

    pub fn spawn_with_rng(generator: ColorSetGenerator, rng: StdRng) -> Self {
        let (tx, mut rx) = mpsc::channel::<Request>(QUEUE_DEPTH);

        tokio::spawn(async move {
            let mut state = Some((generator, rng));
            while let Some(request) = rx.recv().await {
                let Some((generator, mut rng)) = state.take() else {
                    break;
                };
                let params = request.params;
                let joined = tokio::task::spawn_blocking(move || {
                    let set = generator.generate(params.option_count, params.similarity, &mut rng);
                    (generator, rng, set)
                })
                .await;

                match joined {
                    Ok((generator, rng, set)) => {
                        state = Some((generator, rng));
                        if request.reply.send(set).is_err() {
                            debug!("generation requester went away");
                        }
                    }
                    Err(err) => {
                        warn!("generation task failed: {err}");
                        break;
                    }
                }
            }
            debug!("generation worker exiting");
        });

        Self { tx }
    }

    pub async fn generate(&self, params: RoundParameters) -> Result<ColorSet, WorkerError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request { params, reply })
            .await
            .map_err(|_| WorkerError::Stopped)?;
        rx.await.map_err(|_| WorkerError::Stopped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::DifficultyCurve;

    #[tokio::test]
    async fn test_worker_generates_sets_for_requested_params() {
        let worker = GenerationWorker::spawn_with_rng(
            ColorSetGenerator::default(),
            StdRng::seed_from_u64(7),
        );
        let curve = DifficultyCurve::default();

        for level in [1, 15, 40, 90] {
            let params = curve.params_for(level);
            let set = worker.generate(params).await.unwrap();
            assert_eq!(set.options.len(), params.option_count);
            assert!(set.is_well_formed());
        }
    }

    #[tokio::test]
    async fn test_clones_share_one_worker() {
        let worker = GenerationWorker::spawn(ColorSetGenerator::default());
        let params = DifficultyCurve::default().params_for(5);

        let a = worker.clone();
        let b = worker.clone();
        let (left, right) = tokio::join!(a.generate(params), b.generate(params));
        assert!(left.unwrap().is_well_formed());
        assert!(right.unwrap().is_well_formed());
    }
}
