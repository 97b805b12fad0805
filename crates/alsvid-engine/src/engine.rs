//! Async front end over the worker pool.

use std::sync::Arc;

use alsvid_combine::{CombineOutcome, CombineStatus};
use alsvid_estimation::{GroupingStrategy, PostprocessOutput, PreprocessOutput, strategy_by_name};
use alsvid_ir::Counts;
use alsvid_mitigation::DeviceTopology;
use tracing::{error, info};

use crate::config::{ConfigError, EngineConfig};
use crate::cpu;
use crate::error::{EngineError, EngineResult, Operation};
use crate::ops;
use crate::pool::WorkerPool;

/// Serves requests on a bounded pool of blocking workers.
///
/// Requests share nothing but the configuration; any number may be in
/// flight, at most [`Engine::workers`] run at once.
#[derive(Clone)]
pub struct Engine {
    config: Arc<EngineConfig>,
    pool: WorkerPool,
    strategy: Arc<dyn GroupingStrategy>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("workers", &self.pool.size())
            .field("strategy", &self.strategy.name())
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Engine sized to the CPUs available to this process.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        let workers = cpu::worker_count(config.workers.max_workers, cpu::effective_cpus());
        Self::with_workers(config, workers)
    }

    /// Engine with an explicit pool size.
    pub fn with_workers(config: EngineConfig, workers: usize) -> Result<Self, ConfigError> {
        config.validate()?;
        let strategy: Arc<dyn GroupingStrategy> = strategy_by_name(&config.estimation.grouping)
            .ok_or_else(|| {
                ConfigError::ValidationError(format!(
                    "Unknown grouping strategy: {}",
                    config.estimation.grouping
                ))
            })?
            .into();
        let pool = WorkerPool::new(workers);
        info!(
            workers = pool.size(),
            strategy = strategy.name(),
            "Engine ready"
        );
        Ok(Self {
            config: Arc::new(config),
            pool,
            strategy,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn workers(&self) -> usize {
        self.pool.size()
    }

    /// Combine programs; `max_qubits` defaults to the configured limit.
    ///
    /// A worker failure is reported as [`CombineStatus::Failure`].
    pub async fn combine(&self, programs: Vec<String>, max_qubits: Option<i64>) -> CombineOutcome {
        let max_qubits = max_qubits.unwrap_or(self.config.combine.max_qubits);
        self.pool
            .run(Operation::Combine, move || {
                Ok(ops::combine(&programs, max_qubits))
            })
            .await
            .unwrap_or_else(|e| {
                error!("Combine failed: {e}");
                e.into()
            })
    }

    /// Build measurement groups; `basis_gates` defaults to the configured set.
    pub async fn estimation_preprocess(
        &self,
        program: String,
        operator: String,
        basis_gates: Option<Vec<String>>,
        qubit_layout: Vec<u32>,
    ) -> EngineResult<PreprocessOutput> {
        let basis_gates = basis_gates.unwrap_or_else(|| self.config.estimation.basis_gates.clone());
        let strategy = Arc::clone(&self.strategy);
        self.pool
            .run(Operation::EstimationPreprocess, move || {
                ops::estimation_preprocess_with(
                    &program,
                    &operator,
                    &basis_gates,
                    &qubit_layout,
                    strategy.as_ref(),
                )
            })
            .await
    }

    pub async fn estimation_postprocess(
        &self,
        grouped_counts: Vec<Counts>,
        grouped_operators: String,
    ) -> EngineResult<PostprocessOutput> {
        self.pool
            .run(Operation::EstimationPostprocess, move || {
                ops::estimation_postprocess(&grouped_counts, &grouped_operators)
            })
            .await
    }

    pub async fn mitigate(
        &self,
        topology: DeviceTopology,
        counts: Counts,
        program: String,
    ) -> EngineResult<Counts> {
        self.pool
            .run(Operation::Mitigate, move || {
                ops::mitigate(&topology, &counts, &program)
            })
            .await
    }

    pub async fn divide(&self, counts: Counts, qubit_counts: Vec<u32>) -> EngineResult<Vec<Counts>> {
        self.pool
            .run(Operation::Divide, move || ops::divide(&counts, &qubit_counts))
            .await
    }

    /// Run an arbitrary job on the pool, tagged as `operation`.
    pub async fn run<T, F>(&self, operation: Operation, job: F) -> EngineResult<T>
    where
        F: FnOnce() -> EngineResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.pool.run(operation, job).await
    }
}

impl From<EngineError> for CombineOutcome {
    fn from(_: EngineError) -> Self {
        CombineOutcome {
            status: CombineStatus::Failure,
            combined_program: None,
            qubit_counts: vec![],
        }
    }
}
