use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::ScalerError,
    model::{LabelSelector, MetricSample, MetricSpec},
};

pub mod weather;

/// Contract the host autoscaling controller polls on its own schedule.
///
/// Every call is independent; implementations hold only immutable
/// configuration and shared clients, so one instance may be polled
/// concurrently. Dropping a returned future abandons the request.
#[async_trait]
pub trait Scaler: Send + Sync + Debug {
    /// Whether the workload should be scaled up from zero.
    async fn is_active(&self) -> Result<bool, ScalerError>;

    /// Metrics the autoscaler should target. Performs no I/O.
    fn get_metric_spec_for_scaling(&self) -> Vec<MetricSpec>;

    /// Current value for `metric_name`.
    async fn get_metrics(
        &self,
        metric_name: &str,
        selector: &LabelSelector,
    ) -> Result<Vec<MetricSample>, ScalerError>;

    async fn close(&self) -> Result<(), ScalerError>;
}
