//! Built-in algorithms
//!
//! Small, dependency-free algorithms over [`crate::Dataset`] used by the CLI
//! and the tests. Every one is registered by [`register_builtins`].

mod create_dataset;
mod group_datasets;
mod integrate;
mod normalise;
mod pause;
mod scale;

pub use create_dataset::CreateDataset;
pub use group_datasets::GroupDatasets;
pub use integrate::Integrate;
pub use normalise::Normalise;
pub use pause::Pause;
pub use scale::Scale;

use crate::error::AlgoError;
use crate::factory::AlgorithmFactory;

pub fn register_builtins(factory: &AlgorithmFactory) -> Result<(), AlgoError> {
    factory.subscribe::<CreateDataset>()?;
    factory.subscribe::<GroupDatasets>()?;
    factory.subscribe::<Integrate>()?;
    factory.subscribe::<Normalise>()?;
    factory.subscribe::<Pause>()?;
    factory.subscribe::<Scale>()?;
    Ok(())
}
