use std::sync::Arc;

use crate::algorithm::Algorithm;
use crate::composer::ChildOptions;
use crate::context::ExecContext;
use crate::datastore::Dataset;
use crate::error::AlgoError;
use crate::property::{Direction, Property, PropertyStore};

/// Divide a dataset by its integral
///
/// Runs `Integrate` then `Scale` as children, each over half of the
/// progress range.
#[derive(Debug, Default)]
pub struct Normalise;

impl Algorithm for Normalise {
    fn name(&self) -> &str {
        "Normalise"
    }

    fn version(&self) -> u32 {
        1
    }

    fn category(&self) -> &str {
        "Arithmetic"
    }

    fn summary(&self) -> &str {
        "Scales a dataset so that its y values sum to one."
    }

    fn init(&mut self, props: &mut PropertyStore) -> Result<(), AlgoError> {
        props.declare(Property::dataset("InputDataset", Direction::Input))?;
        props.declare(Property::dataset("OutputDataset", Direction::Output))
    }

    fn exec(&mut self, ctx: &mut ExecContext<'_>) -> Result<(), AlgoError> {
        let input: Arc<Dataset> = ctx.get("InputDataset")?;

        let mut integrate = ctx.create_child("Integrate", ChildOptions::new().progress(0.0, 0.5))?;
        integrate.set_property("InputDataset", Arc::clone(&input))?;
        integrate.execute_checked()?;
        let total: f64 = integrate.get_property("Result")?;
        if total == 0.0 {
            return Err(AlgoError::execution(format!(
                "dataset '{}' sums to zero and cannot be normalised",
                input.name()
            )));
        }

        ctx.interruption_point()?;
        let mut scale = ctx.create_child("Scale", ChildOptions::new().progress(0.5, 1.0))?;
        scale.set_property("InputDataset", Arc::clone(&input))?;
        scale.set_property("Factor", 1.0 / total)?;
        let mut target = ctx.properties().get_text("OutputDataset")?;
        if target.is_empty() {
            target = format!("{}_normalised", input.name());
        }
        scale.set_property_value("OutputDataset", &target)?;
        scale.execute_checked()?;
        let scaled: Arc<Dataset> = scale.get_property("OutputDataset")?;

        ctx.set_output_dataset("OutputDataset", (*scaled).clone())?;
        Ok(())
    }
}
