use crate::algorithm::Algorithm;
use crate::context::ExecContext;
use crate::datastore::Dataset;
use crate::error::AlgoError;
use crate::property::{Direction, Property, PropertyStore};
use crate::validator::OneOf;

use std::sync::Arc;

/// Multiply or offset every y value
#[derive(Debug, Default)]
pub struct Scale;

impl Algorithm for Scale {
    fn name(&self) -> &str {
        "Scale"
    }

    fn version(&self) -> u32 {
        1
    }

    fn category(&self) -> &str {
        "Arithmetic"
    }

    fn summary(&self) -> &str {
        "Multiplies the y values of a dataset by a factor, or adds it."
    }

    fn init(&mut self, props: &mut PropertyStore) -> Result<(), AlgoError> {
        props.declare(Property::dataset("InputDataset", Direction::Input))?;
        props.declare(Property::dataset("OutputDataset", Direction::Output))?;
        props.declare(Property::input("Factor", 1.0))?;
        props.declare(
            Property::input("Operation", "Multiply").with_validator(OneOf::new(["Multiply", "Add"])),
        )
    }

    fn exec(&mut self, ctx: &mut ExecContext<'_>) -> Result<(), AlgoError> {
        let input: Arc<Dataset> = ctx.get("InputDataset")?;
        let factor: f64 = ctx.get("Factor")?;
        let add = ctx.get::<String>("Operation")? == "Add";

        let n = input.len();
        let mut y = Vec::with_capacity(n);
        for (i, v) in input.y().iter().enumerate() {
            ctx.interruption_point()?;
            y.push(if add { v + factor } else { v * factor });
            ctx.progress((i + 1) as f64 / n as f64, "Scaling");
        }

        let output = Dataset::new(input.name(), input.x().to_vec(), y);
        ctx.set_output_dataset("OutputDataset", output)?;
        Ok(())
    }
}
