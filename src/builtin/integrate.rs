use std::sync::Arc;

use crate::algorithm::Algorithm;
use crate::context::ExecContext;
use crate::datastore::Dataset;
use crate::error::AlgoError;
use crate::property::{Direction, Property, PropertyStore};

/// Sum of the y values
#[derive(Debug, Default)]
pub struct Integrate;

impl Algorithm for Integrate {
    fn name(&self) -> &str {
        "Integrate"
    }

    fn version(&self) -> u32 {
        1
    }

    fn category(&self) -> &str {
        "Arithmetic"
    }

    fn summary(&self) -> &str {
        "Sums the y values of a dataset."
    }

    fn init(&mut self, props: &mut PropertyStore) -> Result<(), AlgoError> {
        props.declare(Property::dataset("InputDataset", Direction::Input))?;
        props.declare(Property::output("Result", 0.0).with_doc("Sum of all y values"))
    }

    fn exec(&mut self, ctx: &mut ExecContext<'_>) -> Result<(), AlgoError> {
        let input: Arc<Dataset> = ctx.get("InputDataset")?;
        ctx.interruption_point()?;
        let total: f64 = input.y().iter().sum();
        ctx.progress(1.0, "Integrated");
        ctx.set("Result", total)
    }
}
