use std::collections::BTreeMap;

use crate::algorithm::Algorithm;
use crate::context::ExecContext;
use crate::datastore::Dataset;
use crate::error::AlgoError;
use crate::property::{Direction, Property, PropertyStore};
use crate::validator::MinLength;

/// Build a dataset from literal values
#[derive(Debug, Default)]
pub struct CreateDataset;

impl Algorithm for CreateDataset {
    fn name(&self) -> &str {
        "CreateDataset"
    }

    fn version(&self) -> u32 {
        1
    }

    fn category(&self) -> &str {
        "Utility"
    }

    fn summary(&self) -> &str {
        "Creates a dataset from lists of x and y values."
    }

    fn init(&mut self, props: &mut PropertyStore) -> Result<(), AlgoError> {
        props.declare(
            Property::dataset("OutputDataset", Direction::Output)
                .with_doc("Name of the dataset to create"),
        )?;
        props.declare(
            Property::input("DataY", Vec::<f64>::new())
                .with_validator(MinLength::new(1))
                .with_doc("Y values"),
        )?;
        props.declare(
            Property::input("DataX", Vec::<f64>::new())
                .with_doc("X values; defaults to 0, 1, 2, ..."),
        )
    }

    fn validate_inputs(&self, props: &PropertyStore) -> BTreeMap<String, String> {
        let mut problems = BTreeMap::new();
        let x: Vec<f64> = props.get("DataX").unwrap_or_default();
        let y: Vec<f64> = props.get("DataY").unwrap_or_default();
        if !x.is_empty() && x.len() != y.len() {
            problems.insert(
                "DataX".to_string(),
                format!("has {} values but DataY has {}", x.len(), y.len()),
            );
        }
        problems
    }

    fn exec(&mut self, ctx: &mut ExecContext<'_>) -> Result<(), AlgoError> {
        let x: Vec<f64> = ctx.get("DataX")?;
        let y: Vec<f64> = ctx.get("DataY")?;
        let dataset = if x.is_empty() {
            Dataset::from_values("", y)
        } else {
            Dataset::new("", x, y)
        };
        ctx.set_output_dataset("OutputDataset", dataset)?;
        Ok(())
    }
}
