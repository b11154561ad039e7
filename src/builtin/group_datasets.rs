use crate::algorithm::Algorithm;
use crate::context::ExecContext;
use crate::error::AlgoError;
use crate::property::{Direction, Property, PropertyStore};
use crate::validator::MinLength;

/// Collect stored datasets into a group
#[derive(Debug, Default)]
pub struct GroupDatasets;

impl Algorithm for GroupDatasets {
    fn name(&self) -> &str {
        "GroupDatasets"
    }

    fn version(&self) -> u32 {
        1
    }

    fn category(&self) -> &str {
        "Utility"
    }

    fn summary(&self) -> &str {
        "Groups named datasets from the data store."
    }

    fn init(&mut self, props: &mut PropertyStore) -> Result<(), AlgoError> {
        props.declare(
            Property::input("InputDatasets", Vec::<String>::new())
                .with_validator(MinLength::new(1))
                .with_doc("Names of the datasets to group, in order"),
        )?;
        props.declare(Property::dataset("OutputDataset", Direction::Output))
    }

    fn process_groups_individually(&self) -> bool {
        false
    }

    fn exec(&mut self, ctx: &mut ExecContext<'_>) -> Result<(), AlgoError> {
        let names: Vec<String> = ctx.get("InputDatasets")?;
        let members = names
            .iter()
            .map(|name| {
                ctx.data()
                    .get_dataset(name)
                    .ok_or_else(|| AlgoError::DataNotFound { name: name.clone() })
            })
            .collect::<Result<Vec<_>, _>>()?;
        ctx.set_output_group("OutputDataset", members)?;
        Ok(())
    }
}
