use std::thread;
use std::time::{Duration, Instant};

use crate::algorithm::Algorithm;
use crate::context::ExecContext;
use crate::error::AlgoError;
use crate::property::{Property, PropertyStore};
use crate::validator::Bounded;

const TICK: Duration = Duration::from_millis(10);

/// Sleep for a while, checking for cancellation
///
/// A negative duration waits until cancelled.
#[derive(Debug, Default)]
pub struct Pause;

impl Algorithm for Pause {
    fn name(&self) -> &str {
        "Pause"
    }

    fn version(&self) -> u32 {
        1
    }

    fn category(&self) -> &str {
        "Utility"
    }

    fn summary(&self) -> &str {
        "Pauses for the given number of seconds."
    }

    fn init(&mut self, props: &mut PropertyStore) -> Result<(), AlgoError> {
        props.declare(
            Property::input("Duration", 1.0)
                .with_validator(Bounded::any())
                .with_doc("Seconds to wait; negative waits until cancelled"),
        )
    }

    fn exec(&mut self, ctx: &mut ExecContext<'_>) -> Result<(), AlgoError> {
        let seconds: f64 = ctx.get("Duration")?;
        let start = Instant::now();
        loop {
            ctx.interruption_point()?;
            let elapsed = start.elapsed().as_secs_f64();
            if seconds >= 0.0 {
                if elapsed >= seconds {
                    break;
                }
                ctx.progress(elapsed / seconds, format!("Slept for {elapsed:.1} seconds"));
            } else {
                ctx.progress(0.0, format!("Slept for {elapsed:.1} seconds"));
            }
            thread::sleep(TICK);
        }
        Ok(())
    }
}
