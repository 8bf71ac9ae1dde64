use std::{io::Write, path::PathBuf};

use clap::Args;
use tessera::fixtures::Scenario;

#[derive(Debug, Args)]
pub(crate) struct QuoteArgs {
    /// Path to a YAML checkout scenario
    #[arg(long)]
    fixture: PathBuf,
}

pub(crate) fn run(args: &QuoteArgs, out: &mut impl Write) -> Result<(), String> {
    let scenario = Scenario::load(&args.fixture)
        .map_err(|error| format!("failed to load {}: {error}", args.fixture.display()))?;

    execute(&scenario, out)
}

fn execute(scenario: &Scenario, out: &mut impl Write) -> Result<(), String> {
    let quote = scenario
        .quote()
        .map_err(|error| format!("failed to price scenario: {error}"))?;

    quote
        .pricing
        .write_summary(&mut *out)
        .map_err(|error| format!("failed to write output: {error}"))?;

    if let Some(code) = &quote.applied_coupon {
        super::write_line(out, format!("coupon {code} applied"))?;
    }

    if let Some(rejection) = &quote.coupon_rejection {
        super::write_line(out, format!("coupon not applied: {rejection}"))?;
    }

    if quote.pricing.ships_free() {
        super::write_line(out, "ships free")?;
    }

    Ok(())
}
