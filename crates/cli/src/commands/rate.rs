//! Rate command implementation.

use anyhow::{Context, Result};
use installments_sim::{
    average_rate, curve_slope, evaluate_curve, CurveParameters, DEFAULT_SLOPE_EPSILON,
};
use serde::Serialize;

use crate::cli::{OutputFormat, RateArgs};
use crate::output::{format_rate_detail, signed_wad_string, wad_string};
use crate::snapshot::{parse_signed_wad, parse_wad};

#[derive(Serialize)]
struct RateOutput {
    a: String,
    b: String,
    u_max: String,
    utilization: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<String>,
    rate: String,
    slope: String,
}

pub fn run_rate(args: &RateArgs, format: OutputFormat) -> Result<()> {
    let curve = CurveParameters::new(
        parse_wad(&args.a).context("Invalid --a")?,
        parse_signed_wad(&args.b).context("Invalid --b")?,
        parse_wad(&args.u_max).context("Invalid --u-max")?,
    )?;
    let utilization = parse_wad(&args.utilization).context("Invalid --utilization")?;
    let to = args
        .to
        .as_deref()
        .map(parse_wad)
        .transpose()
        .context("Invalid --to")?;

    let rate = match to {
        Some(to) => average_rate(&curve, utilization, to),
        None => evaluate_curve(&curve, utilization),
    }
    .context("Failed to evaluate curve")?;
    let slope = curve_slope(&curve, to.unwrap_or(utilization), DEFAULT_SLOPE_EPSILON)
        .context("Failed to evaluate curve slope")?;

    match format {
        OutputFormat::Table => {
            print!("{}", format_rate_detail(&curve, utilization, to, rate, slope));
        }
        OutputFormat::Json => {
            let output = RateOutput {
                a: wad_string(curve.a),
                b: signed_wad_string(curve.b),
                u_max: wad_string(curve.u_max),
                utilization: wad_string(utilization),
                to: to.map(wad_string),
                rate: wad_string(rate),
                slope: wad_string(slope),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
