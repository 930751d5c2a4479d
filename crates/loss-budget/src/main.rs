//! Fiber Loss Budget CLI
//!
//! Usage:
//!   loss-calc standards
//!   loss-calc budget --standard OS2 --distance 5000 --splices 4 --connectors 2
//!   loss-calc link --segment OS2@1550nm:2.5km:2:2 --segment OS2:800m:1:2 --application 10G
//!   loss-calc guide OM4
//!
//! `--json` prints the contract JSON instead of the text report and
//! `--output` writes it to a file.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use loss_budget::{
    analyze_link, parse_request, report, Catalog, CustomCoefficients, LinkRequest, LossBasis,
    LossBudgetError, SegmentInput, DEFAULT_APPLICATION, DEFAULT_SAFETY_MARGIN_DB,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "loss-calc",
    about = "Fiber-optic insertion loss budget calculator"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Print JSON instead of a text report
    #[arg(long, global = true)]
    json: bool,

    /// Write the JSON result to this file
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the fiber standards in the reference table
    Standards,

    /// Per-wavelength max and typical loss of a single fiber run
    Budget {
        /// Fiber standard code (OS2, OM3, OM4, OM5)
        #[arg(short, long)]
        standard: String,

        /// Link length in meters
        #[arg(short, long)]
        distance: String,

        /// Number of fusion splices
        #[arg(long, default_value = "0")]
        splices: String,

        /// Number of mated connector pairs
        #[arg(long, default_value = "0")]
        connectors: String,
    },

    /// Total loss of up to three segments against an application budget
    Link {
        /// CODE[@WAVELENGTH]:DISTANCE[m|km][:SPLICES[:CONNECTORS]]
        #[arg(long = "segment", required = true)]
        segments: Vec<String>,

        /// Safety margin in dB
        #[arg(long, default_value_t = DEFAULT_SAFETY_MARGIN_DB)]
        safety_margin: f64,

        /// Application budget to compare against
        #[arg(long, default_value = DEFAULT_APPLICATION)]
        application: String,

        /// Coefficient column to use
        #[arg(long, value_enum, default_value_t = Basis::Typical)]
        basis: Basis,

        /// Custom coefficients ATTEN_DB_KM,SPLICE_DB,CONNECTOR_DB
        #[arg(long)]
        custom: Option<String>,
    },

    /// Which OTDR wavelength report to read for a fiber
    Guide {
        /// Fiber standard code
        standard: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Basis {
    Typical,
    Max,
}

impl From<Basis> for LossBasis {
    fn from(basis: Basis) -> Self {
        match basis {
            Basis::Typical => LossBasis::Typical,
            Basis::Max => LossBasis::Max,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so --json output stays clean
    let level = if args.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match &args.command {
        Command::Standards => {
            let catalog = Catalog::builtin();
            let standards: Vec<_> = catalog.iter().collect();
            let text = catalog
                .iter()
                .map(|s| {
                    let wavelengths: Vec<_> = s.wavelengths.iter().map(|w| w.label).collect();
                    format!(
                        "{:<4} {:<30} max {:>6} m  {}",
                        s.code,
                        s.display_name,
                        s.max_distance_meters,
                        wavelengths.join(", ")
                    )
                })
                .collect::<Vec<_>>()
                .join("\n");
            emit(&args, &standards, &text)
        }
        Command::Budget {
            standard,
            distance,
            splices,
            connectors,
        } => {
            debug!(%standard, %distance, %splices, %connectors, "budget request");
            match parse_request(standard, distance, splices, connectors).and_then(|r| r.compute()) {
                Ok(result) => emit(&args, &result, &report::render_loss_budget(&result)),
                Err(err) => fail(&args, &err),
            }
        }
        Command::Link {
            segments,
            safety_margin,
            application,
            basis,
            custom,
        } => {
            let analysis = build_link_request(
                segments,
                *safety_margin,
                application,
                *basis,
                custom.as_deref(),
            )
            .and_then(|request| analyze_link(&request));
            match analysis {
                Ok(analysis) => emit(&args, &analysis, &report::render_link_analysis(&analysis)),
                Err(err) => fail(&args, &err),
            }
        }
        Command::Guide { standard } => match Catalog::builtin().get(standard) {
            Ok(standard) => emit(&args, standard, &report::otdr_guidance(standard)),
            Err(err) => fail(&args, &err.into()),
        },
    }
}

fn build_link_request(
    segments: &[String],
    safety_margin_db: f64,
    application: &str,
    basis: Basis,
    custom: Option<&str>,
) -> loss_budget::Result<LinkRequest> {
    let segments = segments
        .iter()
        .map(|s| s.parse::<SegmentInput>())
        .collect::<loss_budget::Result<Vec<_>>>()?;

    let custom = custom.map(parse_custom).transpose()?;

    Ok(LinkRequest {
        segments,
        safety_margin_db,
        application: application.to_string(),
        basis: basis.into(),
        custom,
    })
}

fn parse_custom(text: &str) -> loss_budget::Result<CustomCoefficients> {
    use loss_budget::{input::parse_non_negative, InputField, RawField};

    let parts: Vec<&str> = text.split(',').collect();
    let [atten, splice, connector] = parts.as_slice() else {
        return Err(LossBudgetError::invalid(
            InputField::CustomAttenuation,
            text,
            "expected ATTEN_DB_KM,SPLICE_DB,CONNECTOR_DB",
        ));
    };

    Ok(CustomCoefficients {
        attenuation_db_per_km: parse_non_negative(
            InputField::CustomAttenuation,
            &RawField::from(*atten),
        )?,
        splice_db: parse_non_negative(InputField::CustomSplice, &RawField::from(*splice))?,
        connector_db: parse_non_negative(
            InputField::CustomConnector,
            &RawField::from(*connector),
        )?,
    })
}

/// Write the result or error report to `--output`, replacing any earlier run
fn write_output<T: Serialize + ?Sized>(output: Option<&Path>, value: &T) -> Result<()> {
    if let Some(path) = output {
        report::write_json(path, value)?;
        debug!("wrote {:?}", path);
    }
    Ok(())
}

fn emit<T: Serialize + ?Sized>(args: &Args, value: &T, text: &str) -> Result<()> {
    write_output(args.output.as_deref(), value)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{text}");
    }
    Ok(())
}

fn fail(args: &Args, err: &LossBudgetError) -> Result<()> {
    let report = err.report();
    write_output(args.output.as_deref(), &report)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        eprintln!("{}", report::render_error(&report));
    }
    std::process::exit(1);
}
