use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::Level;

use cruise_emissions::databank::{self, LtoRecord};
use cruise_emissions::error::Result;
use cruise_emissions::io::{write_records_file, write_summary_file, RunSummary, Table, TableRecord};
use cruise_emissions::methods::{bffm2, dlr, meem, p3t3, NvpmReference, P3t3Config, SeaLevelCalibration};
use cruise_emissions::physics::FlightCondition;
use cruise_emissions::reference::{load_lto_table, presets};
use cruise_emissions::RunConfig;

#[derive(Parser, Debug)]
#[command(name = "cruise-emissions")]
#[command(version)]
#[command(about = "Cruise emission indices from ICAO LTO certification data")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON run configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Result CSV path (defaults to a per-method file name)
    #[arg(short, long, global = true)]
    out: Option<PathBuf>,

    /// Also write a JSON run summary here
    #[arg(long, global = true)]
    summary: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

/// Overrides for the configured flight condition.
#[derive(Args, Debug)]
struct ConditionArgs {
    /// Pressure altitude, ft
    #[arg(long)]
    altitude_ft: Option<f64>,

    #[arg(long)]
    mach: Option<f64>,
}

impl ConditionArgs {
    fn apply(&self, condition: &mut FlightCondition) {
        if let Some(ft) = self.altitude_ft {
            *condition = FlightCondition::from_feet(ft, condition.mach);
        }
        if let Some(mach) = self.mach {
            condition.mach = mach;
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Boeing Fuel Flow Method 2 (NOx)
    Bffm2 {
        /// LTO table with `Wf` and the EI column (built-in validation data if omitted)
        #[arg(long)]
        lto: Option<PathBuf>,

        #[arg(long, default_value = "EINOx")]
        ei_column: String,

        /// Cruise fuel flows, column `Wf` (built-in sweep if omitted)
        #[arg(long)]
        fuel_flow: Option<PathBuf>,

        #[command(flatten)]
        condition: ConditionArgs,
    },
    /// DLR fuel flow method (NOx), per-row altitude and Mach
    Dlr {
        /// LTO table with `Wf` and the EI column (built-in example if omitted)
        #[arg(long)]
        lto: Option<PathBuf>,

        #[arg(long, default_value = "EINOx")]
        ei_column: String,

        /// Operating points with height in metres (`height_m` or `height`), `Mach`, `Wf`
        #[arg(long)]
        points: Option<PathBuf>,
    },
    /// P3-T3 method (NOx)
    P3t3 {
        /// Sea-level calibration with `T3`, `P3`, `EINOx`
        #[arg(long)]
        calibration: PathBuf,

        /// In-flight T3/P3 table, optionally with height in feet (`height_ft` or `height`) and `Mach`
        #[arg(long)]
        cruise: PathBuf,

        /// Engine-deck sweep: height (ft) and Mach required per row, dry air
        #[arg(long)]
        npss: bool,

        #[command(flatten)]
        condition: ConditionArgs,
    },
    /// MEEM nvPM mass and number at altitude
    Meem {
        /// Certification nvPM table with `EImass`, `EInum` and `F00` or `Thrust`
        #[arg(long)]
        nvpm: PathBuf,

        /// Fuel enrichment factor
        #[arg(long)]
        enrichment_factor: Option<f64>,

        #[command(flatten)]
        condition: ConditionArgs,
    },
    /// Extract one engine's LTO table from the emissions databank
    Databank {
        /// Gaseous emissions sheet exported as CSV
        #[arg(long)]
        gaseous: PathBuf,

        /// nvPM sheet exported as CSV
        #[arg(long)]
        nvpm: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };

    match &cli.command {
        Command::Bffm2 { lto, ei_column, fuel_flow, condition } => {
            condition.apply(&mut config.bffm2.condition);
            let reference = match lto {
                Some(path) => load_lto_table(path, ei_column)?,
                None => presets::bffm2_validation(),
            };
            let fuel_flow = match fuel_flow {
                Some(path) => Table::read_file(path)?.numbers("Wf")?,
                None => presets::bffm2_cruise_fuel_flow(),
            };

            let records = bffm2::run(&config.bffm2, &reference, &fuel_flow)?;
            print_header("BFFM2", Some(&config.bffm2.condition));
            print_rows(&records);

            let ei: Vec<f64> = records.iter().map(|r| r.ei_alt).collect();
            let summary = RunSummary::from_results("BFFM2", vec![config.bffm2.condition], &ei);
            finish(cli, "BFFM2-Alt.csv", &records, summary)
        }

        Command::Dlr { lto, ei_column, points } => {
            let reference = match lto {
                Some(path) => load_lto_table(path, ei_column)?,
                None => presets::dlr_example(),
            };
            let points = match points {
                Some(path) => dlr::load_points(&Table::read_file(path)?)?,
                None => dlr::points(&[1000.0, 2000.0], &[0.5, 0.6], &[20.0, 15.0])?,
            };

            let records = dlr::run(&config.dlr, &reference, &points)?;
            print_header("DLR", None);
            print_rows(&records);

            let ei: Vec<f64> = records.iter().map(|r| r.ei_alt).collect();
            let conditions = records.iter().map(|r| r.condition).collect();
            let summary = RunSummary::from_results("DLR", conditions, &ei);
            finish(cli, "DLR-Alt.csv", &records, summary)
        }

        Command::P3t3 { calibration, cruise, npss, condition } => {
            let mut p3t3_config = if *npss {
                P3t3Config { humidity: P3t3Config::npss().humidity, ..config.p3t3.clone() }
            } else {
                config.p3t3.clone()
            };
            condition.apply(&mut p3t3_config.condition);

            let calibration = SeaLevelCalibration::from_table(&Table::read_file(calibration)?)?;
            let cruise = Table::read_file(cruise)?;
            let points = if *npss {
                p3t3::load_sweep_points(&cruise)?
            } else {
                p3t3::load_points(&cruise, p3t3_config.condition)?
            };

            let records = p3t3::run(&p3t3_config, &calibration, &points)?;
            print_header("P3T3", (!*npss).then_some(&p3t3_config.condition));
            print_rows(&records);

            let ei: Vec<f64> = records.iter().map(|r| r.ei_alt).collect();
            let mut conditions: Vec<FlightCondition> = points.iter().map(|p| p.condition).collect();
            conditions.dedup();
            let summary = RunSummary::from_results("P3T3", conditions, &ei);
            finish(cli, p3t3_output(*npss), &records, summary)
        }

        Command::Meem { nvpm, enrichment_factor, condition } => {
            condition.apply(&mut config.meem.condition);
            if let Some(ef) = enrichment_factor {
                config.meem.enrichment_factor = *ef;
            }

            let reference = NvpmReference::from_table(&Table::read_file(nvpm)?, config.meem.rated_thrust_kn)?;
            let records = meem::run(&config.meem, &reference)?;
            print_header("MEEM", Some(&config.meem.condition));
            print_rows(&records);

            let ei: Vec<f64> = records.iter().map(|r| r.ei_mass_alt).collect();
            let summary = RunSummary::from_results("MEEM", vec![config.meem.condition], &ei);
            finish(cli, "nvPM-Alt.csv", &records, summary)
        }

        Command::Databank { gaseous, nvpm } => {
            let records = databank::extract(
                &Table::read_file(gaseous)?,
                &Table::read_file(nvpm)?,
                &config.databank,
            )?;
            print_header("EDB", None);
            print_rows::<LtoRecord>(&records);

            let ei: Vec<f64> = records.iter().map(|r| r.ei_nox).collect();
            let summary = RunSummary::from_results("EDB", Vec::new(), &ei);
            finish(cli, "LEAP1A-ICAO.csv", &records, summary)
        }
    }
}

/// Default result file; the engine-deck sweep gets its own so the two
/// variants do not overwrite each other.
fn p3t3_output(npss: bool) -> &'static str {
    if npss {
        "P3T3-L1A-climb.csv"
    } else {
        "P3T3-T3.csv"
    }
}

/// Write the result table and, if requested, the JSON summary.
fn finish<R: TableRecord>(cli: &Cli, default_out: &str, records: &[R], summary: RunSummary) -> Result<()> {
    let out = cli.out.as_deref().unwrap_or_else(|| Path::new(default_out));
    write_records_file(out, records)?;
    if let Some(path) = &cli.summary {
        write_summary_file(path, &summary.with_output(out))?;
    }
    println!("  Wrote {} rows to {}", records.len(), out.display());
    println!("====================================================================");
    println!();
    Ok(())
}

// ---------------------------------------------------------------------------
// Console output
// ---------------------------------------------------------------------------

fn print_header(method: &str, condition: Option<&FlightCondition>) {
    println!();
    println!("====================================================================");
    println!("  CRUISE EMISSIONS — {}", method);
    println!("====================================================================");
    if let Some(c) = condition {
        println!(
            "  Altitude:  {:>8.0} ft ({:.0} m)    Mach: {:>5.2}",
            c.altitude_ft(),
            c.altitude_m,
            c.mach
        );
    }
    println!();
}

fn print_rows<R: TableRecord>(records: &[R]) {
    let header = R::header();
    let line: Vec<String> = header.iter().map(|h| format!("{:>12}", h)).collect();
    println!("  {}", line.join(""));
    println!("  {}", "─".repeat(12 * header.len()));
    for r in records {
        let line: Vec<String> = r.fields().iter().map(|v| format_value(*v)).collect();
        println!("  {}", line.join(""));
    }
    println!();
}

fn format_value(v: f64) -> String {
    if v != 0.0 && (v.abs() >= 1.0e6 || v.abs() < 1.0e-3) {
        format!("{:>12.4e}", v)
    } else {
        format!("{:>12.4}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn p3t3_variants_write_separate_files() {
        assert_eq!(p3t3_output(false), "P3T3-T3.csv");
        assert_eq!(p3t3_output(true), "P3T3-L1A-climb.csv");
    }

    #[test]
    fn npss_flag_parses() {
        let cli = Cli::try_parse_from([
            "cruise-emissions",
            "p3t3",
            "--calibration",
            "data/model-EI-SL.csv",
            "--cruise",
            "data/L1A-climb-sweep.csv",
            "--npss",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::P3t3 { npss: true, .. }));
    }
}
