use clap::Parser;
use ff_flame::{CaseRequest, FlameError, FlameResult, RunConfig, RunContext, run_case};
use ff_results::{CaseStore, FieldStageStatus};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "flamespeed")]
#[command(about = "Freely propagating premixed flame with an applied electric field", long_about = None)]
struct Cli {
    /// Equivalence ratio (prompted when omitted)
    equivalence_ratio: Option<f64>,
    /// Electric field at the inlet in V/m (prompted when omitted)
    electric_field: Option<f64>,
    /// Refine the grid while solving (0 or 1)
    #[arg(default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=1))]
    refine_grid: u8,
    /// Solver verbosity: 0 warnings only, 1 progress, 2 detail, 3 trace
    #[arg(default_value_t = 1)]
    loglevel: u8,
    /// YAML file overriding the default run configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory receiving the tables, snapshot and manifest
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(max_level(cli.loglevel))
        .with_target(false)
        .init();

    if let Err(err) = run(cli) {
        eprintln!("✗ {err}");
        std::process::exit(-1);
    }
}

fn max_level(loglevel: u8) -> Level {
    match loglevel {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn run(cli: Cli) -> FlameResult<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();
    let phi = match cli.equivalence_ratio {
        Some(v) => v,
        None => prompt_f64(&mut input, &mut out, "Enter the equivalence ratio phi: ")?,
    };
    let e_field = match cli.electric_field {
        Some(v) => v,
        None => prompt_f64(&mut input, &mut out, "Enter the electric field [V/m]: ")?,
    };

    let config = match &cli.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    let ctx = RunContext::new(config)?;
    let store = CaseStore::new(cli.output_dir.clone())?;

    println!("Running flame: phi = {phi}, eField = {e_field} V/m");
    let request = CaseRequest {
        phi,
        e_field,
        refine_grid: cli.refine_grid == 1,
        loglevel: cli.loglevel,
    };
    let report = run_case(&ctx, &request, &store)?;
    let outcome = &report.outcome;

    println!("✓ Flame solved on {} points", outcome.profile.n_points());
    println!("  Adiabatic temperature: {:.1} K", outcome.t_adiabatic);
    println!("  Flame speed: {:.4} m/s", outcome.flame_speed);
    match &outcome.field_stage {
        FieldStageStatus::Converged => {
            println!("  Gap voltage: {:.6e} V", outcome.last_gap_voltage())
        }
        FieldStageStatus::Failed { message } => {
            println!("  Field-coupled stage failed, gap voltage NaN: {message}")
        }
    }
    println!("  Solve: {:.2} s", report.timing.solve_time_s);
    for path in [
        &report.files.gap_voltage,
        &report.files.profile,
        &report.files.snapshot,
        &report.files.manifest,
    ] {
        println!("  Wrote {}", path.display());
    }
    Ok(())
}

fn prompt_f64<R: BufRead, W: Write>(input: &mut R, out: &mut W, prompt: &str) -> FlameResult<f64> {
    write!(out, "{prompt}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(FlameError::Config {
            what: format!("no value given for '{}'", prompt.trim()),
        });
    }
    line.trim().parse().map_err(|_| FlameError::Config {
        what: format!("'{}' is not a number", line.trim()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_reads_one_number() {
        let mut input = io::Cursor::new("0.8\n1000\n");
        let mut out = Vec::new();
        assert_eq!(prompt_f64(&mut input, &mut out, "phi: ").unwrap(), 0.8);
        assert_eq!(prompt_f64(&mut input, &mut out, "E: ").unwrap(), 1000.0);
        assert_eq!(String::from_utf8(out).unwrap(), "phi: E: ");
    }

    #[test]
    fn prompt_rejects_garbage_and_eof() {
        let mut out = Vec::new();
        assert!(prompt_f64(&mut io::Cursor::new("abc\n"), &mut out, "phi: ").is_err());
        assert!(prompt_f64(&mut io::Cursor::new(""), &mut out, "phi: ").is_err());
    }

    #[test]
    fn positional_arguments() {
        let cli = Cli::try_parse_from(["flamespeed", "0.7", "500", "0", "2"]).unwrap();
        assert_eq!(cli.equivalence_ratio, Some(0.7));
        assert_eq!(cli.electric_field, Some(500.0));
        assert_eq!(cli.refine_grid, 0);
        assert_eq!(cli.loglevel, 2);

        let cli = Cli::try_parse_from(["flamespeed"]).unwrap();
        assert_eq!(cli.equivalence_ratio, None);
        assert_eq!(cli.refine_grid, 1);
        assert!(Cli::try_parse_from(["flamespeed", "1", "0", "2"]).is_err());
    }

    #[test]
    fn loglevel_maps_to_tracing_level() {
        assert_eq!(max_level(0), Level::WARN);
        assert_eq!(max_level(2), Level::DEBUG);
        assert_eq!(max_level(9), Level::TRACE);
    }
}
