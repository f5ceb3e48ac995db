use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use liquid_wealth::{
    file_sha256, load_balance_csv, load_survey_csv, write_lorenz_csv, EngineConfig,
    InputProvenance, Pipeline, WealthVariant,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut survey_path: Option<PathBuf> = None;
    let mut balance_path: Option<PathBuf> = None;
    let mut out_dir = PathBuf::from(".");
    let mut config = EngineConfig::default();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().context("--config requires a path")?;
                let file = fs::File::open(path)
                    .with_context(|| format!("Failed to open config {}", path))?;
                config = serde_json::from_reader(file)
                    .with_context(|| format!("Failed to parse config {}", path))?;
            }
            "--variant" => {
                let name = iter.next().context("--variant requires a name")?;
                config.wealth_variant = WealthVariant::from_str(name)?;
            }
            "--installment" => {
                config.wealth_variant = WealthVariant::WithInstallment;
            }
            "--deflator" => {
                let value = iter.next().context("--deflator requires a number")?;
                config.deflator = Some(
                    value
                        .parse::<f64>()
                        .with_context(|| format!("Invalid deflator '{}'", value))?,
                );
            }
            "--out" => {
                out_dir = PathBuf::from(iter.next().context("--out requires a directory")?);
            }
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            other if other.starts_with("--") => bail!("Unknown option '{}'", other),
            other if survey_path.is_none() => survey_path = Some(PathBuf::from(other)),
            other if balance_path.is_none() => balance_path = Some(PathBuf::from(other)),
            other => bail!("Unexpected argument '{}'", other),
        }
    }

    let (Some(survey_path), Some(balance_path)) = (survey_path, balance_path) else {
        print_usage();
        bail!("Missing input files");
    };

    run_tabulation(&survey_path, &balance_path, &out_dir, config)
}

fn print_usage() {
    eprintln!("Usage: liquid-wealth <survey.csv> <balances.csv> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>     JSON engine configuration");
    eprintln!("  --variant <name>    Wealth variant: kaplan | with-installment");
    eprintln!("  --installment       Shorthand for --variant with-installment");
    eprintln!("  --deflator <f>      Divide dollar fields by f before tabulating");
    eprintln!("  --out <dir>         Output directory (default: .)");
}

fn run_tabulation(
    survey_path: &Path,
    balance_path: &Path,
    out_dir: &Path,
    config: EngineConfig,
) -> Result<()> {
    println!("Liquid Wealth Tabulator v{}", liquid_wealth::VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Load inputs
    println!("\n📂 Loading survey extract...");
    let records = load_survey_csv(survey_path)?;
    println!("✓ Loaded {} extract rows", records.len());

    let answers = load_balance_csv(balance_path)?;
    println!("✓ Loaded {} balance answers", answers.len());

    // 2. Run the pipeline
    println!("\n⚙️  Tabulating ({} variant)...", config.wealth_variant.name());
    let pipeline = Pipeline::new(config)?;
    let mut output = pipeline.run(records, &answers)?;
    println!(
        "✓ {} households survive all filters",
        output.report.counts.surviving
    );

    output.report.input = Some(InputProvenance {
        survey_file: survey_path.display().to_string(),
        survey_sha256: file_sha256(survey_path)?,
        balance_file: balance_path.display().to_string(),
        balance_sha256: file_sha256(balance_path)?,
    });

    // 3. Print the tables
    println!("\n{}", output.report.summary());

    // 4. Write outputs
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let pooled_path = out_dir.join("LorenzAll.csv");
    write_lorenz_csv(&output.pooled_lorenz, &pooled_path)?;
    println!("✓ Saved: {}", pooled_path.display());

    let group_path = out_dir.join("LorenzEd.csv");
    write_lorenz_csv(&output.group_lorenz, &group_path)?;
    println!("✓ Saved: {}", group_path.display());

    let report_path = out_dir.join("report.json");
    output.report.write_json(&report_path)?;
    println!("✓ Saved: {}", report_path.display());

    Ok(())
}
