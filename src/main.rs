use ljsim::{ScenarioConfig, Scenario};
use ljsim::{NullSink, VtuWriter};
use ljsim::{bench_forces, bench_step};

use clap::Parser;
use anyhow::{Context, Result};

use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(about = "Cell-list Lennard-Jones particle simulator")]
struct Args {
    /// Scenario file; looked up under `scenarios/` of the crate if not found as given
    #[arg(short, long, default_value = "collision.yaml")]
    file: PathBuf,

    /// Directory receiving the data_t<step>.vtu snapshots
    #[arg(short, long, default_value = "output")]
    out_dir: PathBuf,

    /// Run without writing snapshots
    #[arg(long)]
    no_output: bool,

    /// Run the timing helpers instead of a scenario
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file: &Path) -> Result<ScenarioConfig> {
    let config_path = if file.exists() {
        file.to_path_buf()
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file)
    };

    let scenario_cfg = ScenarioConfig::from_path(&config_path)
        .with_context(|| format!("failed to load scenario {}", config_path.display()))?;

    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.bench {
        bench_forces();
        bench_step();
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file)?;
    let mut sim = Scenario::build_scenario(scenario_cfg)
        .and_then(Scenario::into_simulation)
        .context("invalid scenario")?;

    if args.no_output {
        sim.run(&mut NullSink)?;
    } else {
        let mut writer = VtuWriter::new(&args.out_dir)
            .with_context(|| format!("cannot create output directory {}", args.out_dir.display()))?;
        sim.run(&mut writer)?;
    }

    Ok(())
}
