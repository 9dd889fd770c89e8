// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use pax_alloc_model::geo::{DistanceMatrix, Gangway, SpeedTable};
use pax_alloc_model::plan::write_report;
use pax_alloc_model::scenario::Scenario;
use pax_alloc_model::validation::validate_plan;
use pax_alloc_solver::prelude::Solver;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

struct Args {
    scenario: PathBuf,
    distances: PathBuf,
    speeds: PathBuf,
    gangway: PathBuf,
    out: PathBuf,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            scenario: PathBuf::from("solver_input.json"),
            distances: PathBuf::from("distplat.json"),
            speeds: PathBuf::from("velocidades.json"),
            gangway: PathBuf::from("gangway.json"),
            out: PathBuf::from("distribuicao.txt"),
        }
    }
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        let mut take = |name: &str| {
            iter.next()
                .map(PathBuf::from)
                .ok_or_else(|| format!("missing value for {name}"))
        };
        match arg.as_str() {
            "--distances" => args.distances = take("--distances")?,
            "--speeds" => args.speeds = take("--speeds")?,
            "--gangway" => args.gangway = take("--gangway")?,
            "--out" => args.out = take("--out")?,
            "--help" | "-h" => {
                return Err(
                    "usage: pax-alloc [scenario.json] [--distances PATH] [--speeds PATH] \
                     [--gangway PATH] [--out PATH]"
                        .to_string(),
                );
            }
            other if !other.starts_with('-') => args.scenario = PathBuf::from(other),
            other => return Err(format!("unknown option '{other}'")),
        }
    }
    Ok(args)
}

fn enable_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let distances = DistanceMatrix::from_reader(File::open(&args.distances)?)?;

    let speeds = if args.speeds.exists() {
        SpeedTable::from_reader(File::open(&args.speeds)?)?
    } else {
        tracing::warn!(path = %args.speeds.display(), "speed table missing; using defaults");
        SpeedTable::default()
    };

    let gangway = if args.gangway.exists() {
        Gangway::from_reader(File::open(&args.gangway)?)?
    } else {
        tracing::warn!(
            path = %args.gangway.display(),
            "gangway list missing; Aqua Helix cannot operate"
        );
        Gangway::new()
    };

    let scenario = Scenario::from_reader(File::open(&args.scenario)?, &speeds)?;
    tracing::info!(
        crew_change = scenario.crew_change,
        boats = scenario.available_boats().count(),
        pax = scenario.total_demand(),
        "scenario loaded"
    );

    let plan = Solver::new(&distances, &gangway).solve(&scenario);

    for violation in validate_plan(&scenario.demands, &gangway, &plan) {
        tracing::warn!(%violation, "plan check failed");
    }

    let mut file = File::create(&args.out)?;
    write_report(&plan, scenario.crew_change, scenario.m9_crew_headcount, &mut file)?;
    tracing::info!(path = %args.out.display(), "distribution written");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_report(&plan, scenario.crew_change, scenario.m9_crew_headcount, &mut out)?;
    out.flush()?;

    Ok(())
}

fn main() {
    enable_tracing();
    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            std::process::exit(2);
        }
    };
    if let Err(err) = run(&args) {
        tracing::error!(error = %err, "aborting");
        std::process::exit(1);
    }
}
