use clap::{CommandFactory, FromArgMatches};
use log::{info, warn};
use os_str_bytes::OsStrBytesExt;
use rand::random;
use took::Timer;

use centralized_pdp::cli::{self, Solver};
use centralized_pdp::io::plan_writer::{write_json_plan_file, write_plan_file, PlanFileBuilder};
use centralized_pdp::io::settings_reader::{load_settings, Settings};
use centralized_pdp::io::load_scenario;
use centralized_pdp::solver::CentralizedPlanner;
use centralized_pdp::utils::{create_seeded_rng, Countdown};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = argfile::expand_args_from(
        std::env::args_os(),
        argfile::parse_fromfile,
        argfile::PREFIX,
    )?;
    let args = cli::ProgramArguments::from_arg_matches(
        &cli::ProgramArguments::command()
            .get_matches_from(args.iter().flat_map(|it| {
                it.split(" ").into_iter().collect::<Vec<_>>()
            }))
    )?;
    info!("{:?}", &args);

    let (seed_value, mut rng) = {
        let seed_value = args.seed.unwrap_or_else(|| random::<i128>().abs());
        info!("seed: {}", seed_value);
        (seed_value, create_seeded_rng(seed_value))
    };

    let settings = match &args.settings {
        Some(path) => load_settings(path)?,
        None => Settings::default(),
    };

    let load_timer = Timer::new();
    let instance = load_scenario(&args.scenario)?;
    let load_time = load_timer.took();
    info!("scenario loaded after {}", load_time);
    if let Some(setup) = settings.timeout.setup {
        if load_time.as_std().as_millis() > setup as u128 {
            warn!("setup took longer than the {} ms setup timeout", setup);
        }
    }

    let time_limit = args.solver.time_limit().min(settings.plan_time_limit());
    let countdown = Countdown::new(Timer::new(), time_limit);

    info!("starting solver {:?} (time limit: {:?})", &args.solver.variant, time_limit);
    let outcome = match &args.solver.variant {
        Solver::Local_Search => CentralizedPlanner::plan(
            &instance,
            args.solver.parameters(),
            &countdown,
            &mut rng,
        ),
        Solver::Naive => CentralizedPlanner::naive(&instance),
    };
    info!("finished after {}", outcome.time);

    if args.print_summary_to_stdout {
        println!(
            "{},{},{},{}",
            outcome.total_distance(&instance),
            outcome.total_cost(&instance),
            outcome.iterations(),
            outcome.time.as_std().as_millis()
        );
    }

    let plan_file = PlanFileBuilder::new()
        .instance_name(instance.name.as_str())
        .seed(seed_value)
        .plans_from_outcome(&outcome, &instance)
        .build();

    if let Some(path) = &args.plan {
        write_plan_file(path.as_str(), &plan_file)?;
        info!("plans written to {}", path);
    }
    if let Some(path) = &args.json {
        write_json_plan_file(path.as_str(), &plan_file)?;
        info!("json plans written to {}", path);
    }

    Ok(())
}
