use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use lifegrid::{Grid, Pattern, PatternEncoder, RunLengthEncoded};
use log::info;

mod console;
mod options;
mod stats;

use stats::Recorder;

fn args_to_grid(args: &options::Args) -> Result<Grid> {
    let cell_size = args.cell_size()?;
    if let Some(file_name) = args.input_file() {
        let encoded_str = std::fs::read_to_string(&file_name)
            .with_context(|| format!("read pattern from {}", file_name))?;
        let grid = RunLengthEncoded::default()
            .decode(&encoded_str)
            .and_then(Pattern::into_grid)
            .with_context(|| format!("load pattern from {}", file_name))?;
        return Ok(grid.with_cell_size(cell_size)?);
    }

    let (width, height) = args.display_size()?;
    let grid = args.fill_mode()?.create_grid(width, height, cell_size)?;
    Ok(grid)
}

fn save_grid(grid: &Grid, file_name: &str) -> Result<()> {
    let encoder = RunLengthEncoded::default().set_name("lifegrid generated pattern");
    std::fs::write(file_name, encoder.encode(grid))
        .with_context(|| format!("write pattern to {}", file_name))?;
    info!("saved generation {} to {}", grid.generation(), file_name);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let Some(args) = options::Args::from_env()? else {
        return Ok(());
    };

    let mut grid = args_to_grid(&args)?;
    grid.set_running(!args.paused());
    info!(
        "grid {}x{} with {} live cells",
        grid.width(),
        grid.height(),
        grid.live_count()
    );

    // setup the console and reporting metrics
    let mut console = if args.console() {
        Some(console::ConsoleRender::new()?)
    } else {
        None
    };
    let sleep = args.sleep()?;
    let threads = args.multithreading();
    let generations = args.generations()?;

    let mut stats = stats::SwitchRecorder::new(
        grid.generation(),
        grid.live_count(),
        args.stats_file().is_some(),
    );
    'generations: while grid.generation() < generations {
        // render the console if in console mode
        if let Some(ref mut console) = console {
            // only the first poll may block, the rest drain what is queued
            let mut timeout = console::ConsoleRender::poll_timeout(&grid);
            while let Some(cmd) = console.poll_events(&mut grid, timeout)? {
                timeout = Duration::ZERO;
                match cmd {
                    console::ConsoleCommand::Exit => break 'generations,
                    console::ConsoleCommand::Save => match args.output_file() {
                        Some(file_name) => save_grid(&grid, &file_name)?,
                        None => console.set_report("no --output file to save to".to_owned()),
                    },
                    console::ConsoleCommand::Handled => {}
                }
            }
            console.render(&grid)?;
        } else if !grid.is_running() {
            // nothing would ever resume a paused headless run
            break;
        }

        // report metrics every 500ms
        if stats.has_report() {
            let report = stats.report();
            if let Some(ref mut console) = console {
                console.set_report(report);
            } else {
                println!("{}", report);
            }
        }

        // compute the next generation
        if threads {
            grid.step_parallel();
        } else {
            grid.step();
        }
        stats.record(grid.generation(), grid.live_count());
        // a paused console already waited on input
        if let Some(time) = sleep.filter(|_| grid.is_running()) {
            thread::sleep(time);
        }
    }
    std::mem::drop(console);

    if let Some(file_name) = args.output_file() {
        save_grid(&grid, &file_name)?;
    }
    if let Some(file_name) = args.stats_file() {
        stats
            .save(&file_name)
            .with_context(|| format!("write stats to {}", file_name))?;
    }
    println!(
        "generation: {}  live cells: {}",
        grid.generation(),
        grid.live_count()
    );

    Ok(())
}
