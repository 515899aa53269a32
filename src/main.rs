use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;

mod cli;

use cli::{Command, ProfileSource, get_args};
use reach_rs::config::{ColumnConfig, RatingOptions, SimulationConfig};
use reach_rs::io::{csv as csv_io, sqlite};
use reach_rs::profile::CrossSectionProfile;
use reach_rs::rating::{RatingPoint, default_design_point, generate_rating};
use reach_rs::solver::{self, NodeJob};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = get_args();
    match cli.command {
        Command::Geometry { source, level } => run_geometry(&source, level),
        Command::Rating {
            source,
            slope,
            samples,
            output,
            save_design,
        } => run_rating(&source, slope, samples, output.as_deref(), save_design),
        Command::Simulate {
            source,
            config,
            output,
        } => run_simulate(&source, config.as_deref(), &output),
        Command::Batch {
            db,
            project,
            config,
            format,
            out_dir,
            threads,
        } => run_batch(&db, &project, config.as_deref(), format, &out_dir, threads),
    }
}

fn load_config(path: Option<&Path>) -> Result<SimulationConfig> {
    match path {
        Some(path) => SimulationConfig::load(path),
        None => Ok(SimulationConfig::default()),
    }
}

// Resolve a cross-section from CSV or the project store, applying CLI overrides
fn load_profile(source: &ProfileSource) -> Result<Option<CrossSectionProfile>> {
    let profile = if let Some(path) = &source.profile {
        Some(CrossSectionProfile::new(csv_io::load_profile_points(path)?))
    } else if let Some(db) = &source.db {
        let (Some(project), Some(node)) = (&source.project, &source.node) else {
            bail!("--db requires --project and --node");
        };
        let conn = rusqlite::Connection::open(db)
            .with_context(|| format!("Failed to open database: {:?}", db))?;
        let profile = sqlite::load_cross_section(&conn, &ColumnConfig::new(), project, node)?;
        if profile.is_none() {
            log::warn!("No cross-section stored for {}/{}", project, node);
        }
        profile
    } else {
        None
    };

    Ok(profile.map(|mut p| {
        if source.manning_n.is_some() {
            p.manning_n = source.manning_n;
        }
        if source.water_level.is_some() {
            p.water_level = source.water_level;
        }
        p
    }))
}

fn run_geometry(source: &ProfileSource, level: f64) -> Result<()> {
    let Some(profile) = load_profile(source)? else {
        bail!("A cross-section is required (--profile or --db)");
    };
    let geom = reach_rs::compute_geometry(&profile.points, level);

    println!("Water level:      {:.4} m", level);
    println!("Area:             {:.4} m2", geom.area);
    println!("Top width:        {:.4} m", geom.top_width);
    println!("Wetted perimeter: {:.4} m", geom.wetted_perimeter);
    println!("Hydraulic radius: {:.4} m", geom.hydraulic_radius());
    Ok(())
}

fn run_rating(
    source: &ProfileSource,
    slope: f64,
    samples: usize,
    output: Option<&Path>,
    save_design: bool,
) -> Result<()> {
    let options = RatingOptions::new(samples, slope)?;
    let Some(profile) = load_profile(source)? else {
        bail!("A cross-section is required (--profile or --db)");
    };

    let rating = generate_rating(&profile, &options);
    if rating.is_empty() {
        log::warn!("Cannot build a rating curve: need >= 2 points, a positive Manning n and an elevation range");
        return Ok(());
    }

    println!("{:>12} {:>14}", "h (m)", "Q (m3/s)");
    for point in &rating {
        println!("{:>12.3} {:>14.3}", point.water_level, point.discharge);
    }

    if let Some(path) = output {
        csv_io::write_rating(path, &rating)?;
        log::info!("Rating curve saved to {:?}", path);
    }

    if save_design {
        if let (Some(db), Some(project), Some(node), Some(design)) = (
            &source.db,
            &source.project,
            &source.node,
            default_design_point(&rating),
        ) {
            store_design_point(db, project, node, &design)?;
        }
    }
    Ok(())
}

// Save the design point on an existing node; a missing node is an error
fn store_design_point(db: &Path, project: &str, node: &str, design: &RatingPoint) -> Result<()> {
    let conn = rusqlite::Connection::open(db)
        .with_context(|| format!("Failed to open database: {:?}", db))?;
    if !sqlite::save_design_point(&conn, &ColumnConfig::new(), project, node, design)? {
        bail!("No cross-section stored for {}/{}, design point not saved", project, node);
    }
    log::info!(
        "Design point saved: h = {:.3} m, Q = {:.3} m3/s",
        design.water_level,
        design.discharge
    );
    Ok(())
}

fn run_simulate(source: &ProfileSource, config_path: Option<&Path>, output: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let profile = load_profile(source)?;

    log::info!("Simulation configuration:");
    match config.end_time() {
        Some(end) => log::info!("  Period: {} to {}", config.start_time, end),
        None => log::info!("  Period: from {}", config.start_time),
    }
    log::info!("  Time step: {} s, steps: {}", config.time_step, config.step_count());
    log::info!(
        "  Inflow: {} m3/s, downstream stage: {} m",
        config.inflow,
        config.downstream_stage
    );

    let result = solver::run(&config, profile.as_ref());
    log::info!("{}", result.summary());

    csv_io::write_results(output, &result, &config)?;
    log::info!("Results saved to {:?}", output);
    Ok(())
}

fn run_batch(
    db: &Path,
    project: &str,
    config_path: Option<&Path>,
    format: reach_rs::config::OutputFormat,
    out_dir: &Path,
    threads: Option<usize>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let columns = ColumnConfig::new();

    let mut conn = rusqlite::Connection::open(db)
        .with_context(|| format!("Failed to open database: {:?}", db))?;
    sqlite::init_schema(&conn, &columns)?;

    log::info!("Loading cross-sections for project {}...", project);
    let nodes = sqlite::list_nodes(&conn, &columns, project)?;
    if nodes.is_empty() {
        bail!("No nodes found for project {}", project);
    }

    let mut jobs = Vec::with_capacity(nodes.len());
    for node_id in nodes {
        let profile = sqlite::load_cross_section(&conn, &columns, project, &node_id)?;
        jobs.push(NodeJob { node_id, profile });
    }

    let pool = solver::build_thread_pool(threads)?;
    log::info!(
        "Running {} nodes on {} threads",
        jobs.len(),
        pool.current_num_threads()
    );

    // Create progress bar
    let pb = ProgressBar::new(jobs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} nodes ({eta})")?
            .progress_chars("#>-"),
    );
    let pb = Arc::new(pb);

    let results = pool.install(|| solver::run_batch(&config, &jobs, pb.clone()));
    pb.finish_and_clear();

    if format.writes_csv() {
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create output directory: {:?}", out_dir))?;
    }

    for (node_id, result) in &results {
        log::info!("{}: {}", node_id, result.summary());
        if format.writes_sqlite() {
            sqlite::save_results(&mut conn, &columns, project, node_id, result)?;
        }
        if format.writes_csv() {
            let path = out_dir.join(format!("{}_{}.csv", project, node_id));
            csv_io::write_results(&path, result, &config)?;
        }
    }

    log::info!("Batch complete: {} nodes", results.len());
    Ok(())
}
