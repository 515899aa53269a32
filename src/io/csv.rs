use crate::config::SimulationConfig;
use crate::io::results::SimulationResult;
use crate::profile::CrossSectionPoint;
use crate::rating::RatingPoint;
use anyhow::{Context, Result};
use csv::{ReaderBuilder, Writer, WriterBuilder};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

// Load cross-section points from a `width,elevation` CSV file
pub fn load_profile_points(csv_file: &Path) -> Result<Vec<CrossSectionPoint>> {
    let file = File::open(csv_file)
        .with_context(|| format!("Failed to open profile file: {:?}", csv_file))?;
    let buffered_reader = BufReader::new(file);

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b',')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(buffered_reader);

    let mut points = Vec::new();
    for (row, result) in rdr.deserialize::<CrossSectionPoint>().enumerate() {
        let point =
            result.with_context(|| format!("Bad profile record {} in {:?}", row + 1, csv_file))?;
        points.push(point);
    }

    log::info!("Loaded {} cross-section points from {:?}", points.len(), csv_file);
    Ok(points)
}

// Create CSV writer with headers
pub fn create_csv_writer(path: &Path) -> Result<Writer<File>> {
    let wtr = WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to create CSV file: {:?}", path))?;
    Ok(wtr)
}

pub fn write_rating(path: &Path, rating: &[RatingPoint]) -> Result<()> {
    let mut wtr = create_csv_writer(path)?;
    for point in rating {
        wtr.serialize(point)?;
    }
    wtr.flush().context("Failed to flush rating CSV")?;
    Ok(())
}

pub fn write_results(path: &Path, result: &SimulationResult, config: &SimulationConfig) -> Result<()> {
    let mut wtr = create_csv_writer(path)?;

    // Write header
    wtr.write_record(["step", "time", "timestamp", "water_level", "discharge"])?;

    for (step, point) in result.points.iter().enumerate() {
        wtr.write_record(&[
            step.to_string(),
            point.time.to_string(),
            // left empty when the time does not fit the calendar
            config
                .timestamp_at(point.time)
                .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
            point.water_level.to_string(),
            point.discharge.to_string(),
        ])?;
    }

    wtr.flush().context("Failed to flush results CSV")?;
    Ok(())
}
