use crate::config::ColumnConfig;
use crate::io::results::SimulationResult;
use crate::profile::{CrossSectionPoint, CrossSectionProfile};
use crate::rating::RatingPoint;
use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};

/// Create the project store tables if they do not exist.
pub fn init_schema(conn: &Connection, config: &ColumnConfig) -> Result<()> {
    let c = config;
    let sql = format!(
        "CREATE TABLE IF NOT EXISTS '{sections}' (
            {project} TEXT NOT NULL,
            {node} TEXT NOT NULL,
            {n} REAL,
            {wl} REAL,
            {dwl} REAL,
            {dq} REAL,
            PRIMARY KEY ({project}, {node})
        );
        CREATE TABLE IF NOT EXISTS '{points}' (
            {project} TEXT NOT NULL,
            {node} TEXT NOT NULL,
            {seq} INTEGER NOT NULL,
            {width} REAL NOT NULL,
            {elevation} REAL NOT NULL,
            PRIMARY KEY ({project}, {node}, {seq})
        );
        CREATE TABLE IF NOT EXISTS '{results}' (
            {project} TEXT NOT NULL,
            {node} TEXT NOT NULL,
            step INTEGER NOT NULL,
            time REAL NOT NULL,
            water_level REAL NOT NULL,
            discharge REAL NOT NULL,
            PRIMARY KEY ({project}, {node}, step)
        );",
        sections = c.sections_table,
        points = c.points_table,
        results = c.results_table,
        project = c.project,
        node = c.node,
        n = c.n,
        wl = c.water_level,
        dwl = c.design_water_level,
        dq = c.design_discharge,
        seq = c.seq,
        width = c.width,
        elevation = c.elevation,
    );
    conn.execute_batch(&sql)
        .context("Failed to create project store schema")?;
    Ok(())
}

/// Node ids of a project, sorted.
pub fn list_nodes(conn: &Connection, config: &ColumnConfig, project: &str) -> Result<Vec<String>> {
    let query = format!(
        "SELECT {node} FROM '{table}' WHERE {project} = ?1 ORDER BY {node}",
        node = config.node,
        table = config.sections_table,
        project = config.project,
    );
    let mut stmt = conn.prepare(&query)?;
    let rows = stmt.query_map([project], |row| row.get::<_, String>(0))?;

    let mut nodes = Vec::new();
    for row in rows {
        nodes.push(row?);
    }
    Ok(nodes)
}

// Function to fetch a node's cross-section from SQLite
pub fn load_cross_section(
    conn: &Connection,
    config: &ColumnConfig,
    project: &str,
    node: &str,
) -> Result<Option<CrossSectionProfile>> {
    let query = format!(
        "SELECT {}, {}, {}, {} FROM '{}' WHERE {} = ?1 AND {} = ?2",
        config.n,
        config.water_level,
        config.design_water_level,
        config.design_discharge,
        config.sections_table,
        config.project,
        config.node,
    );

    let header = conn
        .query_row(&query, params![project, node], |row| {
            Ok((
                row.get::<_, Option<f64>>(0)?,
                row.get::<_, Option<f64>>(1)?,
                row.get::<_, Option<f64>>(2)?,
                row.get::<_, Option<f64>>(3)?,
            ))
        })
        .optional()
        .with_context(|| format!("Failed to query cross-section {}/{}", project, node))?;

    let Some((manning_n, water_level, design_water_level, design_discharge)) = header else {
        return Ok(None);
    };

    let points_query = format!(
        "SELECT {}, {} FROM '{}' WHERE {} = ?1 AND {} = ?2 ORDER BY {}",
        config.width,
        config.elevation,
        config.points_table,
        config.project,
        config.node,
        config.seq,
    );
    let mut stmt = conn.prepare(&points_query)?;
    let rows = stmt.query_map(params![project, node], |row| {
        Ok(CrossSectionPoint {
            width: row.get(0)?,
            elevation: row.get(1)?,
        })
    })?;

    let mut points = Vec::new();
    for row in rows {
        points.push(row?);
    }

    Ok(Some(CrossSectionProfile {
        points,
        manning_n,
        water_level,
        design_water_level,
        design_discharge,
    }))
}

/// Insert or replace a node's cross-section and its points.
pub fn save_cross_section(
    conn: &mut Connection,
    config: &ColumnConfig,
    project: &str,
    node: &str,
    profile: &CrossSectionProfile,
) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute(
        &format!(
            "INSERT OR REPLACE INTO '{}' ({}, {}, {}, {}, {}, {}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            config.sections_table,
            config.project,
            config.node,
            config.n,
            config.water_level,
            config.design_water_level,
            config.design_discharge,
        ),
        params![
            project,
            node,
            profile.manning_n,
            profile.water_level,
            profile.design_water_level,
            profile.design_discharge
        ],
    )?;
    tx.execute(
        &format!(
            "DELETE FROM '{}' WHERE {} = ?1 AND {} = ?2",
            config.points_table, config.project, config.node
        ),
        params![project, node],
    )?;
    {
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO '{}' ({}, {}, {}, {}, {}) VALUES (?1, ?2, ?3, ?4, ?5)",
            config.points_table,
            config.project,
            config.node,
            config.seq,
            config.width,
            config.elevation,
        ))?;
        for (seq, point) in profile.points.iter().enumerate() {
            stmt.execute(params![project, node, seq as i64, point.width, point.elevation])?;
        }
    }
    tx.commit()
        .with_context(|| format!("Failed to save cross-section {}/{}", project, node))?;
    Ok(())
}

/// Store a selected rating sample as the node's design point.
///
/// Returns false when the node has no cross-section row.
pub fn save_design_point(
    conn: &Connection,
    config: &ColumnConfig,
    project: &str,
    node: &str,
    point: &RatingPoint,
) -> Result<bool> {
    let updated = conn.execute(
        &format!(
            "UPDATE '{}' SET {} = ?1, {} = ?2 WHERE {} = ?3 AND {} = ?4",
            config.sections_table,
            config.design_water_level,
            config.design_discharge,
            config.project,
            config.node,
        ),
        params![point.water_level, point.discharge, project, node],
    )?;
    Ok(updated > 0)
}

/// Replace the stored time series of a node with `result`.
pub fn save_results(
    conn: &mut Connection,
    config: &ColumnConfig,
    project: &str,
    node: &str,
    result: &SimulationResult,
) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute(
        &format!(
            "DELETE FROM '{}' WHERE {} = ?1 AND {} = ?2",
            config.results_table, config.project, config.node
        ),
        params![project, node],
    )?;
    {
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO '{}' ({}, {}, step, time, water_level, discharge) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            config.results_table, config.project, config.node,
        ))?;
        for (step, point) in result.points.iter().enumerate() {
            stmt.execute(params![
                project,
                node,
                step as i64,
                point.time,
                point.water_level,
                point.discharge
            ])?;
        }
    }
    tx.commit()
        .with_context(|| format!("Failed to save results for {}/{}", project, node))?;
    Ok(())
}
