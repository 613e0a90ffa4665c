//! Geographic point clustering tool
//!
//! Reads point records from a CSV file, clusters them for a map viewport and
//! writes one row per marker to draw: aggregates with their point count and
//! single points with their original properties.

use clap::Parser;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use log::{LevelFilter, debug, error, info};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use rust_geocluster::cluster::{
    BoundingBox, Cluster, ClusterId, ClusterIndex, ClusterOptions, LngLat, Properties, RawRecord,
    expansion_zoom, get_clusters,
};
use rust_geocluster::viewport::{
    CameraTarget, FlyToOptions, Phase, ViewportLimits, ViewportMachine, ViewportState,
};
use rust_geocluster::{GeoClusterError, Result};


/// Interval between simulated animation frames
const FRAME: Duration = Duration::from_millis(16);

#[derive(Parser)]
#[command(name = "rust_geocluster")]
#[command(about = "Geographic point clustering tool", long_about = None)]
struct Args {
    /// Input CSV file with a header row
    #[arg(short, long, default_value = "points.csv")]
    input: PathBuf,

    /// Output CSV file with the clusters (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Column holding the point id (row number if absent)
    #[arg(long, default_value = "id")]
    id_column: String,

    /// Column holding the longitude
    #[arg(long, default_value = "longitude")]
    lon_column: String,

    /// Column holding the latitude
    #[arg(long, default_value = "latitude")]
    lat_column: String,

    /// Camera zoom
    #[arg(short, long, default_value_t = 12.0)]
    zoom: f64,

    /// Visible area as west,south,east,north (default: derived from the camera)
    #[arg(long, value_parser = parse_bbox, allow_hyphen_values = true)]
    bbox: Option<BoundingBox>,

    /// Camera centre as lon,lat
    #[arg(long, value_parser = parse_lng_lat, default_value = "-75.1652,39.9526", allow_hyphen_values = true)]
    center: LngLat,

    /// Viewport width in pixels
    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 720.0)]
    height: f64,

    /// Cluster radius in pixels
    #[arg(short, long, default_value_t = 100.0)]
    radius: f64,

    /// Lowest clustered zoom
    #[arg(long, default_value_t = 5)]
    min_zoom: u8,

    /// First zoom at which all points are shown on their own
    #[arg(long, default_value_t = 23)]
    max_zoom: u8,

    /// Minimum number of points to form a cluster
    #[arg(short = 'm', long, default_value_t = 2)]
    min_points: usize,

    /// Cluster to expand: fly the camera to its expansion zoom first
    #[arg(short, long)]
    expand: Option<u64>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

/// Names of the CSV columns the points are read from
struct Columns<'a> {
    id: &'a str,
    lon: &'a str,
    lat: &'a str,
}

fn main() {
    let args = Args::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if args.debug {
        logger.filter_level(LevelFilter::Debug);
    }
    logger
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let options = ClusterOptions {
        radius: args.radius,
        min_zoom: args.min_zoom,
        max_zoom: args.max_zoom,
        min_points: args.min_points,
    };
    let columns = Columns {
        id: &args.id_column,
        lon: &args.lon_column,
        lat: &args.lat_column,
    };

    let records = read_records(&args.input, &columns)?;
    info!("Read {} records from {:?}", records.len(), args.input);
    let index = ClusterIndex::from_records(records, options.clone())?;

    let limits = ViewportLimits {
        min_zoom: options.min_zoom as f64,
        max_zoom: options.max_zoom as f64,
        ..ViewportLimits::default()
    };
    let mut machine = ViewportMachine::new(
        ViewportState::new(args.center, args.zoom, args.width, args.height),
        limits,
    );
    let mut bounds = args.bbox.unwrap_or_else(|| machine.state().bounds());

    if let Some(id) = args.expand {
        expand(&index, &mut machine, &bounds, ClusterId(id))?;
        bounds = machine.state().bounds();
    }

    let clusters = get_clusters(&index, machine.state().zoom, Some(&bounds));
    info!(
        "{} markers at zoom {:.2} for {} points",
        clusters.len(),
        machine.state().zoom,
        index.len()
    );

    match &args.output {
        None => write_clusters(io::stdout().lock(), &clusters),
        Some(path) => {
            write_clusters(File::create(path)?, &clusters)?;
            info!("Clusters written to {:?}", path);
            Ok(())
        }
    }
}

/// Flies the camera to the expansion zoom of a cluster on the current view
///
/// The animation is run frame by frame until the camera settles.
fn expand(
    index: &ClusterIndex,
    machine: &mut ViewportMachine,
    bounds: &BoundingBox,
    id: ClusterId,
) -> Result<()> {
    let clicked = get_clusters(index, machine.state().zoom, Some(bounds))
        .into_iter()
        .find(|c| c.id == id)
        .ok_or(GeoClusterError::UnknownCluster(id))?;
    let zoom = expansion_zoom(index, id)?;
    info!(
        "Cluster {} of {} points expands at zoom {}",
        id, clicked.point_count, zoom
    );

    let start = Instant::now();
    let mut now = start;
    let mut phase = machine.fly_to(
        CameraTarget::new(clicked.centroid, zoom as f64),
        &FlyToOptions::default(),
        start,
    )?;
    let mut frames = 0;
    while phase == Phase::Transitioning {
        now += FRAME;
        phase = machine.tick(now);
        frames += 1;
    }
    debug!(
        "Camera settled after {} frames ({:?})",
        frames,
        now.duration_since(start)
    );
    Ok(())
}

/// Reads point records from a CSV file with a header row
///
/// Columns other than id, longitude and latitude become string properties.
fn read_records(path: &PathBuf, columns: &Columns) -> Result<Vec<RawRecord>> {
    read_records_from(File::open(path)?, columns)
}

fn read_records_from<R: Read>(input: R, columns: &Columns) -> Result<Vec<RawRecord>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(input);
    let headers = reader.headers()?.clone();

    let find = |name: &str| headers.iter().position(|h| h.trim() == name);
    let id_idx = find(columns.id);
    let lon_idx = find(columns.lon).ok_or_else(|| missing_column(columns.lon))?;
    let lat_idx = find(columns.lat).ok_or_else(|| missing_column(columns.lat))?;
    if id_idx.is_none() {
        debug!("No {:?} column, using row numbers as ids", columns.id);
    }

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let id = match id_idx.and_then(|i| record.get(i)) {
            Some(id) => id.trim().to_string(),
            None => row.to_string(),
        };

        let mut properties = Properties::new();
        for (i, (name, value)) in headers.iter().zip(record.iter()).enumerate() {
            if Some(i) != id_idx && i != lon_idx && i != lat_idx {
                properties.insert(name.trim().to_string(), value.into());
            }
        }

        records.push(RawRecord {
            id,
            longitude: parse_coordinate(&record, lon_idx),
            latitude: parse_coordinate(&record, lat_idx),
            properties,
        });
    }
    Ok(records)
}

fn missing_column(name: &str) -> GeoClusterError {
    GeoClusterError::InvalidOptions(format!("CSV has no {:?} column", name))
}

/// Empty or unparsable fields are missing coordinates
fn parse_coordinate(record: &StringRecord, idx: usize) -> Option<f64> {
    record.get(idx)?.trim().parse::<f64>().ok()
}

/// Writes one CSV row per cluster
///
/// Format: `cluster_id,longitude,latitude,is_cluster,point_count,label,point_id,properties`,
/// properties being the JSON object of a single point.
fn write_clusters<W: Write>(output: W, clusters: &[Cluster]) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(output);
    writer.write_record([
        "cluster_id",
        "longitude",
        "latitude",
        "is_cluster",
        "point_count",
        "label",
        "point_id",
        "properties",
    ])?;

    for cluster in clusters {
        let properties = match &cluster.properties {
            Some(p) => serde_json::to_string(p)?,
            None => String::new(),
        };
        let point_id = cluster
            .point_id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_default();
        writer.write_record([
            cluster.id.to_string(),
            format!("{:.6}", cluster.centroid.lon),
            format!("{:.6}", cluster.centroid.lat),
            cluster.is_aggregate.to_string(),
            cluster.point_count.to_string(),
            cluster.abbreviated_count(),
            point_id,
            properties,
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn parse_pair(s: &str, what: &str) -> std::result::Result<Vec<f64>, String> {
    s.split(',')
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .map_err(|e| format!("invalid {what} {s:?}: {e}"))
        })
        .collect()
}

/// Parses `west,south,east,north`
fn parse_bbox(s: &str) -> std::result::Result<BoundingBox, String> {
    match parse_pair(s, "bbox")?.as_slice() {
        &[west, south, east, north] => {
            let bbox = BoundingBox::new(west, south, east, north);
            if bbox.is_finite() {
                Ok(bbox)
            } else {
                Err(format!("bbox {s:?} is not finite"))
            }
        }
        _ => Err(format!("bbox {s:?} must be west,south,east,north")),
    }
}

/// Parses `lon,lat`
fn parse_lng_lat(s: &str) -> std::result::Result<LngLat, String> {
    match parse_pair(s, "center")?.as_slice() {
        &[lon, lat] if LngLat::new(lon, lat).is_finite() && (-90.0..=90.0).contains(&lat) => {
            Ok(LngLat::new(lon, lat))
        }
        _ => Err(format!("center {s:?} must be lon,lat")),
    }
}
