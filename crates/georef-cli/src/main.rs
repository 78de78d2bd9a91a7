use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow, ensure};
use clap::{Parser, Subcommand};
use flexi_logger::{Logger, LoggerHandle};
use georef_core::{CorrespondencePoint, GeoCoordinate, PixelCoordinate, TransformModel};
use georef_linear::{fit_report, select_and_fit_with};
use georef_pipeline::session::{MapSession, SessionConfig};
use georef_pipeline::store::{JsonPointStore, MapId, NewMap, PointId, PointPatch, PointStore};
use log::debug;
use serde::Serialize;

/// Georeferencing CLI: fit pixel/geo transforms and place positions on map images.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Fit pixel/geo transforms and map positions between image and world"
)]
struct Cli {
    /// Optional path to JSON SessionConfig. Defaults are used if omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter such as `info` or `georef_linear=debug`.
    /// Falls back to RUST_LOG, then `warn`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fit the model for a correspondence file and report its residuals.
    Fit {
        /// Path to a JSON array of correspondences.
        #[arg(long)]
        points: PathBuf,
    },
    /// Map an image pixel to a geographic coordinate.
    ToGeo {
        #[arg(long)]
        points: PathBuf,
        #[arg(long, allow_negative_numbers = true)]
        x: f64,
        #[arg(long, allow_negative_numbers = true)]
        y: f64,
    },
    /// Map a geographic coordinate to an image pixel.
    ToPixel {
        #[arg(long)]
        points: PathBuf,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
    },
    /// Manage the maps of a point store.
    Map {
        /// Path to the JSON point store (created on first write).
        #[arg(long)]
        store: PathBuf,
        #[command(subcommand)]
        action: MapAction,
    },
    /// Manage the correspondence points of a point store.
    Point {
        #[arg(long)]
        store: PathBuf,
        #[command(subcommand)]
        action: PointAction,
    },
    /// Place a position fix on a stored map.
    Locate {
        #[arg(long)]
        store: PathBuf,
        #[arg(long)]
        map: u64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
    },
    /// Map an image position of a stored map to a geographic coordinate.
    Pick {
        #[arg(long)]
        store: PathBuf,
        #[arg(long)]
        map: u64,
        #[arg(long, allow_negative_numbers = true)]
        x: f64,
        #[arg(long, allow_negative_numbers = true)]
        y: f64,
    },
}

#[derive(Debug, Subcommand)]
enum MapAction {
    Create {
        #[arg(long)]
        name: String,
        /// Image width in pixels.
        #[arg(long)]
        width: u32,
        /// Image height in pixels.
        #[arg(long)]
        height: u32,
    },
    List,
    /// Delete a map and all of its points.
    Delete {
        #[arg(long)]
        id: u64,
    },
}

#[derive(Debug, Subcommand)]
enum PointAction {
    Add {
        #[arg(long)]
        map: u64,
        #[arg(long, allow_negative_numbers = true)]
        x: f64,
        #[arg(long, allow_negative_numbers = true)]
        y: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
    },
    /// Move a point in the image and/or in the world.
    Update {
        #[arg(long)]
        id: u64,
        #[arg(long, allow_negative_numbers = true, requires = "y")]
        x: Option<f64>,
        #[arg(long, allow_negative_numbers = true, requires = "x")]
        y: Option<f64>,
        #[arg(long, allow_negative_numbers = true, requires = "lat")]
        lon: Option<f64>,
        #[arg(long, allow_negative_numbers = true, requires = "lon")]
        lat: Option<f64>,
    },
    Delete {
        #[arg(long)]
        id: u64,
    },
    /// List the points of a map in insertion order.
    List {
        #[arg(long)]
        map: u64,
    },
}

fn load_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let data =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let value =
        serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
    Ok(value)
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    match path {
        Some(path) => load_json_file(path),
        None => Ok(SessionConfig::default()),
    }
}

fn fit_model(points_path: &Path, config: &SessionConfig) -> Result<TransformModel> {
    let points: Vec<CorrespondencePoint> = load_json_file(points_path)?;
    debug!(
        "loaded {} correspondences from {}",
        points.len(),
        points_path.display()
    );
    select_and_fit_with(&points, &config.solver)?.ok_or_else(|| {
        anyhow!(
            "{} holds {} correspondence(s); at least two are required",
            points_path.display(),
            points.len()
        )
    })
}

/// Open the store and run `f`. Changes are written only if `f` succeeds.
fn with_store<T: Serialize>(
    path: &Path,
    f: impl FnOnce(&mut JsonPointStore) -> Result<T>,
) -> Result<String> {
    let mut store = JsonPointStore::open(path)?;
    match f(&mut store) {
        Ok(out) => {
            store.close()?;
            to_json(&out)
        }
        Err(err) => {
            store.discard();
            Err(err)
        }
    }
}

fn run_map(store: &Path, action: MapAction) -> Result<String> {
    match action {
        MapAction::Create {
            name,
            width,
            height,
        } => with_store(store, |s| {
            let id = s.create_map(NewMap {
                name,
                image_width: width,
                image_height: height,
            })?;
            s.get_map(id)
        }),
        MapAction::List => with_store(store, |s| Ok(s.list_maps())),
        MapAction::Delete { id } => with_store(store, |s| {
            let map = s.get_map(MapId(id))?;
            s.delete_map(map.id)?;
            Ok(map)
        }),
    }
}

fn run_point(store: &Path, action: PointAction, config: SessionConfig) -> Result<String> {
    match action {
        PointAction::Add {
            map,
            x,
            y,
            lon,
            lat,
        } => with_store(store, |s| {
            let mut session = MapSession::new(&mut *s, MapId(map), config)?;
            let id =
                session.add_point(PixelCoordinate::new(x, y), GeoCoordinate::new(lon, lat))?;
            session.store().get_point(id)
        }),
        PointAction::Update {
            id,
            x,
            y,
            lon,
            lat,
        } => {
            let patch = PointPatch {
                pixel: x.zip(y).map(|(x, y)| PixelCoordinate::new(x, y)),
                geo: lon.zip(lat).map(|(lon, lat)| GeoCoordinate::new(lon, lat)),
            };
            ensure!(!patch.is_empty(), "nothing to update: pass --x/--y and/or --lon/--lat");
            with_store(store, |s| {
                let id = PointId(id);
                let map = s.get_point(id)?.map_id;
                let mut session = MapSession::new(&mut *s, map, config)?;
                session.update_point(id, patch)?;
                session.store().get_point(id)
            })
        }
        PointAction::Delete { id } => with_store(store, |s| {
            let point = s.get_point(PointId(id))?;
            s.delete_point(point.id)?;
            Ok(point)
        }),
        PointAction::List { map } => with_store(store, |s| s.list_points(MapId(map))),
    }
}

fn run(cli: Cli) -> Result<String> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Fit { points } => {
            let pts: Vec<CorrespondencePoint> = load_json_file(&points)?;
            let report = fit_report(&pts, &config.solver)?.ok_or_else(|| {
                anyhow!(
                    "{} holds {} correspondence(s); at least two are required",
                    points.display(),
                    pts.len()
                )
            })?;
            to_json(&report)
        }
        Command::ToGeo { points, x, y } => {
            let pixel = PixelCoordinate::new(x, y);
            ensure!(pixel.is_finite(), "pixel coordinate is not finite");
            let model = fit_model(&points, &config)?;
            to_json(&model.to_geo(pixel))
        }
        Command::ToPixel { points, lon, lat } => {
            let geo = GeoCoordinate::new(lon, lat);
            if config.validate_geo_ranges {
                geo.validate()?;
            }
            let model = fit_model(&points, &config)?;
            to_json(&model.to_pixel_with(geo, &config.solver)?)
        }
        Command::Map { store, action } => run_map(&store, action),
        Command::Point { store, action } => run_point(&store, action, config),
        Command::Locate {
            store,
            map,
            lon,
            lat,
        } => with_store(&store, |s| {
            MapSession::new(&mut *s, MapId(map), config)?.locate(GeoCoordinate::new(lon, lat))
        }),
        Command::Pick { store, map, x, y } => with_store(&store, |s| {
            MapSession::new(&mut *s, MapId(map), config)?.pick(PixelCoordinate::new(x, y))
        }),
    }
}

fn init_logging(level: Option<&str>) -> Result<LoggerHandle> {
    let logger = match level {
        Some(spec) => Logger::try_with_str(spec)?,
        None => Logger::try_with_env_or_str("warn")?,
    };
    Ok(logger.log_to_stderr().start()?)
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let _logger = init_logging(cli.log_level.as_deref())?;
    let json = run(cli)?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use georef_core::TransformError;
    use georef_linear::FitReport;
    use georef_pipeline::store::{MapRecord, StoredPoint};
    use tempfile::{NamedTempFile, TempDir, tempdir};

    fn write_json<T: Serialize>(value: &T, path: &Path) {
        serde_json::to_writer_pretty(fs::File::create(path).unwrap(), value).unwrap();
    }

    fn run_args(args: &[&str]) -> Result<String> {
        let cli = Cli::try_parse_from(std::iter::once("georef").chain(args.iter().copied()))?;
        run(cli)
    }

    fn points_file(points: &[CorrespondencePoint]) -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        write_json(&points, file.path());
        file
    }

    fn store_path(dir: &TempDir) -> String {
        dir.path().join("maps.json").to_str().unwrap().to_string()
    }

    #[test]
    fn fit_reports_affine_for_three_points() {
        let file = points_file(&[
            CorrespondencePoint::from_tuples((0.0, 0.0), (10.0, 20.0)),
            CorrespondencePoint::from_tuples((1.0, 0.0), (11.0, 20.0)),
            CorrespondencePoint::from_tuples((0.0, 1.0), (10.0, 21.0)),
        ]);
        let json = run_args(&["fit", "--points", file.path().to_str().unwrap()])
            .expect("fit should succeed");

        let report: FitReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report.model.kind(), TransformModel::AFFINE);
        assert_eq!(report.residuals.count, 3);
        assert!(report.residuals.max < 1e-9, "max {}", report.residuals.max);
    }

    #[test]
    fn fit_needs_two_points() {
        let file = points_file(&[CorrespondencePoint::from_tuples((0.0, 0.0), (1.0, 1.0))]);
        let err = run_args(&["fit", "--points", file.path().to_str().unwrap()]).unwrap_err();
        assert!(err.to_string().contains("at least two"), "{err}");
    }

    #[test]
    fn to_geo_and_to_pixel_with_negative_values() {
        let file = points_file(&[
            CorrespondencePoint::from_tuples((0.0, 0.0), (0.0, 0.0)),
            CorrespondencePoint::from_tuples((100.0, 0.0), (0.0, 1.0)),
        ]);
        let path = file.path().to_str().unwrap();

        let json = run_args(&["to-geo", "--points", path, "--x", "-50", "--y", "0"]).unwrap();
        let geo: GeoCoordinate = serde_json::from_str(&json).unwrap();
        assert!(geo.lon.abs() < 1e-12, "lon {}", geo.lon);
        assert!((geo.lat + 0.5).abs() < 1e-12, "lat {}", geo.lat);

        let json = run_args(&["to-pixel", "--points", path, "--lon", "0", "--lat", "-0.5"]).unwrap();
        let px: PixelCoordinate = serde_json::from_str(&json).unwrap();
        assert!((px.x + 50.0).abs() < 1e-9, "x {}", px.x);
        assert!(px.y.abs() < 1e-9, "y {}", px.y);
    }

    #[test]
    fn to_pixel_reports_singular_model() {
        let file = points_file(&[
            CorrespondencePoint::from_tuples((0.0, 0.0), (5.0, 5.0)),
            CorrespondencePoint::from_tuples((10.0, 0.0), (5.0, 5.0)),
        ]);
        let err = run_args(&[
            "to-pixel",
            "--points",
            file.path().to_str().unwrap(),
            "--lon",
            "5",
            "--lat",
            "5",
        ])
        .unwrap_err();
        assert_eq!(
            err.downcast_ref::<TransformError>(),
            Some(&TransformError::SingularTransform)
        );
    }

    #[test]
    fn store_workflow() -> Result<()> {
        let dir = tempdir()?;
        let store = store_path(&dir);

        let json = run_args(&[
            "map", "--store", &store, "create", "--name", "campus", "--width", "1000",
            "--height", "1000",
        ])?;
        let map: MapRecord = serde_json::from_str(&json)?;
        let map_id = map.id.0.to_string();

        let json = run_args(&[
            "locate", "--store", &store, "--map", &map_id, "--lon", "13.05", "--lat", "52.0",
        ])?;
        assert_eq!(json.trim(), "null");

        let mut ids = Vec::new();
        for (x, y, lon, lat) in [
            ("0", "0", "13.0", "52.0"),
            ("1000", "0", "13.1", "52.0"),
            ("0", "1000", "13.0", "51.9"),
        ] {
            let json = run_args(&[
                "point", "--store", &store, "add", "--map", &map_id, "--x", x, "--y", y,
                "--lon", lon, "--lat", lat,
            ])?;
            let point: StoredPoint = serde_json::from_str(&json)?;
            ids.push(point.id.0.to_string());
        }

        let json = run_args(&[
            "locate", "--store", &store, "--map", &map_id, "--lon", "13.05", "--lat", "51.95",
        ])?;
        let px: PixelCoordinate = serde_json::from_str(&json)?;
        assert!(px.distance(&PixelCoordinate::new(500.0, 500.0)) < 1e-6, "{:?}", px);

        let json = run_args(&[
            "pick", "--store", &store, "--map", &map_id, "--x", "1000", "--y", "1000",
        ])?;
        let geo: GeoCoordinate = serde_json::from_str(&json)?;
        assert!(geo.distance(&GeoCoordinate::new(13.1, 51.9)) < 1e-9, "{:?}", geo);

        run_args(&[
            "point", "--store", &store, "update", "--id", &ids[2], "--lon", "13.0", "--lat",
            "51.8",
        ])?;
        let json = run_args(&[
            "pick", "--store", &store, "--map", &map_id, "--x", "0", "--y", "1000",
        ])?;
        let geo: GeoCoordinate = serde_json::from_str(&json)?;
        assert!((geo.lat - 51.8).abs() < 1e-9, "{:?}", geo);

        run_args(&["point", "--store", &store, "delete", "--id", &ids[0]])?;
        let json = run_args(&["point", "--store", &store, "list", "--map", &map_id])?;
        let points: Vec<StoredPoint> = serde_json::from_str(&json)?;
        assert_eq!(points.len(), 2);

        run_args(&["map", "--store", &store, "delete", "--id", &map_id])?;
        let json = run_args(&["map", "--store", &store, "list"])?;
        let maps: Vec<MapRecord> = serde_json::from_str(&json)?;
        assert!(maps.is_empty());
        Ok(())
    }

    #[test]
    fn failed_command_leaves_store_untouched() -> Result<()> {
        let dir = tempdir()?;
        let store = store_path(&dir);
        run_args(&[
            "map", "--store", &store, "create", "--name", "kept", "--width", "10", "--height",
            "10",
        ])?;

        let err = with_store(Path::new(&store), |s| -> Result<()> {
            s.create_map(NewMap {
                name: "half-done".into(),
                image_width: 10,
                image_height: 10,
            })?;
            s.delete_map(MapId(1))?;
            anyhow::bail!("interrupted")
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "interrupted");

        let json = run_args(&["map", "--store", &store, "list"])?;
        let maps: Vec<MapRecord> = serde_json::from_str(&json)?;
        assert_eq!(maps.len(), 1);
        assert_eq!(maps[0].name, "kept");
        Ok(())
    }

    #[test]
    fn update_without_fields_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let store = store_path(&dir);
        assert!(run_args(&["point", "--store", &store, "update", "--id", "1"]).is_err());
        assert!(run_args(&["point", "--store", &store, "update", "--id", "1", "--x", "3"]).is_err());
        Ok(())
    }

    #[test]
    fn config_file_controls_geo_validation() -> Result<()> {
        let dir = tempdir()?;
        let store = store_path(&dir);
        run_args(&[
            "map", "--store", &store, "create", "--name", "synthetic", "--width", "10",
            "--height", "10",
        ])?;
        let add = |extra: &[&str]| {
            let mut args = vec![
                "point", "--store", store.as_str(), "add", "--map", "1", "--x", "1", "--y", "1",
                "--lon", "200", "--lat", "0",
            ];
            args.extend_from_slice(extra);
            run_args(&args)
        };
        assert!(add(&[]).is_err());

        let config = NamedTempFile::new()?;
        write_json(
            &SessionConfig {
                validate_geo_ranges: false,
                ..SessionConfig::default()
            },
            config.path(),
        );
        add(&["--config", config.path().to_str().unwrap()])?;
        Ok(())
    }
}
