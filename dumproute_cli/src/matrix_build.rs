//! `--calculateTM`: rebuilds `<base>.dmatrix-time.txt` by consulting a
//! routing engine, writing the same line-oriented format the solver path
//! reads back. The solver never calls out to a routing engine at query
//! time; this flag is the only caller.

use std::io::Write;
use std::path::Path;

use dumproute_matrix::cache::FileCache;
use dumproute_matrix::engine::{self, EuclideanEngine, GeoPoint};

use crate::error::ProblemError;
use crate::input::ProblemFiles;

/// One (external_id, x, y) triple read off `containers.txt`/`otherlocs.txt`,
/// without building a full [`dumproute_core::problem::Problem`]; a matrix
/// rebuild only needs coordinates, not time windows or demand.
struct LocationPoint {
    external_id: String,
    point: GeoPoint,
}

fn read_points(path: &Path) -> Result<Vec<LocationPoint>, ProblemError> {
    let mut points = Vec::new();
    for (line, text) in crate::input::data_lines(path)? {
        let fields: Vec<&str> = text.split_whitespace().collect();
        let external_id = fields.first().ok_or_else(|| ProblemError::InputMalformed {
            file: path.display().to_string(),
            line,
            reason: "missing field 'id' (column 0)".to_string(),
        })?;
        let parse = |idx: usize, name: &str| -> Result<f64, ProblemError> {
            fields
                .get(idx)
                .ok_or_else(|| ProblemError::InputMalformed {
                    file: path.display().to_string(),
                    line,
                    reason: format!("missing field '{name}' (column {idx})"),
                })?
                .parse::<f64>()
                .map_err(|_| ProblemError::InputMalformed {
                    file: path.display().to_string(),
                    line,
                    reason: format!("not a valid number for '{name}'"),
                })
        };
        let x = parse(1, "x")?;
        let y = parse(2, "y")?;
        points.push(LocationPoint {
            external_id: external_id.to_string(),
            point: GeoPoint::from((x, y)),
        });
    }
    Ok(points)
}

/// Rebuilds the matrix file for one problem base name using a flat-earth
/// fallback engine (`EuclideanEngine`) over the (x, y) columns already
/// present in `containers.txt`/`otherlocs.txt`. A real deployment would
/// swap this for an OSRM/GraphHopper-backed [`dumproute_matrix::engine::RoutingEngine`].
///
/// The built matrix is also persisted through a [`FileCache`] keyed on
/// `base_name`, in the same directory as the four problem files, so a
/// repeated `--calculateTM` on the same problem skips the routing
/// collaborator entirely and reuses the cached matrix.
pub fn calculate_tm(files: &ProblemFiles, base_name: &str, speed_units_per_sec: f64) -> Result<(), ProblemError> {
    let mut points = read_points(&files.otherlocs)?;
    points.extend(read_points(&files.containers)?);
    let geo_points: Vec<GeoPoint> = points.iter().map(|p| p.point).collect();

    let cache_dir = files.matrix.parent().unwrap_or_else(|| Path::new("."));
    let cache = FileCache::new(cache_dir);

    let matrix = match cache.load(base_name)? {
        Some(matrix) => matrix,
        None => {
            let engine = EuclideanEngine { speed_units_per_sec };
            let matrix = engine::build_matrix(&engine, &geo_points)?;
            cache.store(base_name, &matrix)?;
            matrix
        }
    };

    let file = std::fs::File::create(&files.matrix)?;
    let mut writer = std::io::BufWriter::new(file);
    writeln!(writer, "# from_id to_id duration_seconds (generated by --calculateTM)")?;
    for (i, from) in points.iter().enumerate() {
        for (j, to) in points.iter().enumerate() {
            if i == j {
                continue;
            }
            if !matrix.is_reachable(i, j) {
                continue;
            }
            writeln!(writer, "{} {} {:.6}", from.external_id, to.external_id, matrix.travel_time(i, j))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn writes_every_ordered_pair_except_the_diagonal() {
        let dir = tempfile::tempdir().unwrap();
        let otherlocs = dir.path().join("p.otherlocs.txt");
        let containers = dir.path().join("p.containers.txt");
        std::fs::File::create(&otherlocs)
            .unwrap()
            .write_all(b"depot 0 0 0 0 1000000 0 depot\ndump 3 4 0 0 1000000 0 dump\n")
            .unwrap();
        std::fs::File::create(&containers).unwrap().write_all(b"").unwrap();

        let files = ProblemFiles::new(dir.path(), "p");
        calculate_tm(&files, "p", 1.0).unwrap();

        assert!(dir.path().join("p.dmatrix-time.json").is_file());

        let contents = std::fs::read_to_string(&files.matrix).unwrap();
        let data_lines: Vec<&str> = contents.lines().filter(|l| !l.starts_with('#')).collect();
        assert_eq!(data_lines.len(), 2);
        assert!(data_lines.iter().any(|l| l.starts_with("depot dump ")));
    }
}
