//! Line-oriented input format: four `<base>.*.txt` files per problem,
//! `#` begins a comment. The format-specific parsing lives here, at the
//! CLI boundary, next to the binary that consumes it, rather than inside
//! the solver crate.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use dumproute_core::problem::capacity::Capacity;
use dumproute_core::problem::catalog::NodeCatalog;
use dumproute_core::problem::location::Location;
use dumproute_core::problem::node::{Node, NodeBuilder, NodeId, NodeKind};
use dumproute_core::problem::time_window::TimeWindow;
use dumproute_core::problem::vehicle::{ObjectiveWeights, Vehicle, VehicleBuilder};
use dumproute_core::problem::Problem;
use dumproute_matrix::TravelTimeMatrix;

use crate::error::ProblemError;

/// The four files named by `--base <dir>` for one problem instance.
pub struct ProblemFiles {
    pub containers: PathBuf,
    pub otherlocs: PathBuf,
    pub vehicles: PathBuf,
    pub matrix: PathBuf,
}

impl ProblemFiles {
    pub fn new(base_dir: &Path, base_name: &str) -> Self {
        Self {
            containers: base_dir.join(format!("{base_name}.containers.txt")),
            otherlocs: base_dir.join(format!("{base_name}.otherlocs.txt")),
            vehicles: base_dir.join(format!("{base_name}.vehicles.txt")),
            matrix: base_dir.join(format!("{base_name}.dmatrix-time.txt")),
        }
    }
}

/// Non-comment, non-blank lines of `path`, each tagged with its 1-based
/// line number so a malformed line can be reported as a single diagnostic
/// identifying file and line number.
pub(crate) fn data_lines(path: &Path) -> Result<Vec<(usize, String)>, ProblemError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(contents
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(n, line)| (n, line.to_string()))
        .collect())
}

fn malformed(path: &Path, line: usize, reason: impl Into<String>) -> ProblemError {
    ProblemError::InputMalformed {
        file: path.display().to_string(),
        line,
        reason: reason.into(),
    }
}

fn semantic(path: &Path, reason: impl Into<String>) -> ProblemError {
    ProblemError::SemanticInvalid {
        file: path.display().to_string(),
        reason: reason.into(),
    }
}

fn field<'a>(path: &Path, line: usize, fields: &[&'a str], idx: usize, name: &str) -> Result<&'a str, ProblemError> {
    fields
        .get(idx)
        .copied()
        .ok_or_else(|| malformed(path, line, format!("missing field '{name}' (column {idx})")))
}

fn parse_f64(path: &Path, line: usize, raw: &str, name: &str) -> Result<f64, ProblemError> {
    raw.parse()
        .map_err(|_| malformed(path, line, format!("'{raw}' is not a valid number for '{name}'")))
}

fn parse_kind(path: &Path, line: usize, raw: &str) -> Result<NodeKind, ProblemError> {
    match raw.to_ascii_lowercase().as_str() {
        "0" | "depot" => Ok(NodeKind::Depot),
        "1" | "dump" => Ok(NodeKind::Dump),
        "2" | "pickup" | "container" => Ok(NodeKind::Pickup),
        other => Err(malformed(path, line, format!("unknown kind tag '{other}'"))),
    }
}

/// One parsed container/otherlocs line, before external ids are resolved
/// into dense `NodeId`s (the matrix and vehicle files reference nodes by
/// the same external id, so every location line across both files must be
/// gathered before the dense index space is assigned).
struct RawLocation {
    external_id: String,
    node: Node,
}

fn parse_location_line(path: &Path, line: usize, text: &str) -> Result<RawLocation, ProblemError> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    let external_id = field(path, line, &fields, 0, "id")?.to_string();
    let x = parse_f64(path, line, field(path, line, &fields, 1, "x")?, "x")?;
    let y = parse_f64(path, line, field(path, line, &fields, 2, "y")?, "y")?;
    let demand = parse_f64(path, line, field(path, line, &fields, 3, "demand")?, "demand")?;
    let open = parse_f64(path, line, field(path, line, &fields, 4, "open")?, "open")?;
    let close = parse_f64(path, line, field(path, line, &fields, 5, "close")?, "close")?;
    let service = parse_f64(path, line, field(path, line, &fields, 6, "service")?, "service")?;
    let kind = parse_kind(path, line, field(path, line, &fields, 7, "kind_tag")?)?;

    if close < open {
        return Err(malformed(path, line, "close precedes open"));
    }
    if demand < 0.0 {
        return Err(malformed(path, line, "demand must be nonnegative"));
    }

    let node = NodeBuilder::default()
        .set_external_id(external_id.clone())
        .set_kind(kind)
        .set_location(Location::from_xy(x, y))
        .set_demand(Capacity::new(demand))
        .set_time_window(TimeWindow::from_offsets_secs(open, close))
        .set_service_duration(jiff::SignedDuration::from_secs_f64(service))
        .build();

    Ok(RawLocation { external_id, node })
}

struct RawVehicle {
    external_id: String,
    capacity: f64,
    start_depot: String,
    dump: String,
    end_depot: String,
    shift_open: f64,
    shift_close: f64,
    weights: ObjectiveWeights,
}

fn parse_vehicle_line(path: &Path, line: usize, text: &str) -> Result<RawVehicle, ProblemError> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    let external_id = field(path, line, &fields, 0, "id")?.to_string();
    let capacity = parse_f64(path, line, field(path, line, &fields, 1, "capacity")?, "capacity")?;
    let start_depot = field(path, line, &fields, 2, "start_depot")?.to_string();
    let dump = field(path, line, &fields, 3, "dump")?.to_string();
    let end_depot = field(path, line, &fields, 4, "end_depot")?.to_string();
    let shift_open = parse_f64(path, line, field(path, line, &fields, 5, "shift_open")?, "shift_open")?;
    let shift_close = parse_f64(path, line, field(path, line, &fields, 6, "shift_close")?, "shift_close")?;
    let w1 = parse_f64(path, line, field(path, line, &fields, 7, "w1")?, "w1")?;
    let w2 = parse_f64(path, line, field(path, line, &fields, 8, "w2")?, "w2")?;
    let w3 = parse_f64(path, line, field(path, line, &fields, 9, "w3")?, "w3")?;

    if capacity <= 0.0 {
        return Err(semantic(path, format!("vehicle '{external_id}' has non-positive capacity")));
    }

    Ok(RawVehicle {
        external_id,
        capacity,
        start_depot,
        dump,
        end_depot,
        shift_open,
        shift_close,
        weights: ObjectiveWeights {
            travel: w1,
            capacity_violation: w2,
            time_window_violation: w3,
        },
    })
}

/// Parses the four files named by `files` into a fully assembled
/// [`Problem`]. External ids are resolved into dense `NodeId`s in the
/// order they are encountered: `otherlocs.txt` (depots + dumps) first,
/// then `containers.txt` (pickups), giving a dense `0..N` internal id
/// space without depending on any particular external-id scheme.
pub fn parse_problem(files: &ProblemFiles) -> Result<Problem, ProblemError> {
    let mut nodes: Vec<Node> = Vec::new();
    let mut id_lookup: HashMap<String, NodeId> = HashMap::new();

    for (line, text) in data_lines(&files.otherlocs)? {
        let raw = parse_location_line(&files.otherlocs, line, &text)?;
        if !matches!(raw.node.kind(), NodeKind::Depot | NodeKind::Dump) {
            return Err(semantic(
                &files.otherlocs,
                format!("'{}' must be a depot or dump, found {:?}", raw.external_id, raw.node.kind()),
            ));
        }
        register(&files.otherlocs, &mut nodes, &mut id_lookup, raw)?;
    }

    for (line, text) in data_lines(&files.containers)? {
        let raw = parse_location_line(&files.containers, line, &text)?;
        if raw.node.kind() != NodeKind::Pickup {
            return Err(semantic(
                &files.containers,
                format!("'{}' must be a pickup, found {:?}", raw.external_id, raw.node.kind()),
            ));
        }
        register(&files.containers, &mut nodes, &mut id_lookup, raw)?;
    }

    if nodes.is_empty() {
        return Err(semantic(&files.otherlocs, "problem has no nodes at all"));
    }

    let num_locations = nodes.len();
    let mut matrix_entries: Vec<(usize, usize, f64)> = Vec::new();
    for (line, text) in data_lines(&files.matrix)? {
        let fields: Vec<&str> = text.split_whitespace().collect();
        let from_ext = field(&files.matrix, line, &fields, 0, "from_id")?;
        let to_ext = field(&files.matrix, line, &fields, 1, "to_id")?;
        let duration = parse_f64(&files.matrix, line, field(&files.matrix, line, &fields, 2, "duration")?, "duration")?;
        if duration < 0.0 {
            return Err(malformed(&files.matrix, line, "duration must be nonnegative"));
        }
        let from = resolve(&files.matrix, &id_lookup, from_ext)?;
        let to = resolve(&files.matrix, &id_lookup, to_ext)?;
        matrix_entries.push((from.get(), to.get(), duration));
    }
    let matrix = TravelTimeMatrix::from_pairs(num_locations, matrix_entries);
    let catalog = NodeCatalog::new(nodes, matrix);

    let mut vehicles: Vec<Vehicle> = Vec::new();
    for (line, text) in data_lines(&files.vehicles)? {
        let raw = parse_vehicle_line(&files.vehicles, line, &text)?;
        let start_depot = resolve(&files.vehicles, &id_lookup, &raw.start_depot)?;
        let dump = resolve(&files.vehicles, &id_lookup, &raw.dump)?;
        let end_depot = resolve(&files.vehicles, &id_lookup, &raw.end_depot)?;

        for (label, id) in [("start depot", start_depot), ("end depot", end_depot)] {
            if catalog.node(id).kind() != NodeKind::Depot {
                return Err(semantic(
                    &files.vehicles,
                    format!("vehicle '{}' {label} '{}' is not a depot", raw.external_id, catalog.node(id).external_id()),
                ));
            }
        }
        if catalog.node(dump).kind() != NodeKind::Dump {
            return Err(semantic(
                &files.vehicles,
                format!("vehicle '{}' dump '{}' is not a dump", raw.external_id, catalog.node(dump).external_id()),
            ));
        }

        vehicles.push(
            VehicleBuilder::default()
                .set_external_id(raw.external_id)
                .set_capacity(Capacity::new(raw.capacity))
                .set_start_depot(start_depot)
                .set_dump(dump)
                .set_end_depot(end_depot)
                .set_shift(TimeWindow::from_offsets_secs(raw.shift_open, raw.shift_close))
                .set_weights(raw.weights)
                .build(),
        );
    }

    if vehicles.is_empty() {
        return Err(semantic(&files.vehicles, "problem declares no vehicles"));
    }

    Ok(Problem::new(catalog, vehicles))
}

fn register(
    path: &Path,
    nodes: &mut Vec<Node>,
    id_lookup: &mut HashMap<String, NodeId>,
    raw: RawLocation,
) -> Result<(), ProblemError> {
    if id_lookup.contains_key(&raw.external_id) {
        return Err(semantic(path, format!("duplicate node id '{}'", raw.external_id)));
    }
    let id = NodeId::from(nodes.len());
    id_lookup.insert(raw.external_id, id);
    nodes.push(raw.node);
    Ok(())
}

fn resolve(path: &Path, id_lookup: &HashMap<String, NodeId>, external_id: &str) -> Result<NodeId, ProblemError> {
    id_lookup
        .get(external_id)
        .copied()
        .ok_or_else(|| semantic(path, format!("reference to unknown node id '{external_id}'")))
}

/// `--checkData`: parses the four files and reports success/failure without
/// running the solver. Returns the parsed problem so the caller can also
/// print a short summary.
pub fn check_data(files: &ProblemFiles) -> Result<Problem, ProblemError> {
    parse_problem(files)
}
