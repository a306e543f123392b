//! Visit output format: one line per visit, `(route_index, sequence,
//! node_id, arrival_time, departure_time, carried_load)`. Plain-text,
//! comma-separated, one line per visit across every route in the solution
//! (unassigned containers are reported separately so a caller can detect a
//! nonzero penalty/unassigned count).

use std::io::Write;

use dumproute_core::problem::Problem;
use dumproute_core::solver::solution::Solution;

fn offset_secs(t: jiff::Timestamp) -> f64 {
    t.duration_since(jiff::Timestamp::UNIX_EPOCH).as_secs_f64()
}

/// Writes one CSV line per visit, in route order, then a trailing summary
/// line reporting unassigned containers and feasibility penalty counts so
/// a caller can detect an infeasible best solution.
pub fn write_solution(problem: &Problem, solution: &Solution<'_>, writer: &mut impl Write) -> std::io::Result<()> {
    writeln!(writer, "route_index,sequence,node_id,arrival_time,departure_time,carried_load")?;
    for (route_index, route) in solution.routes().iter().enumerate() {
        for (sequence, &node_id) in route.nodes().iter().enumerate() {
            let state = route.state_at(sequence);
            let external_id = problem.catalog().node(node_id).external_id();
            writeln!(
                writer,
                "{route_index},{sequence},{external_id},{:.3},{:.3},{:.3}",
                offset_secs(state.arrival),
                offset_secs(state.departure),
                state.carried_load.value(),
            )?;
        }
    }

    let mut unassigned: Vec<&str> = solution
        .unassigned()
        .iter()
        .map(|&id| problem.catalog().node(id).external_id())
        .collect();
    unassigned.sort_unstable();
    writeln!(writer, "# unassigned: {}", unassigned.join(" "))?;

    let total_tw_violations: u32 = solution.routes().iter().map(|r| r.tw_violations()).sum();
    let total_cap_violations: u32 = solution.routes().iter().map(|r| r.cap_violations()).sum();
    writeln!(
        writer,
        "# cost: {:.3} tw_violations: {total_tw_violations} cap_violations: {total_cap_violations}",
        solution.cost(),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dumproute_core::problem::capacity::Capacity;
    use dumproute_core::problem::catalog::NodeCatalog;
    use dumproute_core::problem::location::Location;
    use dumproute_core::problem::node::{NodeBuilder, NodeKind};
    use dumproute_core::problem::time_window::TimeWindow;
    use dumproute_core::problem::vehicle::VehicleBuilder;
    use dumproute_matrix::TravelTimeMatrix;

    fn tiny_problem() -> Problem {
        let wide = TimeWindow::from_offsets_secs(0.0, 1.0e9);
        let nodes = vec![
            NodeBuilder::default()
                .set_external_id("depot".into())
                .set_kind(NodeKind::Depot)
                .set_location(Location::from_xy(0.0, 0.0))
                .set_time_window(wide)
                .build(),
            NodeBuilder::default()
                .set_external_id("dump".into())
                .set_kind(NodeKind::Dump)
                .set_location(Location::from_xy(1.0, 0.0))
                .set_time_window(wide)
                .build(),
        ];
        let matrix = TravelTimeMatrix::from_constant(2, 1.0);
        let catalog = NodeCatalog::new(nodes, matrix);
        let vehicle = VehicleBuilder::default()
            .set_external_id("v0".into())
            .set_capacity(Capacity::new(10.0))
            .set_start_depot(0usize.into())
            .set_dump(1usize.into())
            .set_end_depot(0usize.into())
            .set_shift(wide)
            .build();
        Problem::new(catalog, vec![vehicle])
    }

    #[test]
    fn writes_a_header_and_a_trailing_summary() {
        let problem = tiny_problem();
        let solution = Solution::new(&problem);
        let mut buf = Vec::new();
        write_solution(&problem, &solution, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("route_index,sequence,node_id"));
        assert!(text.contains("# cost:"));
    }
}
