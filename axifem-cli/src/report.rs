//! Plain-text node tables, one row per node, nodes numbered from 1.

use anyhow::Result;
use axifem_core::{AnalysisResults, NodeResult};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

const AFQ_HEADER: [&str; 7] = ["node", "a_r", "a_z", "f_r", "f_z", "q_r", "q_z"];
const STRAIN_HEADER: [&str; 5] = ["node", "eps_r", "eps_z", "eps_t", "gam_rz"];
const STRESS_HEADER: [&str; 5] = ["node", "sig_r", "sig_z", "sig_t", "tau_rz"];
const PRINCIPAL_HEADER: [&str; 15] = [
    "node", "sig_1", "sig_2", "sig_3", "tau_max", "von_mises", "n1_r", "n1_t", "n1_z", "n2_r",
    "n2_t", "n2_z", "n3_r", "n3_t", "n3_z",
];

/// Write `afq.txt`, `strains.txt`, `stresses.txt` and `principal.txt`.
pub fn write_tables(dir: &Path, results: &AnalysisResults) -> Result<()> {
    fs::create_dir_all(dir)?;

    write_table(&dir.join("afq.txt"), &AFQ_HEADER, results, |n| {
        let mut row = Vec::with_capacity(6);
        row.extend(n.displacement);
        row.extend(n.load);
        row.extend(n.reaction);
        row
    })?;
    write_table(&dir.join("strains.txt"), &STRAIN_HEADER, results, |n| {
        n.strain.to_vec()
    })?;
    write_table(&dir.join("stresses.txt"), &STRESS_HEADER, results, |n| {
        n.stress.to_vec()
    })?;
    write_table(&dir.join("principal.txt"), &PRINCIPAL_HEADER, results, |n| {
        let p = &n.principal;
        let mut row = Vec::with_capacity(14);
        row.extend(p.values);
        row.push(p.tau_max);
        row.push(p.von_mises);
        for direction in &p.directions {
            row.extend(direction);
        }
        row
    })?;
    Ok(())
}

fn write_table<F>(
    path: &Path,
    header: &[&str],
    results: &AnalysisResults,
    columns: F,
) -> Result<()>
where
    F: Fn(&NodeResult) -> Vec<f64>,
{
    let mut out = BufWriter::new(File::create(path)?);

    write!(out, "{:>8}", header[0])?;
    for name in &header[1..] {
        write!(out, " {:>15}", name)?;
    }
    writeln!(out)?;

    for node in &results.nodes {
        write!(out, "{:>8}", node.node + 1)?;
        for value in columns(node) {
            write!(out, " {:>15.6e}", value)?;
        }
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axifem_core::{
        run_analysis, AnalysisOptions, Direction, Material, Mesh, Model, Point2, PointLoad,
        RestraintGroup,
    };

    fn results() -> AnalysisResults {
        let mut mesh = Mesh::new();
        mesh.add_nodes([
            Point2::new(1.0, 0.0),
            Point2::new(1.5, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 0.5),
            Point2::new(2.0, 1.0),
            Point2::new(1.5, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 0.5),
        ]);
        mesh.add_element([0, 1, 2, 3, 4, 5, 6, 7], 0).unwrap();
        let mut model = Model::new(mesh, vec![Material::new(1e6, 0.3, 0.0).unwrap()]);
        model.restrain(&RestraintGroup::new(vec![0, 6, 7], Direction::Rz));
        let model = model.with_point_loads([PointLoad { dof: 5, value: 1.0 }]);
        run_analysis(&model, &AnalysisOptions::default()).unwrap()
    }

    #[test]
    fn test_tables_written() {
        let dir = std::env::temp_dir().join(format!("axifem-tables-{}", std::process::id()));
        write_tables(&dir, &results()).unwrap();

        for (name, columns) in [
            ("afq.txt", 7),
            ("strains.txt", 5),
            ("stresses.txt", 5),
            ("principal.txt", 15),
        ] {
            let text = fs::read_to_string(dir.join(name)).unwrap();
            let lines: Vec<&str> = text.lines().collect();
            assert_eq!(lines.len(), 9, "{}", name);
            assert_eq!(lines[1].split_whitespace().count(), columns, "{}", name);
            assert_eq!(lines[1].split_whitespace().next(), Some("1"));
            assert_eq!(lines[8].split_whitespace().next(), Some("8"));
        }
        fs::remove_dir_all(&dir).unwrap();
    }
}
