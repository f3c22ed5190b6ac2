//! Whole-run serializers over a finished [`SimulationResult`]. A failed
//! export is logged and returned to the caller; it never invalidates the
//! in-memory result.

use std::path::{Path, PathBuf};

use ixa::info;

use crate::{error::ModelError, simulation::SimulationResult};

pub mod html;
pub mod tab_delimited;

type ExportFn = fn(&SimulationResult, &Path) -> Result<(), ModelError>;

/// Write every export named in the run's parameters into `output_dir`.
/// Returns the failures, each wrapped with the path it was writing.
pub fn export_all(result: &SimulationResult, output_dir: &Path) -> Vec<ModelError> {
    let requested: [(Option<&String>, ExportFn); 2] = [
        (
            result.params.tab_delimited_export.as_ref(),
            tab_delimited::write,
        ),
        (result.params.html_export.as_ref(), html::write),
    ];

    let mut failures = Vec::new();
    for (name, export) in requested {
        let Some(name) = name else { continue };
        let path = output_dir.join(name);
        if let Err(e) = run_export(result, &path, export) {
            failures.push(e);
        }
    }
    failures
}

fn run_export(result: &SimulationResult, path: &Path, export: ExportFn) -> Result<(), ModelError> {
    match export(result, path) {
        Ok(()) => {
            info!("Wrote {}", path.display());
            Ok(())
        }
        Err(source) => {
            let e = ModelError::Export {
                path: PathBuf::from(path),
                source: Box::new(source),
            };
            ixa::error!("{e}");
            Err(e)
        }
    }
}

#[cfg(test)]
mod test {
    use tempfile::tempdir;

    use super::export_all;
    use crate::{error::ModelError, parameters::Params, simulation::Simulation};

    fn params() -> Params {
        Params {
            population: 1000.0,
            initial_infected: 10.0,
            initial_recovered: 0.0,
            beta_hammer: 0.1,
            beta_dance: 0.5,
            gamma: 0.1,
            max_days: 30.0,
            hammer_threshold: 50.0,
            dance_threshold: 20.0,
            dt: 1.0,
            tab_delimited_export: Some("data.txt".to_string()),
            html_export: Some("graph.html".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_export_all_writes_requested_files() {
        let result = Simulation::new(&params()).unwrap().run();
        let temp_dir = tempdir().unwrap();
        let failures = export_all(&result, temp_dir.path());
        assert!(failures.is_empty());
        assert!(temp_dir.path().join("data.txt").exists());
        assert!(temp_dir.path().join("graph.html").exists());
    }

    #[test]
    fn test_export_all_skips_unrequested() {
        let p = Params {
            html_export: None,
            ..params()
        };
        let result = Simulation::new(&p).unwrap().run();
        let temp_dir = tempdir().unwrap();
        assert!(export_all(&result, temp_dir.path()).is_empty());
        assert!(!temp_dir.path().join("graph.html").exists());
    }

    #[test]
    fn test_export_failure_is_not_fatal() {
        let result = Simulation::new(&params()).unwrap().run();
        let temp_dir = tempdir().unwrap();
        let missing = temp_dir.path().join("does_not_exist");
        let failures = export_all(&result, &missing);

        assert_eq!(failures.len(), 2);
        for failure in &failures {
            match failure {
                ModelError::Export { path, .. } => assert!(path.starts_with(&missing)),
                other => panic!("Expected an export error. Instead got {other:?}"),
            }
        }
        // The in-memory result is still whole.
        assert_eq!(result.series.len(), 30);
    }
}
