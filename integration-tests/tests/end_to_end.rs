use std::path::Path;

use approx::assert_relative_eq;
use cabbeling_core::Model;
use cabbeling_setup::{
    ExperimentConfig, RunError,
    artifact::{Artifact, ArtifactFormat, NON_DIMENSIONAL_KEY},
    config::ConditionConfig,
    layer::Regime,
    nondim::NonDimensionalReport,
    profile::{Point, Tracer},
    run::Experiment,
};
use cabbeling_thermo::{EquationOfState, model::eos80::Eos80};
use integration_tests::RecordingEngine;
use tempfile::tempdir;
use uom::si::length::meter;

fn experiment_config(dir: &Path, regime: Regime, salinity: f64, temperature: f64) -> ExperimentConfig {
    let mut config = ExperimentConfig::default();
    config.condition = ConditionConfig {
        regime,
        salinity,
        temperature,
    };
    config.domain.nx = 2;
    config.domain.ny = 2;
    config.domain.nz = 4;
    config.output.directory = dir.to_owned();
    config.output.format = ArtifactFormat::JsonLines;
    config
}

fn assert_same_report(written: &NonDimensionalReport, report: &NonDimensionalReport) {
    assert_relative_eq!(written.prandtl, report.prandtl, max_relative = 1e-12);
    assert_relative_eq!(written.schmidt, report.schmidt, max_relative = 1e-12);
    assert_relative_eq!(written.lewis, report.lewis, max_relative = 1e-12);
    assert_eq!(written.density_ratio.is_some(), report.density_ratio.is_some());
    if let (Some(a), Some(b)) = (written.density_ratio, report.density_ratio) {
        assert_relative_eq!(a, b, max_relative = 1e-12);
    }
}

fn written_report(path: &Path) -> NonDimensionalReport {
    let entries = Artifact::new(path, ArtifactFormat::JsonLines)
        .read_entries()
        .unwrap();
    let mut reports = entries.iter().filter(|entry| entry.key == NON_DIMENSIONAL_KEY);
    let entry = reports.next().expect("report entry is present");
    assert!(reports.next().is_none(), "report is written once");
    serde_json::from_value(entry.value.clone()).unwrap()
}

#[test]
fn stable_experiment_end_to_end() -> Result<(), RunError> {
    let dir = tempdir().unwrap();
    let config = experiment_config(dir.path(), Regime::Stable, 34.8, 1.0);

    let experiment = Experiment::from_config(&config)?;
    let params = experiment.parameters();
    assert_relative_eq!(params.salinity().difference(), 0.1, epsilon = 1e-12);
    assert_eq!(params.temperature().difference(), 0.5);

    let mut engine = RecordingEngine::default();
    let report = experiment.launch(&mut engine, &Eos80)?;

    assert_eq!(
        engine.calls,
        ["set_grid", "set_tracer S", "set_tracer T", "run"]
    );

    // Five strictly increasing faces from the bottom to the surface.
    assert_eq!(engine.faces.len(), 5);
    assert_relative_eq!(engine.faces[0], -1.0, epsilon = 1e-9);
    assert!(engine.faces[4].abs() < 1e-9);
    assert!(engine.faces.windows(2).all(|pair| pair[1] > pair[0]));

    let run = engine.run_config.expect("engine was run");
    assert_eq!(run.artifact.path(), dir.path().join("stable.jsonl"));
    assert_eq!(run.tracers, [Tracer::Salinity, Tracer::Temperature]);

    assert_same_report(&written_report(run.artifact.path()), &report);
    assert!(report.density_ratio.is_some());

    Ok(())
}

#[test]
fn cabbeling_experiment_end_to_end() -> Result<(), RunError> {
    let dir = tempdir().unwrap();
    let config = experiment_config(dir.path(), Regime::Cabbeling, 34.6, -1.5);

    let experiment = Experiment::from_config(&config)?;
    let params = experiment.parameters();
    assert_relative_eq!(params.salinity().difference(), -0.1, epsilon = 1e-12);
    assert_eq!(params.temperature().difference(), -2.0);

    // The perturbation vanishes at the interface itself.
    let salinity = experiment.profile(Tracer::Salinity);
    let at_interface = salinity.call(&Point::new(0.05, 0.05, -0.5))?;
    assert_relative_eq!(at_interface, 34.65, epsilon = 1e-12);

    let mut engine = RecordingEngine::default();
    let report = experiment.launch(&mut engine, &Eos80)?;

    let path = dir.path().join("cabbeling.jsonl");
    assert!(path.exists());
    assert_same_report(&written_report(&path), &report);

    // Colder and fresher above: both contrasts negative, so Ra_ρ is positive.
    let ratio = report.density_ratio.expect("salinity contrast is nonzero");
    assert!(ratio > 0.0);

    let state = config.reference.surface_state();
    let alpha = Eos80.thermal_expansion(&state).unwrap();
    let beta = Eos80.haline_contraction(&state).unwrap();
    assert_relative_eq!(
        ratio,
        (alpha * -2.0) / (beta * (34.6 - 34.7)) / report.lewis,
        max_relative = 1e-9
    );

    Ok(())
}

#[test]
fn isohaline_experiment_omits_density_ratio() -> Result<(), RunError> {
    let dir = tempdir().unwrap();
    let config = experiment_config(dir.path(), Regime::Isohaline, 10.0, -1.5);

    let experiment = Experiment::from_config(&config)?;
    assert_eq!(experiment.parameters().salinity().upper(), 34.7);

    let mut engine = RecordingEngine::default();
    let report = experiment.launch(&mut engine, &Eos80)?;
    assert_eq!(report.density_ratio, None);

    let entries = Artifact::new(dir.path().join("isohaline.jsonl"), ArtifactFormat::JsonLines)
        .read_entries()
        .unwrap();
    assert!(entries[0].value.get("Ra_ρ").is_none());
    assert_relative_eq!(entries[0].value["Le"].as_f64().unwrap(), 100.0, max_relative = 1e-9);

    // Without a salinity contrast the salinity field is the unperturbed
    // reference value below the interface.
    let salinity = &engine.fields[&Tracer::Salinity];
    assert!(salinity.iter().all(|s| *s >= 34.7 - 1e-12));

    Ok(())
}

#[test]
fn each_regime_writes_its_own_artifact() -> Result<(), RunError> {
    let dir = tempdir().unwrap();

    for (regime, salinity, temperature) in [
        (Regime::Stable, 34.8, 1.0),
        (Regime::Cabbeling, 34.6, -1.5),
        (Regime::Unstable, 34.8, 0.5),
        (Regime::Isohaline, 34.7, -1.5),
    ] {
        let config = experiment_config(dir.path(), regime, salinity, temperature);
        Experiment::from_config(&config)?.launch(&mut RecordingEngine::default(), &Eos80)?;
    }

    let mut names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(
        names,
        ["cabbeling.jsonl", "isohaline.jsonl", "stable.jsonl", "unstable.jsonl"]
    );

    Ok(())
}

#[test]
fn repeated_launch_keeps_one_report() -> Result<(), RunError> {
    let dir = tempdir().unwrap();
    let experiment = Experiment::from_config(&experiment_config(
        dir.path(),
        Regime::Cabbeling,
        34.6,
        -1.5,
    ))?;

    let first = experiment.launch(&mut RecordingEngine::default(), &Eos80)?;
    let second = experiment.launch(&mut RecordingEngine::default(), &Eos80)?;
    assert_same_report(&first, &second);

    let path = dir.path().join("cabbeling.jsonl");
    let entries = Artifact::new(&path, ArtifactFormat::JsonLines).read_entries()?;
    let reports = entries
        .iter()
        .filter(|entry| entry.key == NON_DIMENSIONAL_KEY)
        .count();
    assert_eq!(reports, 1);
    assert_same_report(&written_report(&path), &second);

    Ok(())
}

#[test]
fn profiles_sample_identically_across_threads() -> Result<(), RunError> {
    let dir = tempdir().unwrap();
    let experiment = Experiment::from_config(&experiment_config(
        dir.path(),
        Regime::Cabbeling,
        34.6,
        -1.5,
    ))?;
    let profile = experiment.profile(Tracer::Salinity);

    let heights: Vec<f64> = (0..=200).map(|i| -1.0 + f64::from(i) / 200.0).collect();
    let serial: Vec<f64> = heights
        .iter()
        .map(|z| profile.call(&Point::new(0.0, 0.0, *z)))
        .collect::<Result<_, _>>()?;

    let parallel: Vec<f64> = std::thread::scope(|scope| {
        let handles: Vec<_> = heights
            .chunks(50)
            .map(|chunk| {
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|z| profile.call(&Point::new(0.0, 0.0, *z)).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect()
    });

    assert_eq!(serial, parallel);
    Ok(())
}

#[test]
fn sample_experiment_files_load() {
    let experiments = Path::new(env!("CARGO_MANIFEST_DIR")).join("../cabbeling-run/experiments");

    for (file, regime) in [
        ("stable.toml", Regime::Stable),
        ("cabbeling.toml", Regime::Cabbeling),
        ("unstable.toml", Regime::Unstable),
        ("isohaline.toml", Regime::Isohaline),
    ] {
        let text = std::fs::read_to_string(experiments.join(file)).unwrap();

        // The runner-only `[logging]` section is ignored by the library.
        let config = ExperimentConfig::from_toml_str(&text).unwrap();
        assert_eq!(config.condition.regime, regime, "{file}");
        assert_eq!(config.domain.lz.get::<meter>(), 1.0);
    }
}
