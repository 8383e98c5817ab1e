use anyhow::Result;
use nwb_model::domain::model::{Model, VariableValue};
use nwb_model::{ExtendedBuild, InterpreterConfig, NwbModelInterpreter};
use std::collections::{HashMap, HashSet};
use tempfile::TempDir;

fn text(value: &str) -> serde_json::Value {
    serde_json::json!({"type": "text", "value": value})
}

fn series(kind: &str, name: &str, samples: usize) -> serde_json::Value {
    let timestamps: Vec<f64> = (0..samples).map(|i| i as f64 * 0.5).collect();
    let data: Vec<f64> = (0..samples).map(|i| i as f64).collect();
    serde_json::json!({
        "type": "container",
        "value": {
            "kind": kind,
            "name": name,
            "fields": {
                "description": text("recorded trace"),
                "unit": text("mV"),
                "conversion": {"type": "float", "value": 1.0},
                "continuity": {"type": "boolean", "value": true},
                "timestamps": {"type": "array", "value": timestamps},
                "data": {"type": "array", "value": data}
            }
        }
    })
}

/// A session with a populated acquisition, an empty stimulus, a subject, and
/// several kinds that never get their own type.
fn recording() -> serde_json::Value {
    serde_json::json!({
        "type": "container",
        "value": {
            "kind": "file",
            "name": "root",
            "fields": {
                "session_description": text("mouse visual cortex"),
                "identifier": text("42"),
                "acquisition": {"type": "mapping", "value": {"label": "acquisition", "entries": {
                    "unitA": series("time_series", "unitA", 10),
                    "movie": series("image_series", "movie", 4)
                }}},
                "stimulus": {"type": "mapping", "value": {"label": "stimulus", "entries": {}}},
                "subject": {"type": "container", "value": {"kind": "subject", "name": "subject", "fields": {
                    "species": text("Mus musculus"),
                    "weight": {"type": "integer", "value": 25}
                }}},
                "devices": {"type": "mapping", "value": {"label": "devices", "entries": {
                    "probe": {"type": "container", "value": {"kind": "device", "name": "probe", "fields": {}}}
                }}},
                "trials": {"type": "container", "value": {"kind": "table", "name": "trials", "fields": {}}},
                "keywords": {"type": "set", "value": [text("v1")]},
                "electrode_positions": {"type": "array", "value": [0.0, 1.0]}
            }
        }
    })
}

fn write_recording(dir: &TempDir) -> Result<std::path::PathBuf> {
    let path = dir.path().join("recording.json");
    std::fs::write(&path, serde_json::to_string_pretty(&recording())?)?;
    Ok(path)
}

fn incoming_references(model: &Model) -> HashMap<usize, usize> {
    let mut incoming = HashMap::new();
    let all_variables = model
        .variables
        .iter()
        .chain(model.library.types.iter().flat_map(|t| t.variables.iter()));
    for variable in all_variables {
        if let Some(type_ref) = variable.type_ref() {
            *incoming.entry(type_ref.0).or_insert(0) += 1;
        }
    }
    incoming
}

#[test]
fn test_model_from_file_has_expected_types() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = write_recording(&temp_dir)?;
    let interpreter = NwbModelInterpreter::new(InterpreterConfig::default());

    let session = interpreter.create_model(path)?;
    let model = &session.model;

    let ids: Vec<&str> = model.library.types.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "nwbfile",
            "nwbfile.acquisition",
            "nwbfile.acquisition.unitA",
            "nwbfile.acquisition.movie",
            "nwbfile.subject",
            "nwbfile.devices",
            "nwbfile.Summary",
        ]
    );
    assert_eq!(model.name, "nwb");
    assert_eq!(model.library.id, "nwblib");
    assert_eq!(session.extended, Some(ExtendedBuild::Added(nwb_model::domain::model::TypeRef(6))));
    Ok(())
}

#[test]
fn test_series_fieldsets() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let interpreter = NwbModelInterpreter::new(InterpreterConfig::default());
    let session = interpreter.create_model(write_recording(&temp_dir)?)?;
    let library = &session.model.library;

    let unit_a = library.find_by_id("nwbfile.acquisition.unitA").unwrap();
    let ids: Vec<&str> = unit_a.variables.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(unit_a.name, "timeseries");
    assert_eq!(ids, vec!["description", "unit", "conversion", "time", "data"]);
    assert_eq!(unit_a.variable("conversion").unwrap().text(), Some("1.0"));

    let movie = library.find_by_id("nwbfile.acquisition.movie").unwrap();
    let ids: Vec<&str> = movie.variables.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(movie.name, "imageseries");
    assert_eq!(ids, vec!["description", "unit", "conversion", "timestamps", "num_samples"]);
    assert_eq!(movie.variable("timestamps").unwrap().value, VariableValue::Import);
    assert_eq!(movie.variable("num_samples").unwrap().text(), Some("4"));
    Ok(())
}

#[test]
fn test_empty_mapping_and_suppressed_kinds_are_skipped() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let interpreter = NwbModelInterpreter::new(InterpreterConfig::default());
    let session = interpreter.create_model(write_recording(&temp_dir)?)?;
    let model = &session.model;

    for absent in [
        "nwbfile.stimulus",
        "nwbfile.trials",
        "nwbfile.keywords",
        "nwbfile.electrode_positions",
        "nwbfile.devices.probe",
    ] {
        assert!(model.library.find_by_id(absent).is_none(), "{}", absent);
    }

    let root = model.library.find_by_id("nwbfile").unwrap();
    let ids: Vec<&str> = root.variables.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["session_description", "identifier", "acquisition", "subject", "devices", "Summary"]
    );

    let subject = model.library.find_by_id("nwbfile.subject").unwrap();
    assert_eq!(subject.name, "map");
    assert_eq!(subject.variable("weight").unwrap().text(), Some("25"));
    Ok(())
}

#[test]
fn test_ids_unique_and_graph_is_a_tree() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let interpreter = NwbModelInterpreter::new(InterpreterConfig::default());
    let session = interpreter.create_model(write_recording(&temp_dir)?)?;
    let model = &session.model;

    let unique: HashSet<&str> = model.library.types.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(unique.len(), model.library.types.len());

    let incoming = incoming_references(model);
    for index in 0..model.library.types.len() {
        assert_eq!(incoming.get(&index), Some(&1), "type #{}", index);
    }
    Ok(())
}

#[test]
fn test_building_twice_gives_equal_models() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = write_recording(&temp_dir)?;
    let interpreter = NwbModelInterpreter::new(InterpreterConfig::default());

    let first = interpreter.create_model(path.clone())?;
    let second = interpreter.create_model(path)?;

    assert_eq!(first.model, second.model);
    Ok(())
}

#[test]
fn test_model_serializes_for_the_host() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let interpreter = NwbModelInterpreter::new(InterpreterConfig::default());
    let session = interpreter.create_model(write_recording(&temp_dir)?)?;

    let json = serde_json::to_value(&session.model)?;
    assert_eq!(json["library"]["types"][0]["id"], "nwbfile");
    assert_eq!(json["library"]["types"][0]["abstract"], false);
    assert_eq!(json["variables"][0]["value"]["kind"], "type");
    Ok(())
}

#[test]
fn test_missing_file_is_an_io_error() {
    let interpreter = NwbModelInterpreter::new(InterpreterConfig::default());

    let result = interpreter.create_model("does/not/exist.json");
    assert!(matches!(result, Err(nwb_model::InterpreterError::IoError(_))));
}
