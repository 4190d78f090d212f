use std::process::ExitCode;

use anyhow::{ensure, Result};
use colored::Colorize;
use json_outputs::outputs::{outputs_from_value, parse_outputs, project, Outputs};
use json_outputs::{convert, infer, ProjectionOptions, Ty, TypeSource, Val};
use serde_json::{json, Value};

/// State documents shaped like what infrastructure runs publish:
/// - scalars, nested objects, lists of records
/// - heterogeneous arrays (→ tuples) and empty arrays
/// - sensitive and unflagged outputs
fn realistic_samples() -> Vec<(&'static str, Value)> {
    vec![
        ("network", json!({"values": {"outputs": {
            "vpc_id": {"value": "vpc-0a1b2c3d", "sensitive": false, "type": "string"},
            "cidr_blocks": {"value": ["10.0.0.0/16", "10.1.0.0/16"], "sensitive": false,
                            "type": ["list", "string"]},
            "subnets": {"value": [
                {"id": "subnet-1", "az": "eu-west-1a", "public": true},
                {"id": "subnet-2", "az": "eu-west-1b", "public": false}
            ], "sensitive": false},
            "db_password": {"value": "hunter2", "sensitive": true},
        }}})),
        ("cluster", json!({"values": {"outputs": {
            "endpoint": {"value": ["api.example.internal", 6443, true], "sensitive": false},
            "node_pools": {"value": [], "sensitive": false},
            "labels": {"value": {"env": "prod", "team": "platform"}, "sensitive": false,
                       "type": ["map", "string"]},
            "kubeconfig": {"value": {"clusters": [{"name": "prod", "server": null}]}},
        }}})),
        ("bare", json!({"outputs": {
            "replicas": {"value": 3, "sensitive": false},
            "weights": {"value": [0.25, 0.75], "sensitive": false},
            "nothing": {"value": null, "sensitive": false},
        }})),
    ]
}

fn check_sample(name: &str, doc: &Value, options: &ProjectionOptions) -> Result<()> {
    let outputs: Outputs = outputs_from_value(doc.clone())?;
    let projection = project(&outputs, options);
    ensure!(!projection.has_errors(), "{name}: unexpected errors: {:?}", projection.diagnostics);

    for (key, entry) in &outputs {
        ensure!(projection.values.get(key).is_some(), "{name}: `{key}` missing from values");
        let public = projection.nonsensitive_values.get(key).is_some();
        ensure!(public != entry.sensitive, "{name}: `{key}` redaction is wrong");

        // inferred conversions mirror their input exactly
        if options.type_source == TypeSource::Inferred {
            let rendered = projection.values.get(key).map(Val::to_json);
            ensure!(rendered.as_ref() == Some(&entry.value), "{name}: `{key}` does not round-trip");
        }
    }

    // converting the rendered projection again changes nothing
    let all = projection.values.to_json();
    let (again, diagnostics) = convert(&all, &projection.values.ty());
    ensure!(diagnostics.is_empty(), "{name}: reconversion reported {diagnostics:?}");
    ensure!(again == projection.values, "{name}: reconversion is not idempotent");

    // and re-inference agrees for inferred projections
    if options.type_source == TypeSource::Inferred {
        ensure!(infer(&all)? == projection.values.ty(), "{name}: re-inference disagrees");
    }
    Ok(())
}

fn check_text_decoding() -> Result<()> {
    let src = r#"{"outputs": {"big": {"value": 1e400, "sensitive": false}, "ok": {"value": 1}}}"#;
    let outputs = parse_outputs(src)?;
    let projection = project(&outputs, &ProjectionOptions::default());
    ensure!(!projection.has_errors(), "unexpected errors: {:?}", projection.diagnostics);
    let big = projection.values.get("big").map(Val::ty);
    ensure!(big == Some(Ty::Number), "literals beyond double range must infer as numbers");
    ensure!(projection.nonsensitive_values.get("big").is_some(), "`big` must be published");
    ensure!(projection.nonsensitive_values.get("ok").is_none(), "`ok` is sensitive by default");
    Ok(())
}

fn main() -> ExitCode {
    let mut failed = 0;
    let option_sets = [
        ("inferred", ProjectionOptions::default()),
        ("declared", ProjectionOptions { type_source: TypeSource::Declared, parallel: false }),
        ("parallel", ProjectionOptions { parallel: true, ..Default::default() }),
    ];
    for (name, doc) in realistic_samples() {
        for (mode, options) in &option_sets {
            match check_sample(name, &doc, options) {
                Ok(()) => eprintln!("{} {name} ({mode})", "✅".green()),
                Err(error) => {
                    failed += 1;
                    eprintln!("{} {name} ({mode}): {error}", "❌".red());
                }
            }
        }
    }
    match check_text_decoding() {
        Ok(()) => eprintln!("{} text decoding", "✅".green()),
        Err(error) => {
            failed += 1;
            eprintln!("{} text decoding: {error}", "❌".red());
        }
    }
    if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
