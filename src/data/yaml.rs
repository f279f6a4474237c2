//! YAML processing utilities

use anyhow::{Context, Result};
use serde::Serialize;
use yaml_rust_davvid::{Yaml, YamlEmitter};

/// Serialize data structure to YAML string with proper multi-line formatting
pub fn to_yaml<T: Serialize>(data: &T) -> Result<String> {
    // First convert to serde_yaml::Value, then to yaml-rust format
    let serde_value = serde_yaml::to_value(data).context("Failed to serialize to serde value")?;
    let yaml_rust_value = convert_serde_to_yaml_rust(&serde_value);

    // Use yaml-rust emitter with multiline strings enabled
    let mut output = String::new();
    let mut emitter = YamlEmitter::new(&mut output);
    emitter.multiline_strings(true);
    emitter
        .dump(&yaml_rust_value)
        .context("Failed to emit YAML")?;

    Ok(output)
}

/// Convert serde_yaml::Value to yaml_rust_davvid::Yaml
fn convert_serde_to_yaml_rust(value: &serde_yaml::Value) -> Yaml {
    match value {
        serde_yaml::Value::Null => Yaml::Null,
        serde_yaml::Value::Bool(b) => Yaml::Boolean(*b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Yaml::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Yaml::Real(f.to_string())
            } else {
                Yaml::String(n.to_string())
            }
        }
        serde_yaml::Value::String(s) => Yaml::String(s.clone()),
        serde_yaml::Value::Sequence(seq) => {
            Yaml::Array(seq.iter().map(convert_serde_to_yaml_rust).collect())
        }
        serde_yaml::Value::Mapping(map) => {
            let mut yaml_map = yaml_rust_davvid::yaml::Hash::new();
            for (k, v) in map {
                yaml_map.insert(convert_serde_to_yaml_rust(k), convert_serde_to_yaml_rust(v));
            }
            Yaml::Hash(yaml_map)
        }
        // Tags carry no meaning in reports
        serde_yaml::Value::Tagged(tagged) => convert_serde_to_yaml_rust(&tagged.value),
    }
}
