use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Result, RunnerError};

/// A run request: model input plus where results should go.
pub struct Environment<I = ()> {
    input_json: serde_json::Map<String, Value>,
    pub input: I,
    pub seed: u64,
    pub replicate: u64,
    output: Value,
}

impl Environment {
    pub fn from_json(data: Value) -> Self {
        let mut input_json = data
            .get("input")
            .and_then(|v| v.as_object())
            .cloned()
            .unwrap_or_default();

        let seed = input_json
            .remove("seed")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);

        let replicate = input_json
            .remove("replicate")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);

        let output = data.get("output").cloned().unwrap_or(Value::Null);

        Self {
            input_json,
            input: (),
            seed,
            replicate,
            output,
        }
    }

    pub fn from_stdin() -> Result<Self> {
        let mut raw = String::new();
        io::stdin().read_to_string(&mut raw)?;
        if raw.trim().is_empty() {
            return Err(RunnerError::EmptyInput);
        }
        let data: Value = serde_json::from_str(&raw)?;
        Ok(Self::from_json(data))
    }

    /// Same document shape as stdin, written as `[input]` and `[output]` tables.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let data: Value = toml::from_str(&raw)?;
        Ok(Self::from_json(data))
    }

    pub fn with_input_type<I: DeserializeOwned>(self) -> Result<Environment<I>> {
        let input = serde_json::from_value(Value::Object(self.input_json.clone()))?;
        Ok(Environment {
            input_json: self.input_json,
            input,
            seed: self.seed,
            replicate: self.replicate,
            output: self.output,
        })
    }
}

impl<I> Environment<I> {
    pub fn output_dir(&self) -> Option<PathBuf> {
        let output = &self.output;

        if output.get("spec").and_then(|v| v.as_str()) == Some("filesystem") {
            return output
                .get("dir")
                .and_then(|v| v.as_str())
                .map(PathBuf::from);
        }

        // Profiled output: prefer `default`, else the first profile
        let profile = output
            .get("profile")
            .and_then(|v| v.as_object())
            .and_then(|profiles| profiles.get("default").or_else(|| profiles.values().next()))?;
        if profile.get("spec").and_then(|v| v.as_str()) == Some("filesystem") {
            return profile.get("dir").and_then(|v| v.as_str()).map(PathBuf::from);
        }

        None
    }

    /// Writes `data` into the output directory. Returns the written path, or
    /// `None` without writing when results go to stdout.
    pub fn write_file(&self, filename: &str, data: &[u8]) -> Result<Option<PathBuf>> {
        let Some(dir) = self.output_dir() else {
            return Ok(None);
        };
        fs::create_dir_all(&dir)?;
        let path = dir.join(filename);
        fs::write(&path, data)?;
        Ok(Some(path))
    }

    pub fn write_csv(&self, filename: &str, headers: &[&str], rows: &[Vec<String>]) -> Result<()> {
        if let Some(dir) = self.output_dir() {
            fs::create_dir_all(&dir)?;
            let file = fs::File::create(dir.join(filename))?;
            write_records(csv::Writer::from_writer(file), headers, rows)
        } else {
            write_records(csv::Writer::from_writer(io::stdout()), headers, rows)
        }
    }
}

fn write_records<W: Write>(
    mut wtr: csv::Writer<W>,
    headers: &[&str],
    rows: &[Vec<String>],
) -> Result<()> {
    wtr.write_record(headers)?;
    for row in rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}
