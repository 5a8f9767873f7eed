//! HDF5 storage behind `.jld2` artifacts.
//!
//! JLD2 files are HDF5 files, so each entry is stored under its key:
//! objects as groups, numbers and booleans as scalar datasets, numeric
//! arrays as one-dimensional datasets, and strings as unicode scalars.
//! Nulls are skipped.

use std::path::Path;

use hdf5::{File, Group, H5Type, types::VarLenUnicode};
use ndarray::{Array1, arr0};
use serde_json::Value;

pub(super) fn create(path: &Path) -> hdf5::Result<()> {
    File::create(path).map(drop)
}

pub(super) fn append(path: &Path, key: &str, value: &Value) -> hdf5::Result<()> {
    let file = File::append(path)?;
    write(&file, key, value)
}

fn write(group: &Group, name: &str, value: &Value) -> hdf5::Result<()> {
    match value {
        Value::Null => Ok(()),
        Value::Bool(flag) => scalar(group, name, u8::from(*flag)),
        Value::Number(number) => {
            let number = number
                .as_f64()
                .ok_or_else(|| format!("`{name}` does not fit in an f64"))?;
            scalar(group, name, number)
        }
        Value::String(text) => {
            let text: VarLenUnicode = text
                .parse()
                .map_err(|err| format!("`{name}` is not storable: {err}"))?;
            scalar(group, name, text)
        }
        Value::Array(items) => {
            let numbers = items
                .iter()
                .map(Value::as_f64)
                .collect::<Option<Vec<f64>>>()
                .ok_or_else(|| format!("`{name}` is not a numeric array"))?;
            group
                .new_dataset_builder()
                .with_data(&Array1::from(numbers))
                .create(name)?;
            Ok(())
        }
        Value::Object(entries) => {
            let child = group.create_group(name)?;
            entries
                .iter()
                .try_for_each(|(key, value)| write(&child, key, value))
        }
    }
}

fn scalar<T: H5Type + Clone>(group: &Group, name: &str, value: T) -> hdf5::Result<()> {
    group
        .new_dataset_builder()
        .with_data(&arr0(value))
        .create(name)?;
    Ok(())
}
