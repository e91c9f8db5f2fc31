//! Python bindings for registry access using PyO3.
//!
//! Roots and value types cross the boundary as their `HKEY_*` / `REG_*`
//! names, exposed as constants on the `HKEY` and `RegistryValueType`
//! classes.

use pyo3::exceptions::{PyOSError, PyPermissionError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyBytes;

use crate::registry as system;
use crate::{RegistryError, RootKey, ValueData, ValueDescriptor, ValueType};

/// Convert Rust RegistryError to Python exception
fn registry_error_to_py(err: RegistryError) -> PyErr {
    match err {
        RegistryError::AccessDenied(msg) => PyPermissionError::new_err(msg),

        RegistryError::Io(e) => PyOSError::new_err(e.to_string()),

        other @ (RegistryError::NotFound(_)
        | RegistryError::MalformedValue { .. }
        | RegistryError::UnsupportedType(_)
        | RegistryError::InvalidHostValue { .. }
        | RegistryError::InvalidPath(_)) => PyValueError::new_err(other.to_string()),
    }
}

fn parse_root(hkey: &str) -> PyResult<RootKey> {
    hkey.parse().map_err(registry_error_to_py)
}

fn parse_type(value_type: &str) -> PyResult<ValueType> {
    value_type.parse().map_err(registry_error_to_py)
}

fn data_to_py(py: Python<'_>, data: &ValueData) -> PyObject {
    match data {
        ValueData::String(s) | ValueData::ExpandString(s) => s.to_object(py),
        ValueData::Dword(d) | ValueData::DwordBigEndian(d) => d.to_object(py),
        ValueData::Qword(q) => q.to_object(py),
        ValueData::MultiString(strings) => strings.to_object(py),
        other => PyBytes::new(py, other.as_bytes().unwrap_or_default()).into_py(py),
    }
}

/// Python wrapper for a registry value
#[pyclass(name = "RegistryValue")]
#[derive(Clone)]
pub struct PyRegistryValue {
    inner: ValueDescriptor,
}

#[pymethods]
impl PyRegistryValue {
    /// Value name ("" for the default value)
    #[getter]
    fn name(&self) -> String {
        self.inner.name.clone()
    }

    /// Type name, e.g. "REG_SZ"
    #[getter]
    fn r#type(&self) -> String {
        self.inner.value_type().name()
    }

    /// Decoded data: str, int, list of str or bytes depending on the type
    #[getter]
    fn data(&self, py: Python<'_>) -> PyObject {
        data_to_py(py, &self.inner.data)
    }

    fn __repr__(&self) -> String {
        format!(
            "RegistryValue(name={:?}, type={}, data={})",
            self.inner.name,
            self.inner.value_type(),
            self.inner.data
        )
    }
}

/// Predefined root keys
#[pyclass(name = "HKEY")]
pub struct PyHkey;

#[pymethods]
impl PyHkey {
    #[classattr]
    const HKEY_CLASSES_ROOT: &'static str = "HKEY_CLASSES_ROOT";
    #[classattr]
    const HKEY_CURRENT_USER: &'static str = "HKEY_CURRENT_USER";
    #[classattr]
    const HKEY_LOCAL_MACHINE: &'static str = "HKEY_LOCAL_MACHINE";
    #[classattr]
    const HKEY_USERS: &'static str = "HKEY_USERS";
    #[classattr]
    const HKEY_CURRENT_CONFIG: &'static str = "HKEY_CURRENT_CONFIG";
}

/// Registry value type names
#[pyclass(name = "RegistryValueType")]
pub struct PyRegistryValueType;

#[pymethods]
impl PyRegistryValueType {
    #[classattr]
    const REG_NONE: &'static str = "REG_NONE";
    #[classattr]
    const REG_SZ: &'static str = "REG_SZ";
    #[classattr]
    const REG_EXPAND_SZ: &'static str = "REG_EXPAND_SZ";
    #[classattr]
    const REG_BINARY: &'static str = "REG_BINARY";
    #[classattr]
    const REG_DWORD: &'static str = "REG_DWORD";
    #[classattr]
    const REG_DWORD_BIG_ENDIAN: &'static str = "REG_DWORD_BIG_ENDIAN";
    #[classattr]
    const REG_LINK: &'static str = "REG_LINK";
    #[classattr]
    const REG_MULTI_SZ: &'static str = "REG_MULTI_SZ";
    #[classattr]
    const REG_QWORD: &'static str = "REG_QWORD";
}

/// List the values of a key; a missing key gives an empty list
#[pyfunction]
#[pyo3(signature = (hkey, key = None))]
fn enumerate_values(hkey: &str, key: Option<&str>) -> PyResult<Vec<PyRegistryValue>> {
    let values = system::enumerate_values(parse_root(hkey)?, key).map_err(registry_error_to_py)?;
    Ok(values
        .into_iter()
        .map(|inner| PyRegistryValue { inner })
        .collect())
}

/// List the subkey names of a key; a missing key gives an empty list
#[pyfunction]
#[pyo3(signature = (hkey, key = None))]
fn enumerate_keys(hkey: &str, key: Option<&str>) -> PyResult<Vec<String>> {
    system::enumerate_keys(parse_root(hkey)?, key).map_err(registry_error_to_py)
}

/// Read one value by name, or None
#[pyfunction]
#[pyo3(signature = (hkey, key, name))]
fn read_value(hkey: &str, key: Option<&str>, name: &str) -> PyResult<Option<PyRegistryValue>> {
    let value = system::read_value(parse_root(hkey)?, key, name).map_err(registry_error_to_py)?;
    Ok(value.map(|inner| PyRegistryValue { inner }))
}

/// Write a value; returns False when the type or value is not supported
#[pyfunction]
#[pyo3(signature = (hkey, key, name, value_type, value))]
fn set_value(hkey: &str, key: Option<&str>, name: &str, value_type: &str, value: &str) -> PyResult<bool> {
    system::set_value(parse_root(hkey)?, key, name, parse_type(value_type)?, value)
        .map_err(registry_error_to_py)
}

/// Create a key and its missing parents
#[pyfunction]
#[pyo3(signature = (hkey, key))]
fn create_key(hkey: &str, key: Option<&str>) -> PyResult<bool> {
    system::create_key(parse_root(hkey)?, key).map_err(registry_error_to_py)
}

/// Python module definition
#[pymodule]
fn reg_access(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<PyRegistryValue>()?;
    m.add_class::<PyHkey>()?;
    m.add_class::<PyRegistryValueType>()?;

    m.add_function(wrap_pyfunction!(enumerate_values, m)?)?;
    m.add_function(wrap_pyfunction!(enumerate_keys, m)?)?;
    m.add_function(wrap_pyfunction!(read_value, m)?)?;
    m.add_function(wrap_pyfunction!(set_value, m)?)?;
    m.add_function(wrap_pyfunction!(create_key, m)?)?;

    // Add version constant
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
