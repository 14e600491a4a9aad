use std::path::{Path, PathBuf};

use pyo3::prelude::*;
use pyo3::types::PyBytes;
use pyo3_polars::PyDataFrame;

use crate::filter::FilterSelection;
use crate::images::ResolvedImage;
use crate::metrics::MetricsSnapshot;
use crate::model::DashboardModel;

/// KPI snapshot as seen from Python.
#[pyclass(name = "Metrics")]
pub struct PyMetrics {
    #[pyo3(get)]
    store_count: usize,
    #[pyo3(get)]
    bay_count: usize,
    #[pyo3(get)]
    record_count: usize,
    #[pyo3(get)]
    avg_per_bay: f64,
    #[pyo3(get)]
    reset_count: usize,
}

impl From<MetricsSnapshot> for PyMetrics {
    fn from(m: MetricsSnapshot) -> Self {
        Self {
            store_count: m.store_count,
            bay_count: m.bay_count,
            record_count: m.record_count,
            avg_per_bay: m.avg_per_bay,
            reset_count: m.reset_count,
        }
    }
}

#[pyclass(name = "ResolvedImage")]
pub struct PyResolvedImage {
    inner: ResolvedImage,
}

#[pymethods]
impl PyResolvedImage {
    #[getter]
    fn bytes<'py>(&self, py: Python<'py>) -> Bound<'py, PyBytes> {
        PyBytes::new(py, &self.inner.bytes)
    }

    #[getter]
    fn file_name(&self) -> &str {
        &self.inner.file_name
    }

    /// Provenance caption: "local folder", "uploaded bundle", or
    /// "built-in repository".
    #[getter]
    fn caption(&self) -> &'static str {
        self.inner.source.caption()
    }
}

/// Session handle the dashboard front end drives.
///
/// DataFrames cross the boundary as polars frames; the front end hands
/// them straight to its chart widgets.
#[pyclass]
pub struct ResetDashboard {
    model: DashboardModel,
}

#[pymethods]
impl ResetDashboard {
    #[new]
    fn new() -> Self {
        Self {
            model: DashboardModel::new(),
        }
    }

    // ── Data loading ────────────────────────────────────────────────────────

    /// Load a .csv or .xls/.xlsx upload and return the normalized activity
    /// table. Raises on unsupported extensions; the caller shows the
    /// message and stops processing that upload.
    fn load(&mut self, path: &str) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(self.model.load(Path::new(path))?))
    }

    #[getter]
    fn activity_df(&self) -> Option<PyDataFrame> {
        self.model.activity().cloned().map(PyDataFrame)
    }

    #[getter]
    fn summary_df(&self) -> Option<PyDataFrame> {
        self.model.summary().cloned().map(PyDataFrame)
    }

    #[getter]
    fn resets_df(&self) -> Option<PyDataFrame> {
        self.model.resets().cloned().map(PyDataFrame)
    }

    // ── Selector population ─────────────────────────────────────────────────

    fn vendors(&self) -> PyResult<Vec<String>> {
        Ok(self.model.vendors()?)
    }

    fn programs(&self, vendor: &str) -> PyResult<Vec<String>> {
        Ok(self.model.programs(vendor)?)
    }

    // ── Filtering, metrics, charts ──────────────────────────────────────────

    fn filtered(&self, vendor: &str, program: &str) -> PyResult<PyDataFrame> {
        let selection = FilterSelection::new(vendor, program);
        Ok(PyDataFrame(self.model.filtered(&selection)?))
    }

    fn metrics(&self, vendor: &str, program: &str) -> PyResult<PyMetrics> {
        let selection = FilterSelection::new(vendor, program);
        Ok(self.model.metrics(&selection)?.into())
    }

    fn maintenance_by_store(&self, vendor: &str, program: &str) -> PyResult<PyDataFrame> {
        let selection = FilterSelection::new(vendor, program);
        Ok(PyDataFrame(self.model.maintenance_by_store(&selection)?))
    }

    fn maintenance_by_month(&self, vendor: &str, program: &str) -> PyResult<PyDataFrame> {
        let selection = FilterSelection::new(vendor, program);
        Ok(PyDataFrame(self.model.maintenance_by_month(&selection)?))
    }

    fn resets_by_program(&self, vendor: &str) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(self.model.resets_by_program(vendor)?))
    }

    fn resets_by_store(&self, vendor: &str) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(self.model.resets_by_store(vendor)?))
    }

    // ── Images ──────────────────────────────────────────────────────────────

    #[pyo3(signature = (local_folder=None, bundle_dirs=None, built_in=None))]
    fn set_image_sources(
        &mut self,
        local_folder: Option<String>,
        bundle_dirs: Option<Vec<String>>,
        built_in: Option<String>,
    ) {
        let bundles: Vec<PathBuf> = bundle_dirs
            .unwrap_or_default()
            .into_iter()
            .map(PathBuf::from)
            .collect();
        self.model.set_image_sources(
            local_folder.map(PathBuf::from),
            &bundles,
            built_in.map(PathBuf::from),
        );
    }

    fn resolve_image(&self, key: &str) -> PyResult<Option<PyResolvedImage>> {
        Ok(self
            .model
            .resolve_image(key)?
            .map(|inner| PyResolvedImage { inner }))
    }
}
