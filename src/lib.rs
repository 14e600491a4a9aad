pub mod charts;
pub mod error;
pub mod filter;
pub mod images;
pub mod loader;
pub mod metrics;
pub mod model;
pub mod normalize;
pub mod schema;

#[cfg(feature = "python")]
mod bindings;

#[cfg(feature = "python")]
mod python {
    use pyo3::prelude::*;
    use pyo3::types::PyModule;

    use crate::bindings::{PyMetrics, PyResolvedImage, ResetDashboard};
    use crate::schema;

    /// Export schema constants as Python submodules
    fn add_schema_exports(m: &Bound<'_, PyModule>) -> PyResult<()> {
        // Activity
        let activity = PyModule::new(m.py(), "activity")?;
        activity.add("VENDOR", schema::activity::VENDOR)?;
        activity.add("PROGRAM", schema::activity::PROGRAM)?;
        activity.add("STORE", schema::activity::STORE)?;
        activity.add("BAY", schema::activity::BAY)?;
        activity.add("LOCATION", schema::activity::LOCATION)?;
        activity.add("FINISH_TIME", schema::activity::FINISH_TIME)?;
        m.add_submodule(&activity)?;

        // Reset log
        let reset = PyModule::new(m.py(), "reset")?;
        reset.add("VENDOR", schema::reset::VENDOR)?;
        reset.add("PROGRAM", schema::reset::PROGRAM)?;
        reset.add("STORE", schema::reset::STORE)?;
        m.add_submodule(&reset)?;

        // Sheets
        let sheet = PyModule::new(m.py(), "sheet")?;
        sheet.add("DATA", schema::sheet::DATA)?;
        sheet.add("SUMMARY", schema::sheet::SUMMARY)?;
        sheet.add("RESET_UPDATE", schema::sheet::RESET_UPDATE)?;
        m.add_submodule(&sheet)?;

        // Chart columns
        let chart = PyModule::new(m.py(), "chart")?;
        chart.add("MONTH", schema::chart::MONTH)?;
        chart.add("MAINTENANCE_COUNT", schema::chart::MAINTENANCE_COUNT)?;
        chart.add("RESET_COUNT", schema::chart::RESET_COUNT)?;
        m.add_submodule(&chart)?;

        Ok(())
    }

    #[pymodule]
    fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_class::<ResetDashboard>()?;
        m.add_class::<PyMetrics>()?;
        m.add_class::<PyResolvedImage>()?;
        add_schema_exports(m)?;
        Ok(())
    }
}
