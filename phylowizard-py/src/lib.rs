use pyo3::prelude::*;

mod phylo;

#[pymodule]
fn _native(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    phylo::register(m)?;
    Ok(())
}
