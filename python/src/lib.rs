//! PyO3 bindings for the mnemosyne memory core.
//!
//! Stateless functional API mirroring the Rust core exactly: the recurrent
//! state is an opaque value the Python side threads through `step`. No
//! Python-side math; precondition violations surface as ValueError.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use mnemosyne_core::interface::interface_width as rust_interface_width;
use mnemosyne_core::model::DncConfig as RustConfig;
use mnemosyne_core::state::MemoryState as RustState;
use mnemosyne_core::step::{step as rust_step, step_sequence as rust_step_sequence};

// ── DncConfig ────────────────────────────────────────────────────────

#[pyclass(frozen)]
struct DncConfig {
    inner: RustConfig,
}

#[pymethods]
impl DncConfig {
    #[new]
    #[pyo3(signature = (mem_slots, mem_dim, read_heads, usage_epsilon=None))]
    fn new(
        mem_slots: usize,
        mem_dim: usize,
        read_heads: usize,
        usage_epsilon: Option<f32>,
    ) -> PyResult<Self> {
        let mut inner = RustConfig::new(mem_slots, mem_dim, read_heads);
        if let Some(eps) = usage_epsilon {
            inner.usage_epsilon = eps;
        }
        inner
            .validate()
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(DncConfig { inner })
    }

    #[getter]
    fn mem_slots(&self) -> usize {
        self.inner.mem_slots
    }

    #[getter]
    fn mem_dim(&self) -> usize {
        self.inner.mem_dim
    }

    #[getter]
    fn read_heads(&self) -> usize {
        self.inner.read_heads
    }

    #[getter]
    fn usage_epsilon(&self) -> f32 {
        self.inner.usage_epsilon
    }

    /// Width of one batch row of the flat controller interface vector.
    fn interface_width(&self) -> usize {
        rust_interface_width(&self.inner)
    }
}

// ── MemoryState ──────────────────────────────────────────────────────

#[pyclass]
#[derive(Clone)]
struct MemoryState {
    inner: RustState,
}

#[pymethods]
impl MemoryState {
    #[getter]
    fn batch_size(&self) -> usize {
        self.inner.batch_size
    }

    #[getter]
    fn memory(&self) -> Vec<f32> {
        self.inner.memory.clone()
    }

    #[getter]
    fn usage(&self) -> Vec<f32> {
        self.inner.usage.clone()
    }

    #[getter]
    fn read_weights(&self) -> Vec<f32> {
        self.inner.read_weights.clone()
    }

    #[getter]
    fn link(&self) -> Vec<f32> {
        self.inner.link.clone()
    }

    #[getter]
    fn precedence(&self) -> Vec<f32> {
        self.inner.precedence.clone()
    }

    /// Serialize to a JSON blob (the module's opaque persistence format).
    fn to_json(&self) -> PyResult<String> {
        serde_json_string(&self.inner)
    }

    #[staticmethod]
    fn from_json(blob: &str) -> PyResult<MemoryState> {
        let inner: RustState =
            serde_json::from_str(blob).map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(MemoryState { inner })
    }
}

fn serde_json_string(state: &RustState) -> PyResult<String> {
    serde_json::to_string(state).map_err(|e| PyValueError::new_err(e.to_string()))
}

// ── Functional API ───────────────────────────────────────────────────

/// Zeroed recurrent state for `batch_size` independent sequences.
#[pyfunction]
fn get_reset_state(config: &DncConfig, batch_size: usize) -> MemoryState {
    MemoryState {
        inner: RustState::reset(&config.inner, batch_size),
    }
}

/// Advance one step. `interface` is B rows of `interface_width()` values.
/// Returns (read_vectors, new_state); the input state is untouched.
#[pyfunction]
fn step(
    config: &DncConfig,
    state: &MemoryState,
    interface: Vec<f32>,
) -> PyResult<(Vec<f32>, MemoryState)> {
    let (read_vectors, next) = rust_step(&config.inner, &state.inner, &interface)
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    Ok((read_vectors, MemoryState { inner: next }))
}

/// Replay a whole segment (`steps` consecutive B-row interface blocks).
/// Returns (read_vectors per step concatenated, final_state).
#[pyfunction]
fn step_sequence(
    config: &DncConfig,
    state: &MemoryState,
    interfaces: Vec<f32>,
    steps: usize,
) -> PyResult<(Vec<f32>, MemoryState)> {
    let (outputs, next) = rust_step_sequence(&config.inner, &state.inner, &interfaces, steps)
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    Ok((outputs, MemoryState { inner: next }))
}

#[pymodule]
fn mnemosyne(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<DncConfig>()?;
    m.add_class::<MemoryState>()?;
    m.add_function(wrap_pyfunction!(get_reset_state, m)?)?;
    m.add_function(wrap_pyfunction!(step, m)?)?;
    m.add_function(wrap_pyfunction!(step_sequence, m)?)?;
    Ok(())
}
