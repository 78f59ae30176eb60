// src/simulation/results.rs
use std::fmt;

/// One collapse of the field, judged against a target column.
///
/// The second player of the two-sided check stands on the mirrored column,
/// so its outcome is derived (`width - 1 - collapse`) rather than drawn from
/// an independent vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    collapse: usize,
    mirror: usize,
    target: usize,
    coherent: bool,
    probabilities: Vec<f64>,
}

impl Measurement {
    /// Judges `collapse` against `target`: coherent when they are at most
    /// `radius` columns apart. `probabilities` is the vector sampled from.
    pub(crate) fn judge(collapse: usize, target: usize, radius: usize, probabilities: Vec<f64>) -> Self {
        let width = probabilities.len().max(1);
        Self {
            collapse,
            mirror: width - 1 - collapse.min(width - 1),
            target,
            coherent: collapse.abs_diff(target) <= radius,
            probabilities,
        }
    }

    /// Column the field collapsed to.
    pub fn collapse(&self) -> usize {
        self.collapse
    }

    /// Mirrored column (`width - 1 - collapse`).
    pub fn mirror(&self) -> usize {
        self.mirror
    }

    /// Column the collapse was judged against.
    pub fn target(&self) -> usize {
        self.target
    }

    /// Whether the collapse landed close enough to the target.
    pub fn is_coherent(&self) -> bool {
        self.coherent
    }

    /// Snapshot of the vector at collapse time.
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Collapse(col {}, mirror {}, target {}, {})",
            self.collapse,
            self.mirror,
            self.target,
            if self.coherent { "coherent" } else { "decoherent" }
        )
    }
}

/// Measurements recorded while running a schedule, in execution order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationResult {
    measurements: Vec<Measurement>,
}

impl SimulationResult {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, measurement: Measurement) {
        self.measurements.push(measurement);
    }

    /// All measurements in order.
    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    /// The most recent measurement, if any.
    pub fn last(&self) -> Option<&Measurement> {
        self.measurements.last()
    }

    /// Collapse columns in order.
    pub fn collapses(&self) -> Vec<usize> {
        self.measurements.iter().map(Measurement::collapse).collect()
    }
}

impl fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simulation Results:")?;
        if self.measurements.is_empty() {
            writeln!(f, "  No measurements were taken.")?;
        } else {
            for (i, m) in self.measurements.iter().enumerate() {
                writeln!(f, "  #{}: {}", i, m)?;
            }
        }
        Ok(())
    }
}
