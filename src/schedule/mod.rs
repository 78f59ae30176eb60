// src/schedule/mod.rs

//! Ordered sequences of field operations.
//!
//! A [`Schedule`] is a recorded turn or puzzle script: the operations run
//! strictly in order against one engine by the [`Simulator`](crate::Simulator).

use crate::operations::Operation;
use std::collections::BTreeSet;
use std::fmt;

/// An ordered list of operations plus the set of columns they name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    columns: BTreeSet<usize>,
    operations: Vec<Operation>,
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one operation and records the columns it names.
    pub fn add_operation(&mut self, op: Operation) {
        self.columns.extend(op.involved_columns());
        self.operations.push(op);
    }

    /// Appends every operation from `ops`.
    pub fn add_operations<I>(&mut self, ops: I)
    where
        I: IntoIterator<Item = Operation>,
    {
        for op in ops {
            self.add_operation(op);
        }
    }

    /// Columns named by any operation, ascending.
    pub fn columns(&self) -> &BTreeSet<usize> {
        &self.columns
    }

    /// Operations in execution order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// `true` if the schedule has no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Number of `Measure` steps, i.e. the number of measurements a run records.
    pub fn measurement_count(&self) -> usize {
        self.operations.iter().filter(|op| matches!(op, Operation::Measure { .. })).count()
    }
}

/// Chained construction of a [`Schedule`].
#[derive(Debug, Default)]
pub struct ScheduleBuilder {
    schedule: Schedule,
}

impl ScheduleBuilder {
    /// Starts an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one operation.
    pub fn add_op(mut self, op: Operation) -> Self {
        self.schedule.add_operation(op);
        self
    }

    /// Appends several operations.
    pub fn add_ops<I>(mut self, ops: I) -> Self
    where
        I: IntoIterator<Item = Operation>,
    {
        self.schedule.add_operations(ops);
        self
    }

    /// Returns the finished schedule.
    pub fn build(self) -> Schedule {
        self.schedule
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "qfield::Schedule[{} operations on {} columns]", self.operations.len(), self.columns.len())?;
        for (step, op) in self.operations.iter().enumerate() {
            let cols = op.involved_columns();
            if cols.is_empty() {
                writeln!(f, "  {:>3}: {:<3} (all)", step, op.symbol())?;
            } else {
                let listed: Vec<String> = cols.iter().map(|c| c.to_string()).collect();
                writeln!(f, "  {:>3}: {:<3} col {}", step, op.symbol(), listed.join(" -> "))?;
            }
        }
        Ok(())
    }
}
