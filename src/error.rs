//! Accumulating error codes shared by both device engines.
//!
//! Every fallible step returns an [`ErrorCode`] identifying the operation
//! that first failed, a sub-code distinguishing the failure site inside that
//! operation, and a severity. Each call boundary the failure crosses can
//! annotate it with its own layer via [`ErrorCode::push`] without losing the
//! original cause.

/// Severity attached to an error when it is first created.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum Severity {
    /// Informational only.
    Info,
    /// Local, recoverable failure (validation, transport timeout).
    Warning,
    /// Operation failed; owning machine aborts the current attempt.
    Error,
    /// Device considered unusable (bad identity, failed factory self-test).
    Critical,
}

/// Operations that can originate or annotate an error.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum Operation {
    // Accelerometer engine
    Startup,
    Configure,
    SelfTestBaseline,
    SelfTestSettle,
    SelfTestMeasure,
    Measure,
    Integrate,
    WriteRegister,
    ReadRegisters,
    // Display engine
    DisplayInit,
    SendCommand,
    SendData,
    WaitTransfer,
    PrintAngle,
}

/// One (operation, sub-code) annotation in the chain.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub struct Layer {
    pub operation: Operation,
    pub code: u8,
}

/// Maximum number of context layers an error can accumulate.
pub const MAX_LAYERS: usize = 4;

/// An error annotated with the chain of operations it crossed.
///
/// `layers[0]` is always the originating failure; later entries are outer
/// context added on the way up. Once full, further pushes overwrite the
/// outermost layer so the origin is never lost.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub struct ErrorCode {
    severity: Severity,
    layers: [Option<Layer>; MAX_LAYERS],
}

impl ErrorCode {
    /// Create a fresh error originating in `operation`.
    #[must_use]
    pub const fn new(
        operation: Operation,
        code: u8,
        severity: Severity,
    ) -> Self {
        let mut layers = [None; MAX_LAYERS];
        layers[0] = Some(Layer { operation, code });
        Self { severity, layers }
    }

    /// Annotate the error with an outer context layer, keeping the origin
    /// and severity intact.
    #[must_use]
    pub fn push(
        mut self,
        operation: Operation,
        code: u8,
    ) -> Self {
        let layer = Layer { operation, code };
        for slot in &mut self.layers {
            if slot.is_none() {
                *slot = Some(layer);
                return self;
            }
        }
        // Chain full: replace the outermost context, the origin stays put.
        self.layers[MAX_LAYERS - 1] = Some(layer);
        self
    }

    /// The originating failure.
    #[must_use]
    pub fn origin(&self) -> Layer {
        // layers[0] is set by every constructor path
        self.layers[0].unwrap_or(Layer {
            operation: Operation::Startup,
            code: 0,
        })
    }

    /// Severity assigned when the error was created.
    #[must_use]
    pub const fn severity(&self) -> Severity { self.severity }

    /// All layers, origin first.
    pub fn layers(&self) -> impl Iterator<Item = Layer> + '_ {
        self.layers.iter().filter_map(|l| *l)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
