//! Non-blocking ADXL345 acquisition state machine.
//!
//! The engine is advanced one step per scheduler tick. Each step either runs
//! a bounded synchronous transaction on the injected [`AccelBus`] or returns
//! immediately while waiting for the FIFO watermark line. Bring-up validates
//! the device identity and runs the factory self-test before entering the
//! steady measuring state; any fatal condition latches [`AccelState::Failed`]
//! until external reinitialization.
//!
//! # State machine
//!
//! ```text
//! Startup -> Configuring -> MeasuringSelfTestOff -> WaitingForSelfTestEnabled
//!         -> MeasuringSelfTestOn -> Measuring (steady)
//! any fatal failure -> Failed (terminal)
//! ```

use micromath::F32Ext;

use super::registers::{self, DATA_REGISTER_COUNT, Register};
use crate::config::{
    ACQUISITION_TIMEOUT_MS,
    BATCH_AVERAGING_SHIFT,
    SAMPLES_PER_BATCH,
    SELF_TEST_SETTLE_MS,
};
use crate::error::{ErrorCode, Operation, Severity};
use crate::timing::CountdownTimer;

/// Radians to tenths of a degree.
const RADIANS_TO_DEG_TENTHS: f32 = 1800.0 / core::f32::consts::PI;

/// Measurement axes, in data-register order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

const AXIS_COUNT: usize = 3;

/// Self-test delta tolerance windows per axis, exclusive on both ends.
///
/// Calibrated for 13-bit resolution, +/-16 g range and a 3.3 V supply, per
/// the ADXL345 datasheet self-test tables. A delta at or beyond either bound
/// marks the device defective.
const SELF_TEST_WINDOWS: [(i32, i32); AXIS_COUNT] = [(85, 949), (-949, -85), (118, 1294)];

/// Ordered register configuration applied during bring-up.
///
/// The FIFO must be cleared via bypass before being re-armed (it blocks
/// otherwise) and the watermark interrupt is enabled last.
const INIT_SEQUENCE: [(Register, u8); 6] = [
    (Register::DataFormat, registers::DATA_FORMAT_DEFAULT),
    (Register::BandwidthRate, registers::POWER_NORMAL | registers::RATE_200HZ),
    (Register::FifoControl, registers::FIFO_BYPASS),
    (Register::FifoControl, registers::FIFO_CONTROL_STREAM),
    (Register::PowerControl, registers::MEASURE_MODE),
    (Register::InterruptEnable, registers::INT_WATERMARK),
];

/// Synchronous-serial transport to the accelerometer.
///
/// Implementations own the SPI peripheral, chip select and the INT1 input.
/// Every transfer must be bounded; a failed transfer reports
/// `(WriteRegister | ReadRegisters, 2, Warning)`. Burst reads must discard
/// the byte echoed for the opcode and keep at least 5 us between two
/// consecutive reads of the data block (FIFO retrieval requirement).
pub trait AccelBus {
    /// Write a single register.
    fn write_register(
        &mut self,
        register: Register,
        value: u8,
    ) -> Result<(), ErrorCode>;

    /// Burst-read `buffer.len()` consecutive registers starting at `first`.
    fn read_registers(
        &mut self,
        first: Register,
        buffer: &mut [u8],
    ) -> Result<(), ErrorCode>;

    /// Level of the FIFO-watermark interrupt line (true = data ready).
    fn data_ready(&self) -> bool;
}

/// Acquisition state machine states.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum AccelState {
    /// Waiting for a valid device identity.
    Startup,
    /// Writing the bring-up register sequence.
    Configuring,
    /// Measuring the self-test baseline (self-test force off).
    MeasuringSelfTestOff,
    /// Letting the self-test force settle.
    WaitingForSelfTestEnabled,
    /// Measuring with the self-test force on and validating the deltas.
    MeasuringSelfTestOn,
    /// Steady acquisition; never left.
    Measuring,
    /// Terminal: acquisition permanently unavailable.
    Failed,
}

/// ADXL345 acquisition engine.
pub struct AccelEngine<B: AccelBus> {
    bus: B,
    state: AccelState,
    timer: CountdownTimer,
    latest: [i32; AXIS_COUNT],
    previous: [i32; AXIS_COUNT],
    zero: [i32; AXIS_COUNT],
    updated: bool,
}

impl<B: AccelBus> AccelEngine<B> {
    /// Create an engine owning its transport, ready to start bring-up.
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            state: AccelState::Startup,
            timer: CountdownTimer::armed(ACQUISITION_TIMEOUT_MS),
            latest: [0; AXIS_COUNT],
            previous: [0; AXIS_COUNT],
            zero: [0; AXIS_COUNT],
            updated: false,
        }
    }

    /// Current state machine node.
    #[must_use]
    pub const fn state(&self) -> AccelState { self.state }

    /// Advance the state machine by one tick.
    ///
    /// `elapsed_ms` is the time since the previous step; it feeds the
    /// acquisition timeout. Never blocks beyond one bounded bus transaction.
    pub fn step(
        &mut self,
        elapsed_ms: u32,
    ) -> Result<(), ErrorCode> {
        self.timer.tick(elapsed_ms);

        match self.state {
            AccelState::Startup => self.step_startup(),
            AccelState::Configuring => self.step_configuring(),
            AccelState::MeasuringSelfTestOff => self.step_self_test_baseline(),
            AccelState::WaitingForSelfTestEnabled => self.step_self_test_settle(),
            AccelState::MeasuringSelfTestOn => self.step_self_test_measure(),
            AccelState::Measuring => self.step_measuring(),
            AccelState::Failed => Ok(()),
        }
    }

    /// Whether the latest integrated value for `axis` differs from the one
    /// previously reported. Consumes the change.
    pub fn has_changed(
        &mut self,
        axis: Axis,
    ) -> bool {
        let i = axis as usize;
        let changed = self.latest[i] != self.previous[i];
        self.previous[i] = self.latest[i];
        changed
    }

    /// Whether a new integrated measurement arrived since the last call.
    /// Clears the flag.
    pub fn has_new_measurements(&mut self) -> bool {
        core::mem::take(&mut self.updated)
    }

    /// Angle between `axis` and the Z axis, in tenths of a degree.
    ///
    /// Zero-offset compensated for X and Y; Z is the gravity reference and is
    /// never offset. A zero Z reading reports 0 (the angle is undefined).
    #[must_use]
    pub fn angle_tenths(
        &self,
        axis: Axis,
    ) -> i16 {
        let z = self.latest[Axis::Z as usize];
        if z == 0 {
            return 0;
        }

        let i = axis as usize;
        let ratio = (self.latest[i] + self.zero[i]) as f32 / z as f32;
        (ratio.atan() * RADIANS_TO_DEG_TENTHS) as i16
    }

    /// Zero the current X/Y tilt as the measurement reference.
    pub fn zero_current_position(&mut self) {
        self.zero[Axis::X as usize] = -self.latest[Axis::X as usize];
        self.zero[Axis::Y as usize] = -self.latest[Axis::Y as usize];
    }

    /// Drop any zeroing compensation and report absolute angles again.
    pub fn restore_absolute_reference(&mut self) {
        self.zero = [0; AXIS_COUNT];
    }

    fn fail(
        &mut self,
        error: ErrorCode,
    ) -> Result<(), ErrorCode> {
        self.state = AccelState::Failed;
        Err(error)
    }

    /// Read one FIFO batch and average it into a per-axis sample.
    ///
    /// Each sample is one burst read of the six data registers; axis values
    /// are little-endian two's-complement pairs. The accumulators are divided
    /// by an arithmetic right shift, exact because the batch size is a power
    /// of two.
    fn integrate_fifo(&mut self) -> Result<[i32; AXIS_COUNT], ErrorCode> {
        let mut sums = [0i32; AXIS_COUNT];
        let mut block = [0u8; DATA_REGISTER_COUNT];

        for _ in 0..SAMPLES_PER_BATCH {
            self.bus
                .read_registers(Register::DataX0, &mut block)
                .map_err(|e| e.push(Operation::Integrate, 1))?;

            for (axis, sum) in sums.iter_mut().enumerate() {
                let pair = [block[axis * 2], block[axis * 2 + 1]];
                *sum += i32::from(i16::from_le_bytes(pair));
            }
        }

        for sum in &mut sums {
            *sum >>= BATCH_AVERAGING_SHIFT;
        }

        Ok(sums)
    }

    /// Poll the device identity until it matches or the startup window ends.
    fn step_startup(&mut self) -> Result<(), ErrorCode> {
        if self.timer.expired() {
            return self.fail(ErrorCode::new(Operation::Startup, 1, Severity::Critical));
        }

        let mut id = [0u8; 1];
        if let Err(e) = self.bus.read_registers(Register::DeviceId, &mut id) {
            return self.fail(e.push(Operation::Startup, 2));
        }

        if id[0] != registers::DEVICE_ID {
            // Not answering yet; retry next tick until the window closes
            return Ok(());
        }

        self.state = AccelState::Configuring;
        Ok(())
    }

    /// Write the ordered bring-up sequence.
    fn step_configuring(&mut self) -> Result<(), ErrorCode> {
        for (register, value) in INIT_SEQUENCE {
            if let Err(e) = self.bus.write_register(register, value) {
                return self.fail(e.push(Operation::Configure, 1));
            }
        }

        self.timer.arm(ACQUISITION_TIMEOUT_MS);
        self.state = AccelState::MeasuringSelfTestOff;
        Ok(())
    }

    /// Integrate the self-test baseline, then switch the self-test force on.
    fn step_self_test_baseline(&mut self) -> Result<(), ErrorCode> {
        if self.timer.expired() {
            return self.fail(ErrorCode::new(
                Operation::SelfTestBaseline,
                1,
                Severity::Error,
            ));
        }

        if !self.bus.data_ready() {
            return Ok(());
        }

        match self.integrate_fifo() {
            Ok(sample) => self.latest = sample,
            Err(e) => return self.fail(e.push(Operation::SelfTestBaseline, 2)),
        }

        if let Err(e) = self.bus.write_register(
            Register::DataFormat,
            registers::DATA_FORMAT_DEFAULT | registers::SELF_TEST,
        ) {
            return self.fail(e.push(Operation::SelfTestBaseline, 3));
        }

        // Clear the FIFO so only forced samples are averaged next
        if let Err(e) = self
            .bus
            .write_register(Register::FifoControl, registers::FIFO_BYPASS)
        {
            return self.fail(e.push(Operation::SelfTestBaseline, 4));
        }

        self.timer.arm(SELF_TEST_SETTLE_MS);
        self.state = AccelState::WaitingForSelfTestEnabled;
        Ok(())
    }

    /// Wait out the electrical settle delay, then re-arm streaming.
    fn step_self_test_settle(&mut self) -> Result<(), ErrorCode> {
        if !self.timer.expired() {
            return Ok(());
        }

        if let Err(e) = self
            .bus
            .write_register(Register::FifoControl, registers::FIFO_CONTROL_STREAM)
        {
            return self.fail(e.push(Operation::SelfTestSettle, 1));
        }

        self.timer.arm(ACQUISITION_TIMEOUT_MS);
        self.state = AccelState::MeasuringSelfTestOn;
        Ok(())
    }

    /// Integrate the forced sample and validate the per-axis deltas.
    fn step_self_test_measure(&mut self) -> Result<(), ErrorCode> {
        if self.timer.expired() {
            return self.fail(ErrorCode::new(
                Operation::SelfTestMeasure,
                1,
                Severity::Error,
            ));
        }

        if !self.bus.data_ready() {
            return Ok(());
        }

        let forced = match self.integrate_fifo() {
            Ok(sample) => sample,
            Err(e) => return self.fail(e.push(Operation::SelfTestMeasure, 2)),
        };

        for axis in 0..AXIS_COUNT {
            let delta = forced[axis] - self.latest[axis];
            let (min, max) = SELF_TEST_WINDOWS[axis];
            if delta <= min || delta >= max {
                // Out of tolerance: the device is considered defective
                return self.fail(ErrorCode::new(
                    Operation::SelfTestMeasure,
                    3,
                    Severity::Critical,
                ));
            }
        }

        if let Err(e) = self
            .bus
            .write_register(Register::DataFormat, registers::DATA_FORMAT_DEFAULT)
        {
            return self.fail(e.push(Operation::SelfTestMeasure, 4));
        }

        self.timer.arm(ACQUISITION_TIMEOUT_MS);
        self.state = AccelState::Measuring;
        Ok(())
    }

    /// Steady state: integrate a batch whenever the watermark fires.
    fn step_measuring(&mut self) -> Result<(), ErrorCode> {
        if self.timer.expired() {
            return self.fail(ErrorCode::new(Operation::Measure, 1, Severity::Error));
        }

        if !self.bus.data_ready() {
            return Ok(());
        }

        self.timer.arm(ACQUISITION_TIMEOUT_MS);

        match self.integrate_fifo() {
            Ok(sample) => self.latest = sample,
            Err(e) => return self.fail(e.push(Operation::Measure, 2)),
        }

        self.updated = true;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Scripted bus: serves a device ID, per-mode samples and failure
    /// injection, and records every register write.
    struct ScriptBus {
        device_id: u8,
        ready: bool,
        /// Sample served while the self-test force is off.
        normal: [i16; 3],
        /// Added on top of `normal` while the self-test force is on.
        forced_delta: [i16; 3],
        self_test_enabled: bool,
        writes: Vec<(Register, u8)>,
        fail_reads: bool,
        fail_writes: bool,
    }

    impl ScriptBus {
        fn new() -> Self {
            Self {
                device_id: registers::DEVICE_ID,
                ready: true,
                normal: [0, 0, 0],
                forced_delta: [500, -500, 700],
                self_test_enabled: false,
                writes: Vec::new(),
                fail_reads: false,
                fail_writes: false,
            }
        }
    }

    impl AccelBus for ScriptBus {
        fn write_register(
            &mut self,
            register: Register,
            value: u8,
        ) -> Result<(), ErrorCode> {
            if self.fail_writes {
                return Err(ErrorCode::new(
                    Operation::WriteRegister,
                    2,
                    Severity::Warning,
                ));
            }
            if register == Register::DataFormat {
                self.self_test_enabled = value & registers::SELF_TEST != 0;
            }
            self.writes.push((register, value));
            Ok(())
        }

        fn read_registers(
            &mut self,
            first: Register,
            buffer: &mut [u8],
        ) -> Result<(), ErrorCode> {
            if self.fail_reads {
                return Err(ErrorCode::new(
                    Operation::ReadRegisters,
                    2,
                    Severity::Warning,
                ));
            }
            match first {
                Register::DeviceId => buffer[0] = self.device_id,
                Register::DataX0 => {
                    for axis in 0..3 {
                        let mut value = self.normal[axis];
                        if self.self_test_enabled {
                            value += self.forced_delta[axis];
                        }
                        let bytes = value.to_le_bytes();
                        buffer[axis * 2] = bytes[0];
                        buffer[axis * 2 + 1] = bytes[1];
                    }
                }
                _ => {}
            }
            Ok(())
        }

        fn data_ready(&self) -> bool { self.ready }
    }

    /// Step with 1 ms ticks until the engine reaches `target` or `limit`
    /// ticks passed. Returns the tick count.
    fn run_until(
        engine: &mut AccelEngine<ScriptBus>,
        target: AccelState,
        limit: u32,
    ) -> u32 {
        for tick in 0..limit {
            if engine.state() == target {
                return tick;
            }
            let _ = engine.step(1);
        }
        limit
    }

    fn engine_in_measuring(bus: ScriptBus) -> AccelEngine<ScriptBus> {
        let mut engine = AccelEngine::new(bus);
        let ticks = run_until(&mut engine, AccelState::Measuring, 200);
        assert!(ticks < 200, "engine never reached Measuring");
        engine
    }

    // --- two's complement reassembly ---

    #[test]
    fn test_twos_complement_round_trip() {
        for value in i16::MIN..=i16::MAX {
            let bytes = value.to_le_bytes();
            assert_eq!(i16::from_le_bytes(bytes), value);
        }
    }

    // --- FIFO averaging ---

    #[test]
    fn test_averaging_constant_batch_is_exact() {
        let mut bus = ScriptBus::new();
        bus.normal = [123, -77, 1042];
        let mut engine = engine_in_measuring(bus);

        let _ = engine.step(1);
        assert_eq!(engine.latest, [123, -77, 1042]);
    }

    #[test]
    fn test_averaging_divides_negatives_exactly() {
        let mut bus = ScriptBus::new();
        bus.normal = [-32, -320, -4];
        let mut engine = engine_in_measuring(bus);

        let _ = engine.step(1);
        // Arithmetic shift divides negative multiples of the batch exactly
        assert_eq!(engine.latest, [-32, -320, -4]);
    }

    // --- angle derivation ---

    #[test]
    fn test_angle_zero_z_reports_zero() {
        let mut bus = ScriptBus::new();
        bus.normal = [1000, 500, 0];
        let mut engine = engine_in_measuring(bus);
        let _ = engine.step(1);

        assert_eq!(engine.angle_tenths(Axis::X), 0);
        assert_eq!(engine.angle_tenths(Axis::Y), 0);
    }

    #[test]
    fn test_angle_flat_reports_zero() {
        let mut bus = ScriptBus::new();
        bus.normal = [0, 0, 900];
        let mut engine = engine_in_measuring(bus);
        let _ = engine.step(1);

        assert_eq!(engine.angle_tenths(Axis::X), 0);
        assert_eq!(engine.angle_tenths(Axis::Y), 0);
    }

    #[test]
    fn test_angle_45_degrees() {
        let mut bus = ScriptBus::new();
        bus.normal = [1000, 0, 1000];
        let mut engine = engine_in_measuring(bus);
        let _ = engine.step(1);

        let angle = engine.angle_tenths(Axis::X);
        // atan approximation: allow a few tenths around 45.0 degrees
        assert!((angle - 450).abs() <= 3, "angle was {angle}");
        assert_eq!(engine.angle_tenths(Axis::Y), 0);
    }

    #[test]
    fn test_zeroing_and_restore() {
        let mut bus = ScriptBus::new();
        bus.normal = [1000, 0, 1000];
        let mut engine = engine_in_measuring(bus);
        let _ = engine.step(1);

        engine.zero_current_position();
        assert_eq!(engine.angle_tenths(Axis::X), 0);

        engine.restore_absolute_reference();
        let angle = engine.angle_tenths(Axis::X);
        assert!((angle - 450).abs() <= 3);
    }

    // --- self-test validation ---

    fn self_test_outcome(deltas: [i16; 3]) -> AccelState {
        let mut bus = ScriptBus::new();
        bus.normal = [0, 0, 0];
        bus.forced_delta = deltas;
        let mut engine = AccelEngine::new(bus);
        for _ in 0..200 {
            let _ = engine.step(1);
            if matches!(engine.state(), AccelState::Measuring | AccelState::Failed) {
                break;
            }
        }
        engine.state()
    }

    #[test]
    fn test_self_test_inside_windows_passes() {
        assert_eq!(self_test_outcome([500, -500, 700]), AccelState::Measuring);
        // Just inside every bound
        assert_eq!(self_test_outcome([86, -86, 119]), AccelState::Measuring);
        assert_eq!(self_test_outcome([948, -948, 1293]), AccelState::Measuring);
    }

    #[test]
    fn test_self_test_at_bounds_fails() {
        // Exactly at the lower bound of one axis
        assert_eq!(self_test_outcome([85, -500, 700]), AccelState::Failed);
        // Exactly at the upper bound
        assert_eq!(self_test_outcome([949, -500, 700]), AccelState::Failed);
        assert_eq!(self_test_outcome([500, -85, 700]), AccelState::Failed);
        assert_eq!(self_test_outcome([500, -949, 700]), AccelState::Failed);
        assert_eq!(self_test_outcome([500, -500, 118]), AccelState::Failed);
        assert_eq!(self_test_outcome([500, -500, 1294]), AccelState::Failed);
    }

    #[test]
    fn test_self_test_failure_is_critical() {
        let mut bus = ScriptBus::new();
        bus.forced_delta = [0, 0, 0];
        let mut engine = AccelEngine::new(bus);

        let mut last_error = None;
        for _ in 0..200 {
            if let Err(e) = engine.step(1) {
                last_error = Some(e);
            }
            if engine.state() == AccelState::Failed {
                break;
            }
        }

        let error = last_error.expect("self-test failure should surface an error");
        assert_eq!(error.origin().operation, Operation::SelfTestMeasure);
        assert_eq!(error.origin().code, 3);
        assert_eq!(error.severity(), Severity::Critical);
    }

    // --- state machine reachability ---

    #[test]
    fn test_wrong_device_id_holds_startup_then_fails_at_timeout() {
        let mut bus = ScriptBus::new();
        bus.device_id = 0x00;
        let mut engine = AccelEngine::new(bus);

        // 999 ticks of mismatching identity: still in Startup, no error
        for _ in 0..999 {
            assert!(engine.step(1).is_ok());
            assert_eq!(engine.state(), AccelState::Startup);
        }

        // The 1000th tick exhausts the window
        let error = engine.step(1).unwrap_err();
        assert_eq!(engine.state(), AccelState::Failed);
        assert_eq!(error.origin().operation, Operation::Startup);
        assert_eq!(error.origin().code, 1);
        assert_eq!(error.severity(), Severity::Critical);
    }

    #[test]
    fn test_failed_state_is_terminal() {
        let mut bus = ScriptBus::new();
        bus.device_id = 0x00;
        let mut engine = AccelEngine::new(bus);
        for _ in 0..1000 {
            let _ = engine.step(1);
        }
        assert_eq!(engine.state(), AccelState::Failed);

        for _ in 0..100 {
            assert!(engine.step(1).is_ok());
            assert_eq!(engine.state(), AccelState::Failed);
        }
    }

    #[test]
    fn test_happy_path_visits_every_state_in_order() {
        let mut engine = AccelEngine::new(ScriptBus::new());

        let mut visited = vec![engine.state()];
        for _ in 0..200 {
            let _ = engine.step(1);
            if *visited.last().unwrap() != engine.state() {
                visited.push(engine.state());
            }
            if engine.state() == AccelState::Measuring {
                break;
            }
        }

        assert_eq!(
            visited,
            vec![
                AccelState::Startup,
                AccelState::Configuring,
                AccelState::MeasuringSelfTestOff,
                AccelState::WaitingForSelfTestEnabled,
                AccelState::MeasuringSelfTestOn,
                AccelState::Measuring,
            ]
        );
    }

    #[test]
    fn test_settle_delay_is_waited_out() {
        let mut engine = AccelEngine::new(ScriptBus::new());
        run_until(&mut engine, AccelState::WaitingForSelfTestEnabled, 100);
        assert_eq!(engine.state(), AccelState::WaitingForSelfTestEnabled);

        // The settle wait consumes the full 25 ms before moving on
        for _ in 0..SELF_TEST_SETTLE_MS - 1 {
            let _ = engine.step(1);
            assert_eq!(engine.state(), AccelState::WaitingForSelfTestEnabled);
        }
        let _ = engine.step(1);
        assert_eq!(engine.state(), AccelState::MeasuringSelfTestOn);
    }

    #[test]
    fn test_configuration_writes_in_order() {
        let mut engine = AccelEngine::new(ScriptBus::new());
        run_until(&mut engine, AccelState::MeasuringSelfTestOff, 100);

        let writes = &engine.bus.writes;
        assert_eq!(writes.len(), INIT_SEQUENCE.len());
        for (written, expected) in writes.iter().zip(INIT_SEQUENCE) {
            assert_eq!(*written, expected);
        }
    }

    #[test]
    fn test_id_read_failure_is_fatal() {
        let mut bus = ScriptBus::new();
        bus.fail_reads = true;
        let mut engine = AccelEngine::new(bus);

        let error = engine.step(1).unwrap_err();
        assert_eq!(engine.state(), AccelState::Failed);
        assert_eq!(error.origin().operation, Operation::ReadRegisters);
        let chain: Vec<_> = error.layers().collect();
        assert_eq!(chain[1].operation, Operation::Startup);
        assert_eq!(chain[1].code, 2);
    }

    #[test]
    fn test_transport_failure_during_batch_aborts_step() {
        let mut engine = engine_in_measuring(ScriptBus::new());
        engine.bus.fail_reads = true;

        let error = engine.step(1).unwrap_err();
        assert_eq!(engine.state(), AccelState::Failed);
        let chain: Vec<_> = error.layers().collect();
        assert_eq!(chain[0].operation, Operation::ReadRegisters);
        assert_eq!(chain[1].operation, Operation::Integrate);
        assert_eq!(chain[2].operation, Operation::Measure);
    }

    #[test]
    fn test_write_failure_during_configuring_is_fatal() {
        let mut bus = ScriptBus::new();
        bus.fail_writes = true;
        let mut engine = AccelEngine::new(bus);

        // First step matches the identity, second configures
        assert!(engine.step(1).is_ok());
        let error = engine.step(1).unwrap_err();
        assert_eq!(engine.state(), AccelState::Failed);
        assert_eq!(error.origin().operation, Operation::WriteRegister);
    }

    #[test]
    fn test_watermark_timeout_while_measuring() {
        let mut engine = engine_in_measuring(ScriptBus::new());
        engine.bus.ready = false;

        let mut result = Ok(());
        for _ in 0..=ACQUISITION_TIMEOUT_MS {
            result = engine.step(1);
            if result.is_err() {
                break;
            }
        }

        let error = result.unwrap_err();
        assert_eq!(engine.state(), AccelState::Failed);
        assert_eq!(error.origin().operation, Operation::Measure);
        assert_eq!(error.origin().code, 1);
    }

    // --- consumer-facing flags ---

    #[test]
    fn test_has_new_measurements_clears_flag() {
        let mut engine = engine_in_measuring(ScriptBus::new());
        let _ = engine.step(1);

        assert!(engine.has_new_measurements());
        assert!(!engine.has_new_measurements());
    }

    #[test]
    fn test_has_changed_consumes_the_change() {
        let mut bus = ScriptBus::new();
        bus.normal = [250, 0, 1000];
        let mut engine = engine_in_measuring(bus);
        let _ = engine.step(1);

        assert!(engine.has_changed(Axis::X));
        assert!(!engine.has_changed(Axis::X));

        // A new batch with the same values is not a change
        let _ = engine.step(1);
        assert!(!engine.has_changed(Axis::X));

        engine.bus.normal = [300, 0, 1000];
        let _ = engine.step(1);
        assert!(engine.has_changed(Axis::X));
    }
}
