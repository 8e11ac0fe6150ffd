//! Recording stubs for the platform seams
//!
//! Every trait the bridge talks to hardware through has a stub here that
//! records what was asked of it, so tests can check which ports, mappings,
//! config registers and firmware methods an endpoint touched.

use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet};

use spin::Mutex;

use crate::acpi::{AcpiHandle, AcpiNamespace, AcpiObject, AcpiStatus, WalkControl};
use crate::arch::x86_64::PortIo;
use crate::bridge::endpoint::EndpointId;
use crate::bridge::lifecycle::EndpointRegistry;
use crate::config::{EC_COMMAND_PORT, EC_DATA_PORT};
use crate::drivers::ec::{EcError, EmbeddedController};
use crate::drivers::mmio::{MmioRegion, PhysMapper};
use crate::drivers::pci::access::PciAccess;
use crate::drivers::pci::{PciAddress, PciBus};

// ============================================================================
// Port I/O
// ============================================================================

/// One port access seen by [`RecordingPorts`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortOp {
    InB(u16),
    InW(u16),
    OutB(u16, u8),
    OutW(u16, u16),
}

#[derive(Default)]
struct PortState {
    bytes: BTreeMap<u16, u8>,
    words: BTreeMap<u16, u16>,
    echo: BTreeSet<u16>,
    ops: Vec<PortOp>,
}

/// Port backend that logs every access
///
/// Reads return the value set with [`RecordingPorts::set_input`], or float
/// high like an unpopulated port. Ports marked with
/// [`RecordingPorts::set_echo`] read back the last byte written.
pub struct RecordingPorts {
    state: Mutex<PortState>,
}

impl RecordingPorts {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(PortState::default()),
        }
    }

    pub fn set_input(&self, port: u16, value: u8) {
        self.state.lock().bytes.insert(port, value);
    }

    pub fn set_input_word(&self, port: u16, value: u16) {
        self.state.lock().words.insert(port, value);
    }

    pub fn set_echo(&self, port: u16) {
        self.state.lock().echo.insert(port);
    }

    pub fn ops(&self) -> Vec<PortOp> {
        self.state.lock().ops.clone()
    }

    pub fn clear_ops(&self) {
        self.state.lock().ops.clear();
    }
}

impl PortIo for RecordingPorts {
    fn inb(&self, port: u16) -> u8 {
        let mut state = self.state.lock();
        state.ops.push(PortOp::InB(port));
        state.bytes.get(&port).copied().unwrap_or(0xFF)
    }

    fn inw(&self, port: u16) -> u16 {
        let mut state = self.state.lock();
        state.ops.push(PortOp::InW(port));
        state.words.get(&port).copied().unwrap_or(0xFFFF)
    }

    fn outb(&self, port: u16, value: u8) {
        let mut state = self.state.lock();
        state.ops.push(PortOp::OutB(port, value));
        if state.echo.contains(&port) {
            state.bytes.insert(port, value);
        }
    }

    fn outw(&self, port: u16, value: u16) {
        self.state.lock().ops.push(PortOp::OutW(port, value));
    }
}

#[derive(Clone, Copy)]
enum EcPhase {
    Idle,
    ReadAddress,
    WriteAddress,
    WriteValue(u8),
}

struct EcState {
    registers: [u8; 256],
    phase: EcPhase,
    output: Option<u8>,
}

/// Port backend speaking the ACPI EC protocol on 0x62/0x66
///
/// The input buffer is consumed instantly, so IBF never reads as set.
pub struct EcPortEmulator {
    state: Mutex<EcState>,
}

impl EcPortEmulator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(EcState {
                registers: [0; 256],
                phase: EcPhase::Idle,
                output: None,
            }),
        }
    }

    pub fn set_register(&self, offset: u8, value: u8) {
        self.state.lock().registers[offset as usize] = value;
    }

    pub fn register(&self, offset: u8) -> u8 {
        self.state.lock().registers[offset as usize]
    }
}

impl PortIo for EcPortEmulator {
    fn inb(&self, port: u16) -> u8 {
        let mut state = self.state.lock();
        match port {
            EC_COMMAND_PORT => u8::from(state.output.is_some()),
            EC_DATA_PORT => state.output.take().unwrap_or(0),
            _ => 0xFF,
        }
    }

    fn inw(&self, _port: u16) -> u16 {
        0xFFFF
    }

    fn outb(&self, port: u16, value: u8) {
        let mut state = self.state.lock();
        match (port, state.phase) {
            (EC_COMMAND_PORT, _) => {
                state.phase = match value {
                    0x80 => EcPhase::ReadAddress,
                    0x81 => EcPhase::WriteAddress,
                    _ => EcPhase::Idle,
                };
            }
            (EC_DATA_PORT, EcPhase::ReadAddress) => {
                state.output = Some(state.registers[value as usize]);
                state.phase = EcPhase::Idle;
            }
            (EC_DATA_PORT, EcPhase::WriteAddress) => {
                state.phase = EcPhase::WriteValue(value);
            }
            (EC_DATA_PORT, EcPhase::WriteValue(offset)) => {
                state.registers[offset as usize] = value;
                state.phase = EcPhase::Idle;
            }
            _ => {}
        }
    }

    fn outw(&self, _port: u16, _value: u16) {}
}

// ============================================================================
// Memory
// ============================================================================

const BUFFER_WORDS: usize = 16;

/// Mapper backed by a small heap buffer standing in for physical memory
///
/// Only `[base, base + 64)` can be mapped; anything else fails.
pub struct BufferMapper {
    base: u64,
    words: Box<[Cell<u32>; BUFFER_WORDS]>,
    live: Cell<usize>,
    maps: Cell<usize>,
}

impl BufferMapper {
    pub fn new(base: u64) -> Self {
        Self {
            base,
            words: Box::new(core::array::from_fn(|_| Cell::new(0))),
            live: Cell::new(0),
            maps: Cell::new(0),
        }
    }

    /// Mappings handed out and not yet released
    pub fn live_mappings(&self) -> usize {
        self.live.get()
    }

    /// Total number of successful maps
    pub fn map_count(&self) -> usize {
        self.maps.get()
    }

    pub fn word(&self, index: usize) -> u32 {
        self.words[index].get()
    }

    pub fn set_word(&self, index: usize, value: u32) {
        self.words[index].set(value);
    }
}

impl PhysMapper for BufferMapper {
    fn map(&self, phys: u64, size: usize) -> Option<MmioRegion> {
        let limit = self.base + (BUFFER_WORDS * 4) as u64;
        if phys < self.base || phys + size as u64 > limit {
            return None;
        }
        let virt = self.words.as_ptr() as u64 + (phys - self.base);
        let region = unsafe { MmioRegion::new(virt, size) }?;
        self.live.set(self.live.get() + 1);
        self.maps.set(self.maps.get() + 1);
        Some(region)
    }

    fn unmap(&self, _region: MmioRegion) {
        self.live.set(self.live.get() - 1);
    }
}

// ============================================================================
// PCI
// ============================================================================

type ConfigKey = (u8, u8, u8, u8);

fn config_key(addr: PciAddress, offset: u8) -> ConfigKey {
    (addr.bus, addr.device, addr.function, offset & 0xFC)
}

/// Configuration access method over a sparse register map
pub struct FakeConfigAccess {
    registers: Mutex<BTreeMap<ConfigKey, u32>>,
}

impl FakeConfigAccess {
    pub fn new() -> Self {
        Self {
            registers: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn add_function(&self, addr: PciAddress, vendor_id: u16, device_id: u16, multi_fn: bool) {
        let mut registers = self.registers.lock();
        registers.insert(
            config_key(addr, 0x00),
            ((device_id as u32) << 16) | vendor_id as u32,
        );
        let header = if multi_fn { 0x0080_0000 } else { 0 };
        registers.insert(config_key(addr, 0x0C), header);
    }
}

impl PciAccess for FakeConfigAccess {
    fn read32(&self, addr: PciAddress, offset: u8) -> u32 {
        let registers = self.registers.lock();
        if !registers.contains_key(&config_key(addr, 0x00)) {
            return 0xFFFF_FFFF;
        }
        registers
            .get(&config_key(addr, offset))
            .copied()
            .unwrap_or(0)
    }

    fn write32(&self, addr: PciAddress, offset: u8, value: u32) {
        self.registers.lock().insert(config_key(addr, offset), value);
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// PCI bus with a fixed device table and a write log
pub struct FakePciBus {
    devices: Mutex<Vec<(u16, u16, PciAddress)>>,
    config: Mutex<BTreeMap<ConfigKey, u32>>,
    reads: Mutex<Vec<(PciAddress, u8)>>,
    writes: Mutex<Vec<(PciAddress, u8, u32)>>,
}

impl FakePciBus {
    pub fn new() -> Self {
        Self {
            devices: Mutex::new(Vec::new()),
            config: Mutex::new(BTreeMap::new()),
            reads: Mutex::new(Vec::new()),
            writes: Mutex::new(Vec::new()),
        }
    }

    pub fn add_device(&self, vendor_id: u16, device_id: u16, addr: PciAddress) {
        self.devices.lock().push((vendor_id, device_id, addr));
    }

    pub fn set_config(&self, addr: PciAddress, offset: u8, value: u32) {
        self.config.lock().insert(config_key(addr, offset), value);
    }

    pub fn reads(&self) -> Vec<(PciAddress, u8)> {
        self.reads.lock().clone()
    }

    pub fn writes(&self) -> Vec<(PciAddress, u8, u32)> {
        self.writes.lock().clone()
    }
}

impl PciBus for FakePciBus {
    fn find_device(&self, vendor_id: u16, device_id: u16) -> Option<PciAddress> {
        self.devices
            .lock()
            .iter()
            .find(|(v, d, _)| (*v, *d) == (vendor_id, device_id))
            .map(|(_, _, addr)| *addr)
    }

    fn read_config_u32(&self, addr: PciAddress, offset: u8) -> u32 {
        self.reads.lock().push((addr, offset));
        self.config
            .lock()
            .get(&config_key(addr, offset))
            .copied()
            .unwrap_or(0)
    }

    fn write_config_u32(&self, addr: PciAddress, offset: u8, value: u32) {
        self.writes.lock().push((addr, offset, value));
        self.config.lock().insert(config_key(addr, offset), value);
    }
}

// ============================================================================
// Embedded controller
// ============================================================================

/// Register-file EC that can be told to fail every transfer
pub struct FakeEc {
    registers: Mutex<[u8; 256]>,
    failure: Mutex<Option<EcError>>,
}

impl FakeEc {
    pub fn new() -> Self {
        Self {
            registers: Mutex::new([0; 256]),
            failure: Mutex::new(None),
        }
    }

    pub fn set_register(&self, offset: u8, value: u8) {
        self.registers.lock()[offset as usize] = value;
    }

    pub fn register(&self, offset: u8) -> u8 {
        self.registers.lock()[offset as usize]
    }

    pub fn fail_with(&self, error: EcError) {
        *self.failure.lock() = Some(error);
    }
}

impl EmbeddedController for FakeEc {
    fn read(&self, offset: u8) -> Result<u8, EcError> {
        if let Some(error) = *self.failure.lock() {
            return Err(error);
        }
        Ok(self.register(offset))
    }

    fn write(&self, offset: u8, value: u8) -> Result<(), EcError> {
        if let Some(error) = *self.failure.lock() {
            return Err(error);
        }
        self.set_register(offset, value);
        Ok(())
    }
}

// ============================================================================
// ACPI
// ============================================================================

/// One `evaluate` call seen by [`FakeNamespace`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub scope: Option<AcpiHandle>,
    pub name: String,
    pub args: Vec<u64>,
}

impl Evaluation {
    pub fn new(scope: Option<AcpiHandle>, name: &str, args: &[u64]) -> Self {
        Self {
            scope,
            name: name.to_string(),
            args: args.to_vec(),
        }
    }
}

struct NamespaceObject {
    path: String,
    hid: String,
}

type MethodKey = (Option<AcpiHandle>, String);

/// Namespace built from a list of objects and canned method results
///
/// Handles are the object's index plus one. Evaluating anything without a
/// canned result fails with `AE_NOT_FOUND`.
pub struct FakeNamespace {
    objects: Mutex<Vec<NamespaceObject>>,
    methods: Mutex<BTreeMap<MethodKey, Result<AcpiObject, AcpiStatus>>>,
    lookups: Mutex<Vec<String>>,
    evaluations: Mutex<Vec<Evaluation>>,
    walk_visits: Mutex<usize>,
}

impl FakeNamespace {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(Vec::new()),
            methods: Mutex::new(BTreeMap::new()),
            lookups: Mutex::new(Vec::new()),
            evaluations: Mutex::new(Vec::new()),
            walk_visits: Mutex::new(0),
        }
    }

    pub fn add_device(&self, path: &str, hid: &str) -> AcpiHandle {
        let mut objects = self.objects.lock();
        objects.push(NamespaceObject {
            path: path.to_string(),
            hid: hid.to_string(),
        });
        AcpiHandle::from_raw(objects.len())
    }

    pub fn add_object(&self, path: &str) -> AcpiHandle {
        self.add_device(path, "")
    }

    pub fn set_method(
        &self,
        scope: Option<AcpiHandle>,
        name: &str,
        result: Result<AcpiObject, AcpiStatus>,
    ) {
        self.methods.lock().insert((scope, name.to_string()), result);
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().clone()
    }

    pub fn evaluations(&self) -> Vec<Evaluation> {
        self.evaluations.lock().clone()
    }

    pub fn walk_visits(&self) -> usize {
        *self.walk_visits.lock()
    }
}

impl AcpiNamespace for FakeNamespace {
    fn get_handle(&self, path: &str) -> Option<AcpiHandle> {
        self.lookups.lock().push(path.to_string());
        self.objects
            .lock()
            .iter()
            .position(|object| object.path == path)
            .map(|index| AcpiHandle::from_raw(index + 1))
    }

    fn evaluate(
        &self,
        scope: Option<AcpiHandle>,
        name: &str,
        args: &[u64],
    ) -> Result<AcpiObject, AcpiStatus> {
        self.evaluations.lock().push(Evaluation::new(scope, name, args));
        self.methods
            .lock()
            .get(&(scope, name.to_string()))
            .cloned()
            .unwrap_or(Err(AcpiStatus::NotFound))
    }

    fn walk_devices(&self, hid: &str, visit: &mut dyn FnMut(AcpiHandle) -> WalkControl) {
        let matches: Vec<AcpiHandle> = self
            .objects
            .lock()
            .iter()
            .enumerate()
            .filter(|(_, object)| object.hid == hid)
            .map(|(index, _)| AcpiHandle::from_raw(index + 1))
            .collect();

        for handle in matches {
            *self.walk_visits.lock() += 1;
            if visit(handle) == WalkControl::Stop {
                break;
            }
        }
    }
}

// ============================================================================
// Endpoint registry
// ============================================================================

/// Registry that records creates and removes, optionally refusing the
/// `n`th create (1-based) with a given code
pub struct RecordingRegistry {
    fail_at: Option<(usize, i32)>,
    attempts: usize,
    pub created: Vec<EndpointId>,
    pub removed: Vec<EndpointId>,
}

impl RecordingRegistry {
    pub fn new() -> Self {
        Self {
            fail_at: None,
            attempts: 0,
            created: Vec::new(),
            removed: Vec::new(),
        }
    }

    pub fn failing_at(n: usize, code: i32) -> Self {
        Self {
            fail_at: Some((n, code)),
            ..Self::new()
        }
    }

    /// Endpoints created and not removed since
    pub fn visible(&self) -> Vec<EndpointId> {
        let mut visible = self.created.clone();
        for id in &self.removed {
            if let Some(index) = visible.iter().position(|v| v == id) {
                visible.remove(index);
            }
        }
        visible
    }
}

impl EndpointRegistry for RecordingRegistry {
    fn create(&mut self, id: EndpointId) -> Result<(), i32> {
        self.attempts += 1;
        match self.fail_at {
            Some((n, code)) if n == self.attempts => return Err(code),
            _ => {}
        }
        self.created.push(id);
        Ok(())
    }

    fn remove(&mut self, id: EndpointId) {
        self.removed.push(id);
    }
}
