//! Test support: fake devices, a recording secure-call transport, a
//! capturing logger, and a minimal DTB writer.

use std::cell::RefCell;

use log::{Level, LevelFilter, Log, Metadata, Record};
use spin::Mutex;

use crate::of::Device;
use crate::resolve::TZ_DEVICE_ID_PROPERTY;
use crate::scm::{ScmDesc, SecureCall};

/// A device with an optional `qcom,tz-device-id` value.
pub struct FakeDevice {
    name: String,
    device_id: Option<String>,
}

impl FakeDevice {
    pub fn with_id(name: &str, device_id: &str) -> Self {
        Self {
            name: name.to_string(),
            device_id: Some(device_id.to_string()),
        }
    }

    pub fn without_id(name: &str) -> Self {
        Self {
            name: name.to_string(),
            device_id: None,
        }
    }
}

impl Device for FakeDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_string_property(&self, key: &str) -> Option<&str> {
        if key != TZ_DEVICE_ID_PROPERTY {
            return None;
        }
        self.device_id.as_deref()
    }
}

/// Records every descriptor and answers with a fixed status.
pub struct RecordingCall {
    ret: i32,
    calls: Mutex<Vec<ScmDesc>>,
}

impl RecordingCall {
    pub fn returning(ret: i32) -> Self {
        Self {
            ret,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<ScmDesc> {
        self.calls.lock().clone()
    }
}

impl SecureCall for RecordingCall {
    fn invoke(&self, desc: &ScmDesc) -> i32 {
        self.calls.lock().push(*desc);
        self.ret
    }
}

thread_local! {
    static RECORDS: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
}

struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let entry = (record.level(), record.args().to_string());
        RECORDS.with(|r| r.borrow_mut().push(entry));
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static LOGGER_INIT: spin::Once<()> = spin::Once::new();

/// Drain the log records emitted on the current thread.
pub fn take_logs() -> Vec<(Level, String)> {
    LOGGER_INIT.call_once(|| {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(LevelFilter::Trace);
    });
    RECORDS.with(|r| r.borrow_mut().drain(..).collect())
}

/// Writes a flattened device tree with one level of child nodes.
pub struct DtbBuilder {
    nodes: Vec<(String, Vec<(String, Vec<u8>)>)>,
}

mod token {
    pub const BEGIN_NODE: u32 = 0x1;
    pub const END_NODE: u32 = 0x2;
    pub const PROP: u32 = 0x3;
    pub const END: u32 = 0x9;
}

const FDT_MAGIC: u32 = 0xD00D_FEED;
const HEADER_SIZE: usize = 40;
const RSVMAP_SIZE: usize = 16;

impl DtbBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn node(mut self, name: &str, props: &[(&str, &[u8])]) -> Self {
        let props = props
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_vec()))
            .collect();
        self.nodes.push((name.to_string(), props));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut strings: Vec<u8> = Vec::new();
        let mut structs: Vec<u8> = Vec::new();

        push_u32(&mut structs, token::BEGIN_NODE);
        push_name(&mut structs, "");
        push_prop(&mut structs, intern(&mut strings, "#address-cells"), &2u32.to_be_bytes());
        push_prop(&mut structs, intern(&mut strings, "#size-cells"), &1u32.to_be_bytes());

        for (name, props) in &self.nodes {
            push_u32(&mut structs, token::BEGIN_NODE);
            push_name(&mut structs, name);
            for (key, value) in props {
                let off = intern(&mut strings, key);
                push_prop(&mut structs, off, value);
            }
            push_u32(&mut structs, token::END_NODE);
        }

        push_u32(&mut structs, token::END_NODE);
        push_u32(&mut structs, token::END);

        let off_rsvmap = HEADER_SIZE;
        let off_struct = off_rsvmap + RSVMAP_SIZE;
        let off_strings = off_struct + structs.len();
        let total = off_strings + strings.len();

        let mut blob = Vec::with_capacity(total);
        push_u32(&mut blob, FDT_MAGIC);
        push_u32(&mut blob, total as u32);
        push_u32(&mut blob, off_struct as u32);
        push_u32(&mut blob, off_strings as u32);
        push_u32(&mut blob, off_rsvmap as u32);
        push_u32(&mut blob, 17); // version
        push_u32(&mut blob, 16); // last_comp_version
        push_u32(&mut blob, 0); // boot_cpuid_phys
        push_u32(&mut blob, strings.len() as u32);
        push_u32(&mut blob, structs.len() as u32);
        blob.extend_from_slice(&[0u8; RSVMAP_SIZE]);
        blob.extend_from_slice(&structs);
        blob.extend_from_slice(&strings);
        blob
    }
}

fn intern(strings: &mut Vec<u8>, name: &str) -> u32 {
    let off = strings.len() as u32;
    strings.extend_from_slice(name.as_bytes());
    strings.push(0);
    off
}

fn push_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_be_bytes());
}

fn pad4(buf: &mut Vec<u8>) {
    while buf.len() % 4 != 0 {
        buf.push(0);
    }
}

fn push_name(buf: &mut Vec<u8>, name: &str) {
    buf.extend_from_slice(name.as_bytes());
    buf.push(0);
    pad4(buf);
}

fn push_prop(buf: &mut Vec<u8>, name_off: u32, value: &[u8]) {
    push_u32(buf, token::PROP);
    push_u32(buf, value.len() as u32);
    push_u32(buf, name_off);
    buf.extend_from_slice(value);
    pad4(buf);
}
