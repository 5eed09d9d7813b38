#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::net::Ipv4Addr;
use std::os::unix::io::RawFd;
use std::rc::Rc;
use std::time::{Instant, SystemTime};

use bytes::Bytes;
use nix::poll::PollFlags;

use sluice::access::DnsClient;
use sluice::net::{AsyncConnection, ConnectionConfig};
use sluice::reactor::{Callback, Next, PollError, Pollable};
use sluice::repository::{AsyncFile, AsyncFileRepository};

pub const CLIENT: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 7);

struct MockState {
    input: VecDeque<u8>,
    chunk: usize,
    written: Vec<u8>,
    reads: usize,
}

/// In-memory connection: reads hand out `input` in chunks of at most
/// `chunk` bytes, writes are appended to `written`. An exhausted input reads
/// as a closed peer.
#[derive(Clone)]
pub struct MockConnection {
    state: Rc<RefCell<MockState>>,
    config: ConnectionConfig,
    remote: Ipv4Addr,
}

impl MockConnection {
    pub fn new(input: &[u8], chunk: usize) -> Self {
        Self {
            state: Rc::new(RefCell::new(MockState {
                input: input.iter().copied().collect(),
                chunk,
                written: Vec::new(),
                reads: 0,
            })),
            config: ConnectionConfig::default(),
            remote: CLIENT,
        }
    }

    pub fn with_config(mut self, config: ConnectionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn written(&self) -> Vec<u8> {
        self.state.borrow().written.clone()
    }

    pub fn written_text(&self) -> String {
        String::from_utf8_lossy(&self.written()).into_owned()
    }

    pub fn remaining_input(&self) -> usize {
        self.state.borrow().input.len()
    }

    pub fn reads(&self) -> usize {
        self.state.borrow().reads
    }

    pub fn shared(&self) -> Rc<dyn AsyncConnection> {
        Rc::new(self.clone())
    }
}

impl AsyncConnection for MockConnection {
    fn read(&self, callback: Callback<Bytes>) -> Box<dyn Pollable> {
        Box::new(MockRead {
            state: self.state.clone(),
            callback: Some(callback),
        })
    }

    fn write(&self, payload: Bytes, callback: Callback<()>) -> Box<dyn Pollable> {
        Box::new(MockWrite {
            state: self.state.clone(),
            payload,
            callback: Some(callback),
        })
    }

    fn remote_addr(&self) -> Ipv4Addr {
        self.remote
    }

    fn config(&self) -> ConnectionConfig {
        self.config
    }
}

struct MockRead {
    state: Rc<RefCell<MockState>>,
    callback: Option<Callback<Bytes>>,
}

impl Pollable for MockRead {
    fn descriptor(&self) -> RawFd {
        -1
    }

    fn interest(&self) -> PollFlags {
        PollFlags::POLLIN
    }

    fn is_done(&self) -> bool {
        self.callback.is_none()
    }

    fn past_deadline(&self, _now: Instant) -> bool {
        false
    }

    fn resume(&mut self, _ready: PollFlags) -> Result<Next, PollError> {
        let chunk: Vec<u8> = {
            let mut state = self.state.borrow_mut();
            if state.input.is_empty() {
                return Err(PollError::Closed);
            }
            let take = state.chunk.max(1).min(state.input.len());
            state.reads += 1;
            state.input.drain(..take).collect()
        };
        match self.callback.take() {
            Some(callback) => Ok(callback(Bytes::from(chunk))),
            None => Ok(None),
        }
    }
}

struct MockWrite {
    state: Rc<RefCell<MockState>>,
    payload: Bytes,
    callback: Option<Callback<()>>,
}

impl Pollable for MockWrite {
    fn descriptor(&self) -> RawFd {
        -1
    }

    fn interest(&self) -> PollFlags {
        PollFlags::POLLOUT
    }

    fn is_done(&self) -> bool {
        self.callback.is_none()
    }

    fn past_deadline(&self, _now: Instant) -> bool {
        false
    }

    fn resume(&mut self, _ready: PollFlags) -> Result<Next, PollError> {
        self.state.borrow_mut().written.extend_from_slice(&self.payload);
        match self.callback.take() {
            Some(callback) => Ok(callback(())),
            None => Ok(None),
        }
    }
}

/// Resumes pollables as if every one of them were always ready, until the
/// chain ends or a pollable fails. Returns how many pollables were resumed.
pub fn drive(next: Next) -> usize {
    let mut pending: VecDeque<Box<dyn Pollable>> = next.into_iter().collect();
    let mut resumed = 0;

    while let Some(mut pollable) = pending.pop_front() {
        resumed += 1;
        assert!(resumed < 100_000, "pollable chain does not terminate");

        // A failed pollable is dropped, as the reactor would.
        if let Ok(successor) = pollable.resume(PollFlags::POLLIN | PollFlags::POLLOUT) {
            if !pollable.is_done() {
                pending.push_back(pollable);
            }
            pending.extend(successor);
        }
    }
    resumed
}

/// Captures a callback's argument for later inspection.
pub fn capture<T: 'static>() -> (Rc<RefCell<Option<T>>>, Callback<T>) {
    let slot = Rc::new(RefCell::new(None));
    let target = slot.clone();
    let callback: Callback<T> = Box::new(move |value| {
        *target.borrow_mut() = Some(value);
        None
    });
    (slot, callback)
}

#[derive(Clone)]
pub struct MockFile {
    pub contents: Vec<u8>,
    pub world_readable: bool,
    pub modified: SystemTime,
    pub fail_read: bool,
}

impl MockFile {
    pub fn readable(contents: &str) -> Self {
        Self {
            contents: contents.as_bytes().to_vec(),
            world_readable: true,
            modified: SystemTime::UNIX_EPOCH,
            fail_read: false,
        }
    }
}

impl AsyncFile for MockFile {
    fn is_world_readable(&self, callback: Callback<bool>) -> Next {
        callback(self.world_readable)
    }

    fn read_contents(&self, callback: Callback<io::Result<Vec<u8>>>) -> Next {
        if self.fail_read {
            return callback(Err(io::Error::other("disk on fire")));
        }
        callback(Ok(self.contents.clone()))
    }

    fn read_last_modified(&self, callback: Callback<io::Result<SystemTime>>) -> Next {
        callback(Ok(self.modified))
    }
}

#[derive(Default)]
pub struct MockFileRepository {
    files: HashMap<String, MockFile>,
    lookups: RefCell<Vec<String>>,
}

impl MockFileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, file: MockFile) -> Self {
        self.files.insert(path.to_string(), file);
        self
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.borrow().clone()
    }
}

impl AsyncFileRepository for MockFileRepository {
    fn read_file(&self, path: &str, callback: Callback<Option<Rc<dyn AsyncFile>>>) -> Next {
        self.lookups.borrow_mut().push(path.to_string());
        let file = self
            .files
            .get(path)
            .map(|file| Rc::new(file.clone()) as Rc<dyn AsyncFile>);
        callback(file)
    }
}

#[derive(Default)]
pub struct MockDnsClient {
    entries: HashMap<String, Vec<Ipv4Addr>>,
}

impl MockDnsClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, domain: &str, addresses: &[Ipv4Addr]) -> Self {
        self.entries.insert(domain.to_string(), addresses.to_vec());
        self
    }
}

impl DnsClient for MockDnsClient {
    fn lookup(&self, domain: &str) -> io::Result<Vec<Ipv4Addr>> {
        self.entries
            .get(domain)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("unknown host {domain}")))
    }
}
