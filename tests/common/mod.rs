// Common test utilities for integration tests
//
// Builders for LAV program images and a listener that records every
// notification it receives.

#![allow(dead_code)]

use gvm_rs::image::{HEADER_SIZE, MAGIC};
use gvm_rs::screen::{Area, ListenerError, Screen, ScreenChangeListener};
use std::cell::RefCell;
use std::rc::Rc;

/// Build a program image: "LAV", zeroed reserved bytes, then `body`
pub fn build_image(body: &[u8]) -> Vec<u8> {
    let mut data = Vec::with_capacity(HEADER_SIZE + body.len());
    data.extend_from_slice(&MAGIC);
    data.resize(HEADER_SIZE, 0);
    data.extend_from_slice(body);
    data
}

/// Build a program image whose reserved header bytes are `reserved`
pub fn build_image_with_header(reserved: [u8; 13], body: &[u8]) -> Vec<u8> {
    let mut data = build_image(body);
    data[MAGIC.len()..HEADER_SIZE].copy_from_slice(&reserved);
    data
}

/// Shared log of `(listener id, area)` pairs
pub type NotificationLog = Rc<RefCell<Vec<(usize, Area)>>>;

/// A listener that appends `(id, area)` to `log` on every notification
pub fn recording_listener(log: &NotificationLog, id: usize) -> impl ScreenChangeListener {
    let log = Rc::clone(log);
    move |_: &Screen, area: Area| -> Result<(), ListenerError> {
        log.borrow_mut().push((id, area));
        Ok(())
    }
}

/// Write `bytes` row-major into the graph plane, starting at byte `offset`
pub fn fill_graph(screen: &mut Screen, offset: u16, bytes: &[u8]) {
    use gvm_rs::MemoryMappedDevice;

    let mut ram = screen.graph_ram().expect("160x80 screen has graph RAM");
    for (i, &byte) in bytes.iter().enumerate() {
        ram.write(offset + i as u16, byte);
    }
}
