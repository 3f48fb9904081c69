//! The capture dispatch thread.
//!
//! Callbacks registered through [`Camera::listen`] run here, never on
//! the tick thread: the tick loop stays on budget no matter how slow a
//! callback is, and per-camera invocations are serialized because one
//! thread drains the queue in order.
//!
//! [`Camera::listen`]: veer_engine::Camera::listen

use std::collections::HashMap;

use crossbeam_channel::{Receiver, Sender};

use veer_core::{ActorId, CameraFrame};
use veer_engine::FrameCallback;

/// Frames buffered between the tick thread and the dispatch thread.
/// When the queue is full the tick thread drops the frame rather than
/// stalling the simulation.
pub(crate) const CAPTURE_QUEUE_DEPTH: usize = 8;

pub(crate) enum DispatchEvent {
    /// Install a camera's callback, replacing any previous one.
    Register(ActorId, FrameCallback),
    /// Invoke a camera's callback with a rendered frame.
    Deliver(ActorId, CameraFrame),
    /// Drop a camera's callback and acknowledge once it is gone.
    Stop(ActorId, Sender<()>),
    /// Drop every callback and exit the loop.
    Shutdown,
}

pub(crate) fn dispatch_loop(events: Receiver<DispatchEvent>) {
    let mut callbacks: HashMap<ActorId, FrameCallback> = HashMap::new();
    while let Ok(event) = events.recv() {
        match event {
            DispatchEvent::Register(id, callback) => {
                callbacks.insert(id, callback);
            }
            DispatchEvent::Deliver(id, frame) => {
                if let Some(callback) = callbacks.get_mut(&id) {
                    callback(frame);
                }
            }
            DispatchEvent::Stop(id, done) => {
                callbacks.remove(&id);
                let _ = done.send(());
            }
            DispatchEvent::Shutdown => break,
        }
    }
}
