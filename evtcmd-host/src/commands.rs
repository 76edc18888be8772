//! Built-in device commands.
//!
//! | command | repeat | data | reply |
//! |---------|--------|------|-------|
//! | `ping`  | yes | ignored | `pong` |
//! | `echo`  | yes | any | the data |
//! | `set`   | yes | signed integer | `ok` |
//! | `get`   | yes | ignored | the register value |
//! | `led`   | yes | `on` / `off` | `ok` |
//! | `status`| yes | ignored | JSON snapshot of the device |
//! | `hello` | no  | ignored | `hello` |
//! | `stop`  | yes | ignored | `bye`, then the listener is disabled |

use evtcmd_core::{CommandListener, CoreError, ListenerGate};
use evtcmd_protocol::{ByteSource, Pacer};
use serde::Serialize;
use std::collections::VecDeque;

/// Application state handed to every command.
#[derive(Debug, Default, Serialize)]
pub struct DeviceContext {
    /// Integer register written by `set`.
    pub value: i64,
    /// LED state written by `led`.
    pub led: bool,
    #[serde(skip)]
    replies: VecDeque<String>,
}

impl DeviceContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply line for the host to write out.
    pub fn reply(&mut self, line: impl Into<String>) {
        self.replies.push_back(line.into());
    }

    /// Takes all queued replies in order.
    pub fn drain_replies(&mut self) -> impl Iterator<Item = String> + '_ {
        self.replies.drain(..)
    }
}

type Builtin = fn(&mut ListenerGate, &mut DeviceContext, &str) -> bool;

/// Built-in commands as `(name, repeat, handler)`.
pub const BUILTINS: &[(&str, bool, Builtin)] = &[
    ("ping", true, ping),
    ("echo", true, echo),
    ("set", true, set),
    ("get", true, get),
    ("led", true, led),
    ("status", true, status),
    ("hello", false, hello),
    ("stop", true, stop),
];

/// Registers every built-in command on `listener`.
pub fn register_builtins<S, P>(
    listener: &mut CommandListener<S, DeviceContext, P>,
) -> Result<(), CoreError>
where
    S: ByteSource,
    P: Pacer,
{
    for &(name, repeat, handler) in BUILTINS {
        listener.register(name, handler, repeat)?;
    }
    Ok(())
}

fn ping(_: &mut ListenerGate, ctx: &mut DeviceContext, _: &str) -> bool {
    ctx.reply("pong");
    true
}

fn echo(_: &mut ListenerGate, ctx: &mut DeviceContext, data: &str) -> bool {
    ctx.reply(data);
    true
}

fn set(_: &mut ListenerGate, ctx: &mut DeviceContext, data: &str) -> bool {
    match data.trim().parse::<i64>() {
        Ok(value) => {
            ctx.value = value;
            ctx.reply("ok");
            true
        }
        Err(_) => {
            tracing::warn!("set: invalid integer '{}'", data);
            ctx.reply(format!("error: invalid integer '{}'", data));
            false
        }
    }
}

fn get(_: &mut ListenerGate, ctx: &mut DeviceContext, _: &str) -> bool {
    let value = ctx.value;
    ctx.reply(value.to_string());
    true
}

fn led(_: &mut ListenerGate, ctx: &mut DeviceContext, data: &str) -> bool {
    match data {
        "on" => ctx.led = true,
        "off" => ctx.led = false,
        other => {
            ctx.reply(format!("error: expected 'on' or 'off', got '{}'", other));
            return false;
        }
    }
    ctx.reply("ok");
    true
}

fn status(_: &mut ListenerGate, ctx: &mut DeviceContext, _: &str) -> bool {
    match serde_json::to_string(&*ctx) {
        Ok(json) => {
            ctx.reply(json);
            true
        }
        Err(e) => {
            tracing::error!("status: serialization failed: {}", e);
            false
        }
    }
}

fn hello(_: &mut ListenerGate, ctx: &mut DeviceContext, _: &str) -> bool {
    ctx.reply("hello");
    true
}

fn stop(gate: &mut ListenerGate, ctx: &mut DeviceContext, _: &str) -> bool {
    ctx.reply("bye");
    gate.disable();
    true
}
