//! Per-request execution record and plain-text report rendering

use chrono::{DateTime, Local};
use std::fmt::Write;
use std::thread::ThreadId;

use crate::host::HostSnapshot;

/// Everything recorded about a single request's execution. Built fresh per
/// request and discarded once the response is sent.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub thread_id: ThreadId,
    pub process_id: u32,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    pub duration_seconds: f64,
    pub delay_seconds: f64,
}

const TIME_FORMAT: &str = "%H:%M:%S%.3f";

/// Render the fixed-layout report. Field order is part of the contract:
/// operators diff reports from concurrent requests line by line.
pub fn render(ctx: &RequestContext, host: &HostSnapshot) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Concurrency Test Result:");
    let _ = writeln!(out, "{}", "-".repeat(40));
    let _ = writeln!(out, "Request ID: {}", ctx.request_id);
    let _ = writeln!(out, "Thread ID: {:?}", ctx.thread_id);
    let _ = writeln!(out, "Process ID: {}", ctx.process_id);
    let _ = writeln!(out, "CPU Count: {} vCPUs", host.logical_cpus);
    let _ = writeln!(out, "CPU Info: {}", host.cpu_info);
    let _ = writeln!(out, "Memory: {}", host.memory);
    let _ = writeln!(out, "Platform: {}", host.platform);
    let _ = writeln!(out, "Start: {}", ctx.start_time.format(TIME_FORMAT));
    let _ = writeln!(out, "End: {}", ctx.end_time.format(TIME_FORMAT));
    let _ = writeln!(out, "Duration: {:.3}s", ctx.duration_seconds);
    // {:?} keeps a trailing ".0" on whole-number delays, so a defaulted
    // request always reads "Requested Delay: 2.0s"
    let _ = writeln!(out, "Requested Delay: {:?}s", ctx.delay_seconds);

    out
}
