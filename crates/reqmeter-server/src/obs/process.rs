//! Process-level metrics: start time, uptime, resident memory, scheduler lag.
//!
//! Values other than lag are computed at scrape time. Lag is the async
//! analogue of event-loop delay: a background task asks to sleep for a fixed
//! interval and records how much later than requested it actually woke up.

use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use reqmeter_core::error::{MeterError, Result};
use reqmeter_core::metrics::desc::fq_name;
use reqmeter_core::{
    Collector, Desc, FamilySnapshot, Gauge, LabelSet, MetricKind, SeriesSnapshot, SeriesValue,
};

const PROC_STATUS: &str = "/proc/self/status";

pub struct ProcessCollector {
    start_time_desc: Desc,
    uptime_desc: Desc,
    rss_desc: Desc,
    lag: Gauge,
    start_unix_secs: f64,
    started: Instant,
}

impl ProcessCollector {
    pub fn new(namespace: &str) -> Result<Self> {
        let start_unix_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64();

        Ok(Self {
            start_time_desc: Desc::new(
                fq_name(namespace, "process_start_time_seconds"),
                "Start time of the process since unix epoch in seconds",
                MetricKind::Gauge,
                &[],
            )?,
            uptime_desc: Desc::new(
                fq_name(namespace, "process_uptime_seconds"),
                "Seconds since the process started",
                MetricKind::Gauge,
                &[],
            )?,
            rss_desc: Desc::new(
                fq_name(namespace, "process_resident_memory_bytes"),
                "Resident memory size in bytes",
                MetricKind::Gauge,
                &[],
            )?,
            lag: Gauge::new(
                fq_name(namespace, "process_scheduler_lag_seconds"),
                "How late the runtime woke a sleeping task, in seconds",
            )?,
            start_unix_secs,
            started: Instant::now(),
        })
    }

    pub fn lag(&self) -> &Gauge {
        &self.lag
    }
}

fn scalar(desc: &Desc, v: f64) -> FamilySnapshot {
    FamilySnapshot::new(
        desc,
        vec![SeriesSnapshot {
            labels: LabelSet::empty(),
            value: SeriesValue::Gauge(v),
        }],
    )
}

impl Collector for ProcessCollector {
    fn describe(&self) -> Vec<Desc> {
        vec![
            self.start_time_desc.clone(),
            self.uptime_desc.clone(),
            self.rss_desc.clone(),
            self.lag.desc().clone(),
        ]
    }

    fn collect(&self) -> Vec<FamilySnapshot> {
        let rss = match resident_memory_bytes() {
            Ok(bytes) => scalar(&self.rss_desc, bytes as f64),
            Err(e) => FamilySnapshot::new(&self.rss_desc, Vec::new()).with_errors(vec![e]),
        };

        let mut out = vec![
            scalar(&self.start_time_desc, self.start_unix_secs),
            scalar(&self.uptime_desc, self.started.elapsed().as_secs_f64()),
            rss,
        ];
        out.extend(self.lag.collect());
        out
    }
}

fn resident_memory_bytes() -> Result<u64> {
    let status = std::fs::read_to_string(PROC_STATUS)
        .map_err(|e| MeterError::Collect(format!("read {PROC_STATUS}: {e}")))?;
    parse_vm_rss(&status)
        .ok_or_else(|| MeterError::Collect(format!("no VmRSS line in {PROC_STATUS}")))
}

/// Extract `VmRSS` (reported in kB) from `/proc/<pid>/status`, in bytes.
pub fn parse_vm_rss(status: &str) -> Option<u64> {
    let line = status.lines().find(|l| l.starts_with("VmRSS:"))?;
    let kb: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kb * 1024)
}

/// Periodically measure scheduler lag into the collector's lag gauge.
/// Runs until the runtime shuts down.
pub async fn run_lag_sampler(collector: Arc<ProcessCollector>, interval: Duration) {
    tracing::debug!(interval_ms = interval.as_millis() as u64, "scheduler lag sampler started");
    loop {
        let start = Instant::now();
        tokio::time::sleep(interval).await;
        let lag = start.elapsed().saturating_sub(interval);
        if let Err(e) = collector.lag().set(lag.as_secs_f64()) {
            tracing::warn!(error = %e, "scheduler lag update rejected");
        }
    }
}
